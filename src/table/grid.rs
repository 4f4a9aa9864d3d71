//! Grid profiling: the accept/reject gate shared by all strategies.

use crate::classify::{function_word_ratio, is_numeric_token};
use crate::config::ScoreWeights;
use crate::model::Alignment;

/// A rectangular candidate grid. Every row has exactly `cols` cells.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Cell text, row-major
    pub cells: Vec<Vec<String>>,
    /// Cell counts of the source rows before padding or merging
    raw_lengths: Vec<usize>,
}

impl Grid {
    /// Build a rectangular grid from ragged rows: short rows pad with
    /// empty cells, overflow cells merge into the last column.
    pub fn from_rows(rows: Vec<Vec<String>>, cols: usize) -> Self {
        let raw_lengths: Vec<usize> = rows.iter().map(|r| r.len()).collect();
        let cells = rows
            .into_iter()
            .map(|mut row| {
                if row.len() > cols {
                    let overflow: Vec<String> = row.split_off(cols);
                    if let Some(last) = row.last_mut() {
                        for cell in overflow {
                            if !cell.is_empty() {
                                if !last.is_empty() {
                                    last.push(' ');
                                }
                                last.push_str(&cell);
                            }
                        }
                    }
                }
                while row.len() < cols {
                    row.push(String::new());
                }
                row
            })
            .collect();
        Self { cells, raw_lengths }
    }

    /// Build a grid from already-rectangular rows, keeping the original
    /// per-row cell counts for the equal-rows signal.
    pub fn from_aligned(cells: Vec<Vec<String>>, raw_lengths: Vec<usize>) -> Self {
        debug_assert_eq!(cells.len(), raw_lengths.len());
        Self { cells, raw_lengths }
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.cells.len()
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.cells.first().map(|r| r.len()).unwrap_or(0)
    }

    /// Whether every source row already had the same cell count before
    /// padding.
    pub fn rows_equal_length(&self) -> bool {
        self.raw_lengths.windows(2).all(|w| w[0] == w[1])
    }
}

/// Deterministic measurements over a grid, used as the acceptance gate.
#[derive(Debug, Clone)]
pub struct GridProfile {
    /// Rows in the grid
    pub n_rows: usize,
    /// Columns in the grid
    pub n_cols: usize,
    /// Cells with non-empty content
    pub non_empty: usize,
    /// Cells classified as short tokens
    pub short_token: usize,
    /// Cells classified as numeric
    pub numeric: usize,
    /// Cells classified as full sentences
    pub sentence: usize,
    /// Cells classified as broken prose fragments
    pub prose_fragment: usize,
    /// Mean non-empty cell length
    pub avg_len: f32,
    /// Longest cell length
    pub max_len: usize,
    /// Non-empty cells over total cells
    pub density: f32,
    /// Final score, including any strategy bonus
    pub score: f32,
}

impl GridProfile {
    /// Profile a grid. `bonus` is the strategy's fixed score bonus
    /// (bordered tables get one before profiling).
    pub fn measure(grid: &Grid, bonus: f32, w: &ScoreWeights) -> Self {
        let n_rows = grid.n_rows();
        let n_cols = grid.n_cols();
        let total = n_rows * n_cols;

        let mut non_empty = 0usize;
        let mut short_token = 0usize;
        let mut numeric = 0usize;
        let mut sentence = 0usize;
        let mut prose_fragment = 0usize;
        let mut len_sum = 0usize;
        let mut max_len = 0usize;

        for row in &grid.cells {
            for cell in row {
                let trimmed = cell.trim();
                if trimmed.is_empty() {
                    continue;
                }
                non_empty += 1;
                let len = trimmed.chars().count();
                len_sum += len;
                max_len = max_len.max(len);

                if is_numeric_cell(trimmed) {
                    numeric += 1;
                }
                if is_short_token(trimmed) {
                    short_token += 1;
                }
                if is_sentence_cell(trimmed) {
                    sentence += 1;
                }
                if is_prose_fragment(trimmed) {
                    prose_fragment += 1;
                }
            }
        }

        let avg_len = if non_empty > 0 {
            len_sum as f32 / non_empty as f32
        } else {
            0.0
        };
        let density = if total > 0 {
            non_empty as f32 / total as f32
        } else {
            0.0
        };

        let mut profile = Self {
            n_rows,
            n_cols,
            non_empty,
            short_token,
            numeric,
            sentence,
            prose_fragment,
            avg_len,
            max_len,
            density,
            score: 0.0,
        };
        profile.score = profile.compute_score(grid.rows_equal_length(), w) + bonus;
        profile
    }

    fn compute_score(&self, equal_rows: bool, w: &ScoreWeights) -> f32 {
        if self.non_empty == 0 {
            return f32::MIN;
        }
        let ne = self.non_empty as f32;
        let short_ratio = self.short_token as f32 / ne;
        let numeric_ratio = self.numeric as f32 / ne;
        let sentence_ratio = self.sentence as f32 / ne;
        let fragment_ratio = self.prose_fragment as f32 / ne;

        let mut score = w.grid_row * self.n_rows as f32 + w.grid_col * self.n_cols as f32;
        score += w.grid_short_token * short_ratio;
        score += w.grid_numeric * numeric_ratio;

        let sentence_penalty = if sentence_ratio > 0.8 {
            w.grid_sentence_heavy
        } else if sentence_ratio > 0.4 {
            w.grid_sentence_some
        } else {
            0.0
        };
        score -= sentence_penalty * sentence_ratio;

        let fragment_penalty = if fragment_ratio > 0.5 {
            w.grid_fragment_heavy
        } else if fragment_ratio > 0.3 {
            w.grid_fragment_some
        } else if fragment_ratio > 0.15 {
            w.grid_fragment_light
        } else {
            0.0
        };
        score -= fragment_penalty * fragment_ratio;

        if sentence_ratio.max(fragment_ratio) > 0.6
            && (self.short_token + self.numeric) as f32 / ne < 0.3
        {
            score -= w.grid_prose_dominant;
        }

        if self.avg_len > 80.0 {
            score -= w.grid_avg_len_heavy;
        } else if self.avg_len > 50.0 {
            score -= w.grid_avg_len_some;
        }
        if self.max_len > 100 {
            score -= w.grid_max_len;
        }

        if self.n_rows >= 4 && self.n_cols >= 3 && fragment_ratio < 0.3 {
            score += w.grid_size_bonus;
        }
        if equal_rows {
            score += w.grid_equal_rows;
        }
        if self.density >= 0.6 {
            score += w.grid_density_bonus;
        }

        score
    }

    /// Ratio of tabular cells (short tokens plus numeric) to non-empty.
    pub fn tabular_ratio(&self) -> f32 {
        if self.non_empty == 0 {
            return 0.0;
        }
        (self.short_token + self.numeric) as f32 / self.non_empty as f32
    }

    /// The acceptance gate. All conditions must hold.
    pub fn accepts(&self, w: &ScoreWeights) -> bool {
        if self.n_rows < 2 || self.n_cols < 2 || self.non_empty == 0 {
            return false;
        }
        if self.density < 0.25 {
            return false;
        }

        let tabular = self.tabular_ratio();

        if self.avg_len > 60.0 && tabular < 0.5 {
            return false;
        }
        if self.max_len > 80 && self.avg_len > 40.0 && tabular < 0.4 {
            return false;
        }

        // Sentence-heavy grids need strong tabular structure.
        let sentence_ratio = self.sentence as f32 / self.non_empty as f32;
        if sentence_ratio >= 0.4 && tabular < 0.5 {
            return false;
        }

        // Short-token deficit: only large, compact grids survive.
        let short_ratio = self.short_token as f32 / self.non_empty as f32;
        if short_ratio < 0.15
            && self.numeric == 0
            && !(self.n_rows >= 4 && self.n_cols >= 3 && self.avg_len <= 30.0)
        {
            return false;
        }

        self.score >= w.grid_accept_score
    }

    /// Confidence from the score, capped at 1.
    pub fn confidence(&self) -> f32 {
        (self.score / 10.0).clamp(0.0, 1.0)
    }
}

/// A cell is a short token when it is at most 24 chars, has no internal
/// space, and is alphanumeric after stripping wrapper punctuation and
/// currency symbols.
pub(crate) fn is_short_token(cell: &str) -> bool {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 24 || trimmed.contains(' ') {
        return false;
    }
    if is_numeric_cell(trimmed) {
        return true;
    }
    let stripped = trimmed
        .trim_matches(|c: char| "()[]{}.,:;\"'".contains(c) || "$€£¥".contains(c));
    !stripped.is_empty()
        && stripped
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '/')
}

/// A cell is numeric per the shared token rule.
pub(crate) fn is_numeric_cell(cell: &str) -> bool {
    is_numeric_token(cell)
}

/// A cell is a sentence when it has at least five words and ends with
/// terminal punctuation.
pub(crate) fn is_sentence_cell(cell: &str) -> bool {
    let words = cell.split_whitespace().count();
    words >= 5 && cell.trim_end().ends_with(['.', '!', '?', '…'])
}

/// A cell is a prose fragment: long, linguistically dense, or a broken
/// sentence. This is the signal that catches two-column layouts whose
/// line joins never closed.
pub(crate) fn is_prose_fragment(cell: &str) -> bool {
    let len = cell.chars().count();
    if len > 60 {
        return true;
    }

    let words: Vec<&str> = cell.split_whitespace().collect();
    if words.len() >= 4 && len > 40 && function_word_ratio(cell) >= 0.15 {
        return true;
    }

    if words.len() >= 5 {
        let starts_capital = cell
            .trim_start()
            .chars()
            .next()
            .map(|c| c.is_uppercase())
            .unwrap_or(false);
        let mean_word_len =
            words.iter().map(|w| w.chars().count()).sum::<usize>() as f32 / words.len() as f32;
        if starts_capital && mean_word_len >= 3.5 {
            return true;
        }
    }

    false
}

/// Infer per-column alignment: right when at least `numeric_threshold` of
/// the non-header cells are numeric, left otherwise.
pub(crate) fn column_alignments(
    grid: &Grid,
    has_header: bool,
    numeric_threshold: f32,
) -> Vec<Alignment> {
    let skip = usize::from(has_header);
    (0..grid.n_cols())
        .map(|col| {
            let mut total = 0usize;
            let mut numeric = 0usize;
            for row in grid.cells.iter().skip(skip) {
                let cell = row[col].trim();
                if cell.is_empty() {
                    continue;
                }
                total += 1;
                if is_numeric_cell(cell) {
                    numeric += 1;
                }
            }
            if total > 0 && numeric as f32 / total as f32 >= numeric_threshold {
                Alignment::Right
            } else {
                Alignment::Left
            }
        })
        .collect()
}

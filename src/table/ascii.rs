//! Whitespace-aligned ASCII strategy.

use crate::classify::starts_with_list_marker;
use crate::config::ScoreWeights;
use crate::model::{Block, DetectionKind, Table};

use super::grid::{column_alignments, Grid, GridProfile};
use super::TableStrategy;

/// Detects tables whose columns are aligned with runs of spaces.
///
/// Lines split on runs of three or more spaces (two as a fallback); the
/// modal cell count must cover at least 60 % of the non-empty rows and be
/// at least two.
pub struct AsciiStrategy;

impl TableStrategy for AsciiStrategy {
    fn name(&self) -> &'static str {
        "ascii"
    }

    fn detect(&self, block: &Block, weights: &ScoreWeights) -> Vec<Table> {
        // List blocks routinely align markers and text, which reads as
        // two columns; they are never tables.
        let list_lines = block
            .lines
            .iter()
            .filter(|l| starts_with_list_marker(&l.text))
            .count();
        if list_lines * 2 > block.lines.len() {
            return Vec::new();
        }

        for min_run in [3usize, 2] {
            if let Some(table) = self.detect_with_run(block, min_run, weights) {
                return vec![table];
            }
        }
        Vec::new()
    }
}

impl AsciiStrategy {
    fn detect_with_run(
        &self,
        block: &Block,
        min_run: usize,
        weights: &ScoreWeights,
    ) -> Option<Table> {
        let rows: Vec<(usize, Vec<String>)> = block
            .lines
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.text.trim().is_empty())
            .map(|(idx, l)| (idx, split_on_space_runs(&l.text, min_run)))
            .collect();

        if rows.len() < 2 {
            return None;
        }

        // Modal cell count across rows.
        let mut histogram: std::collections::BTreeMap<usize, usize> =
            std::collections::BTreeMap::new();
        for (_, cells) in &rows {
            *histogram.entry(cells.len()).or_insert(0) += 1;
        }
        let (target, coverage) = histogram
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))?;

        if target < 2 || (coverage as f32) < rows.len() as f32 * 0.6 {
            return None;
        }

        let start_line = rows.first().map(|(i, _)| *i).unwrap_or(0);
        let end_line = rows.last().map(|(i, _)| *i).unwrap_or(0);
        let grid = Grid::from_rows(rows.into_iter().map(|(_, c)| c).collect(), target);
        let profile = GridProfile::measure(&grid, 0.0, weights);

        if !profile.accepts(weights) {
            log::debug!(
                "ascii strategy: rejected grid {}x{} with score {:.2} (run {})",
                profile.n_rows,
                profile.n_cols,
                profile.score,
                min_run
            );
            return None;
        }

        let has_header = grid.n_rows() > 1;
        let alignments = column_alignments(&grid, has_header, 0.7);
        Some(Table {
            rows: grid.cells,
            has_header,
            alignments,
            confidence: profile.confidence(),
            detection: DetectionKind::Whitespace,
            start_line,
            end_line,
        })
    }
}

/// Split a line into cells on runs of at least `min_run` spaces.
fn split_on_space_runs(line: &str, min_run: usize) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut spaces = 0usize;

    for c in line.trim().chars() {
        if c == ' ' {
            spaces += 1;
            continue;
        }
        if spaces >= min_run && !current.is_empty() {
            cells.push(std::mem::take(&mut current));
        } else if spaces > 0 && !current.is_empty() {
            for _ in 0..spaces {
                current.push(' ');
            }
        }
        spaces = 0;
        current.push(c);
    }
    if !current.is_empty() {
        cells.push(current);
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Glyph, Line};

    fn block(texts: &[&str]) -> Block {
        let lines: Vec<Line> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let glyphs: Vec<Glyph> = t
                    .chars()
                    .enumerate()
                    .map(|(j, ch)| Glyph {
                        ch,
                        x: 20.0 + j as f32 * 6.0,
                        y: 100.0 + i as f32 * 14.0,
                        size: 12.0,
                        font: "Courier".to_string(),
                        bold: false,
                        italic: false,
                    })
                    .collect();
                Line::from_glyphs(glyphs).unwrap()
            })
            .collect();
        Block::from_lines(lines)
    }

    #[test]
    fn test_split_on_space_runs() {
        assert_eq!(
            split_on_space_runs("Name   Age   City", 3),
            vec!["Name", "Age", "City"]
        );
        assert_eq!(
            split_on_space_runs("one cell  two", 3),
            vec!["one cell  two"]
        );
        assert_eq!(
            split_on_space_runs("one cell  two", 2),
            vec!["one cell", "two"]
        );
    }

    #[test]
    fn test_aligned_table() {
        let b = block(&[
            "Region     Sales    Units",
            "North      1200     45",
            "South      900      31",
            "East       1430     52",
        ]);
        let tables = AsciiStrategy.detect(&b, &ScoreWeights::default());
        assert_eq!(tables.len(), 1);

        let t = &tables[0];
        assert_eq!(t.row_count(), 4);
        assert_eq!(t.column_count(), 3);
        assert_eq!(t.detection, DetectionKind::Whitespace);
        assert_eq!(t.rows[1], vec!["North", "1200", "45"]);
    }

    #[test]
    fn test_prose_not_detected() {
        let b = block(&[
            "The survey covered the whole region and was",
            "carried out over three consecutive summers by",
            "a small team of trained field workers there.",
        ]);
        let tables = AsciiStrategy.detect(&b, &ScoreWeights::default());
        assert!(tables.is_empty());
    }
}

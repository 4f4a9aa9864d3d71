//! Central home for the empirical scoring constants.
//!
//! Every weight that tunes classification or table acceptance lives here
//! so re-tuning touches one place. The lock test below pins the shipped
//! values against silent drift.

/// Scoring weights for block classification and grid profiling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    // --- prose score ---
    /// Mean words per sentence within [5, 30]
    pub prose_sentence_length: f32,
    /// Function-word ratio at or above 15 %
    pub prose_function_words: f32,
    /// Function-word ratio above 25 % (stacked on the previous)
    pub prose_function_words_high: f32,
    /// More than 30 % of lines end with sentence punctuation
    pub prose_terminal_punct: f32,
    /// Mean word length within [4, 8]
    pub prose_word_length: f32,

    // --- table score ---
    /// Any pipe character in the block
    pub table_pipe: f32,
    /// 40 % of lines dominated by short cells
    pub table_short_cells: f32,
    /// 30 % of lines containing a purely numeric cell
    pub table_numeric: f32,
    /// 60 % of lines sharing identical cell counts
    pub table_consistent_cells: f32,
    /// Penalty when mean line length exceeds 100
    pub table_long_line_penalty: f32,

    // --- classifier decision thresholds ---
    /// Accept as table at or above this table score
    pub table_accept: f32,
    /// ... and below this prose score
    pub table_accept_prose_max: f32,

    // --- grid profile score ---
    /// Per-row reward
    pub grid_row: f32,
    /// Per-column reward
    pub grid_col: f32,
    /// Short-token ratio reward
    pub grid_short_token: f32,
    /// Numeric ratio reward
    pub grid_numeric: f32,
    /// Sentence penalty above 80 % sentences
    pub grid_sentence_heavy: f32,
    /// Sentence penalty above 40 % sentences
    pub grid_sentence_some: f32,
    /// Prose-fragment penalty above 50 %
    pub grid_fragment_heavy: f32,
    /// Prose-fragment penalty above 30 %
    pub grid_fragment_some: f32,
    /// Prose-fragment penalty above 15 %
    pub grid_fragment_light: f32,
    /// Penalty when prose dominates and tabular cells are scarce
    pub grid_prose_dominant: f32,
    /// Penalty when mean cell length exceeds 80
    pub grid_avg_len_heavy: f32,
    /// Penalty when mean cell length exceeds 50
    pub grid_avg_len_some: f32,
    /// Penalty when the longest cell exceeds 100
    pub grid_max_len: f32,
    /// Reward for large, fragment-light grids
    pub grid_size_bonus: f32,
    /// Reward when every row has equal length
    pub grid_equal_rows: f32,
    /// Reward for dense grids
    pub grid_density_bonus: f32,
    /// Fixed bonus for pipe-bordered grids, applied before profiling
    pub grid_bordered_bonus: f32,
    /// Minimum score the acceptance gate requires
    pub grid_accept_score: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            prose_sentence_length: 0.25,
            prose_function_words: 0.25,
            prose_function_words_high: 0.15,
            prose_terminal_punct: 0.20,
            prose_word_length: 0.15,

            table_pipe: 0.4,
            table_short_cells: 0.25,
            table_numeric: 0.2,
            table_consistent_cells: 0.15,
            table_long_line_penalty: 0.2,

            table_accept: 0.6,
            table_accept_prose_max: 0.4,

            grid_row: 1.0,
            grid_col: 0.8,
            grid_short_token: 3.0,
            grid_numeric: 2.0,
            grid_sentence_heavy: 4.0,
            grid_sentence_some: 2.0,
            grid_fragment_heavy: 6.0,
            grid_fragment_some: 3.0,
            grid_fragment_light: 1.5,
            grid_prose_dominant: 5.0,
            grid_avg_len_heavy: 4.0,
            grid_avg_len_some: 2.0,
            grid_max_len: 2.0,
            grid_size_bonus: 2.0,
            grid_equal_rows: 1.5,
            grid_density_bonus: 1.0,
            grid_bordered_bonus: 2.0,
            grid_accept_score: 2.0,
        }
    }
}

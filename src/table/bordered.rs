//! Bordered strategy: rows drawn with pipe characters.

use crate::config::ScoreWeights;
use crate::model::{Block, DetectionKind, Table};

use super::grid::{column_alignments, Grid, GridProfile};
use super::TableStrategy;

/// Detects tables whose rows carry explicit `|` (or `¦`) borders.
///
/// Separator-only lines (`|---|---|`) are dropped; the surviving data
/// rows receive a fixed score bonus before profiling because explicit
/// borders are the strongest possible table evidence.
pub struct BorderedStrategy;

impl TableStrategy for BorderedStrategy {
    fn name(&self) -> &'static str {
        "bordered"
    }

    fn detect(&self, block: &Block, weights: &ScoreWeights) -> Vec<Table> {
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut first_line = None;
        let mut last_line = 0usize;
        let mut max_pipes = 0usize;

        for (idx, line) in block.lines.iter().enumerate() {
            let text = line.text.trim();
            if !text.contains('|') && !text.contains('¦') {
                continue;
            }
            if is_separator_line(text) {
                first_line.get_or_insert(idx);
                last_line = idx;
                continue;
            }

            let pipes = text.chars().filter(|c| *c == '|' || *c == '¦').count();
            max_pipes = max_pipes.max(pipes);

            let mut cells: Vec<String> = text
                .split(['|', '¦'])
                .map(|c| c.trim().to_string())
                .collect();
            // Boundary pipes produce empty first/last cells.
            if cells.first().is_some_and(|c| c.is_empty()) {
                cells.remove(0);
            }
            if cells.last().is_some_and(|c| c.is_empty()) {
                cells.pop();
            }
            if cells.is_empty() {
                continue;
            }

            first_line.get_or_insert(idx);
            last_line = idx;
            rows.push(cells);
        }

        if rows.len() < 2 || max_pipes < 2 {
            return Vec::new();
        }

        let cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let grid = Grid::from_rows(rows, cols);
        let profile = GridProfile::measure(&grid, weights.grid_bordered_bonus, weights);

        if !profile.accepts(weights) {
            log::debug!(
                "bordered strategy: rejected grid {}x{} with score {:.2}",
                profile.n_rows,
                profile.n_cols,
                profile.score
            );
            return Vec::new();
        }

        let has_header = grid.n_rows() > 1;
        let alignments = column_alignments(&grid, has_header, 0.7);
        vec![Table {
            rows: grid.cells,
            has_header,
            alignments,
            confidence: profile.confidence(),
            detection: DetectionKind::Bordered,
            start_line: first_line.unwrap_or(0),
            end_line: last_line,
        }]
    }
}

/// A separator line contains only pipes, colons, dashes and whitespace.
fn is_separator_line(line: &str) -> bool {
    !line.is_empty()
        && line
            .chars()
            .all(|c| c == '|' || c == '¦' || c == ':' || c == '-' || c.is_whitespace())
}

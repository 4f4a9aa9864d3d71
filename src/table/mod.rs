//! Table detection: three strategies behind one orchestrator.
//!
//! Strategies run in order (bordered, whitespace-aligned, positioned);
//! the first accepted table wins its line range, and later strategies may
//! only add tables that do not overlap an accepted range.

mod ascii;
mod bordered;
mod grid;
mod positioned;

pub use ascii::AsciiStrategy;
pub use bordered::BorderedStrategy;
pub use grid::{Grid, GridProfile};
pub use positioned::PositionedStrategy;

use crate::classify::starts_with_list_marker;
use crate::config::ScoreWeights;
use crate::model::{Block, Table};

/// A table detection strategy over one block.
pub trait TableStrategy: Send + Sync {
    /// Strategy name for diagnostics.
    fn name(&self) -> &'static str;

    /// Detect candidate tables in a block. Returned tables have already
    /// passed the grid profile gate.
    fn detect(&self, block: &Block, weights: &ScoreWeights) -> Vec<Table>;
}

/// Runs the strategies and suppresses overlapping results.
pub struct TableDetector {
    weights: ScoreWeights,
    strategies: Vec<Box<dyn TableStrategy>>,
}

impl TableDetector {
    /// Create a detector with the standard strategy order.
    pub fn new(weights: ScoreWeights) -> Self {
        Self {
            weights,
            strategies: vec![
                Box::new(BorderedStrategy),
                Box::new(AsciiStrategy),
                Box::new(PositionedStrategy),
            ],
        }
    }

    /// Detect tables in a block that layout analysis marked as a
    /// candidate.
    pub fn detect(&self, block: &Block) -> Vec<Table> {
        let mut accepted: Vec<Table> = Vec::new();

        for strategy in &self.strategies {
            for table in strategy.detect(block, &self.weights) {
                let overlaps = accepted
                    .iter()
                    .any(|t| t.overlaps(table.start_line, table.end_line));
                if overlaps {
                    continue;
                }
                log::debug!(
                    "table detector: {} accepted {}x{} table (lines {}..={})",
                    strategy.name(),
                    table.row_count(),
                    table.column_count(),
                    table.start_line,
                    table.end_line
                );
                accepted.push(table);
            }
        }

        accepted.sort_by_key(|t| t.start_line);
        accepted
    }

    /// Detect tables in a block without layout classification, skipping
    /// blocks that are obviously not tables.
    pub fn detect_unclassified(&self, block: &Block) -> Vec<Table> {
        if obviously_non_table(block) {
            return Vec::new();
        }
        self.detect(block)
    }
}

/// Cheap filter for running detection without a classifier: short blocks
/// without column structure, list blocks and code-heavy blocks are never
/// tables.
fn obviously_non_table(block: &Block) -> bool {
    if block.line_count() < 2 {
        return true;
    }

    let list_lines = block
        .lines
        .iter()
        .filter(|l| starts_with_list_marker(&l.text))
        .count();
    if list_lines * 2 > block.line_count() {
        return true;
    }

    let text = block.text();
    let code_chars = text
        .chars()
        .filter(|c| matches!(c, '{' | '}' | ';' | '=' | '<' | '>'))
        .count();
    code_chars * 10 > text.chars().count()
}

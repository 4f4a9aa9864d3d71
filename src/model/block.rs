//! Blocks: vertically contiguous lines within one column.

use super::{Line, Rect};

/// A group of lines separated by at most the grouping threshold.
#[derive(Debug, Clone)]
pub struct Block {
    /// Lines in top-to-bottom order
    pub lines: Vec<Line>,
    /// Envelope of the line bboxes, extended one font size below the last
    /// baseline
    pub bbox: Rect,
    /// Character-count-weighted mean font size across lines
    pub avg_size: f32,
}

impl Block {
    /// Build a block from lines. Lines must be non-empty and sorted by y.
    pub fn from_lines(lines: Vec<Line>) -> Self {
        debug_assert!(!lines.is_empty());

        let total_chars: usize = lines.iter().map(|l| l.char_count()).sum();
        let weighted: f32 = lines
            .iter()
            .map(|l| l.avg_size * l.char_count() as f32)
            .sum();
        let avg_size = if total_chars > 0 {
            weighted / total_chars as f32
        } else {
            12.0
        };

        let mut bbox = lines[0].bbox();
        for line in &lines[1..] {
            bbox = bbox.union(&line.bbox());
        }
        bbox.max_y += avg_size;

        Self {
            lines,
            bbox,
            avg_size,
        }
    }

    /// Block text: line texts joined by newlines.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of lines in the block.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total characters across lines.
    pub fn char_count(&self) -> usize {
        self.lines.iter().map(|l| l.char_count()).sum()
    }

    /// Fraction of characters carrying the bold attribute.
    pub fn bold_ratio(&self) -> f32 {
        let total = self.char_count();
        if total == 0 {
            return 0.0;
        }
        let bold: usize = self
            .lines
            .iter()
            .flat_map(|l| l.glyphs.iter())
            .filter(|g| g.bold)
            .count();
        bold as f32 / total as f32
    }

    /// Fraction of characters carrying the italic attribute.
    pub fn italic_ratio(&self) -> f32 {
        let total = self.char_count();
        if total == 0 {
            return 0.0;
        }
        let italic: usize = self
            .lines
            .iter()
            .flat_map(|l| l.glyphs.iter())
            .filter(|g| g.italic)
            .count();
        italic as f32 / total as f32
    }

    /// Mean baseline-to-baseline distance, falling back to 1.2 times the
    /// font size for single-line blocks.
    pub fn avg_line_height(&self) -> f32 {
        if self.lines.len() < 2 {
            return self.avg_size * 1.2;
        }
        let gaps: f32 = self
            .lines
            .windows(2)
            .map(|w| (w[1].y - w[0].y).abs())
            .sum();
        gaps / (self.lines.len() - 1) as f32
    }
}

/// Structural label assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Running prose
    Prose,
    /// Prose that is one column of a multi-column layout
    ProseColumn,
    /// A heading with its level (1..=3)
    Heading(u8),
    /// A bulleted or numbered list
    List,
    /// Source code or preformatted text
    Code,
    /// A candidate for table detection
    PotentialTable,
    /// Nothing matched
    Unknown,
}

impl BlockKind {
    /// Whether this label is a prose flavor.
    pub fn is_prose(&self) -> bool {
        matches!(self, BlockKind::Prose | BlockKind::ProseColumn)
    }
}

/// A block with its structural label. Immutable once emitted.
#[derive(Debug, Clone)]
pub struct ClassifiedBlock {
    /// The underlying block
    pub block: Block,
    /// Structural label
    pub kind: BlockKind,
    /// Classifier confidence in [0, 1]
    pub confidence: f32,
    /// Index of the owning column, left to right
    pub column: usize,
}

//! A text line: ordered glyphs sharing a baseline.

use super::{Glyph, Rect};

/// A line of glyphs committed by the line builder.
///
/// Glyph order is the shaper's reading order; x is monotonic within a line
/// for horizontal scripts.
#[derive(Debug, Clone)]
pub struct Line {
    /// The glyphs in reading order
    pub glyphs: Vec<Glyph>,
    /// Baseline y
    pub y: f32,
    /// Leftmost glyph x
    pub min_x: f32,
    /// Rightmost glyph extent (x plus advance)
    pub max_x: f32,
    /// Character-count-weighted mean font size
    pub avg_size: f32,
    /// Majority weight across glyphs
    pub bold: bool,
    /// Majority style across glyphs
    pub italic: bool,
    /// Glyph characters concatenated in input order
    pub text: String,
}

impl Line {
    /// Build a line from glyphs. Returns `None` when the glyph list is
    /// empty or contains only whitespace.
    pub fn from_glyphs(glyphs: Vec<Glyph>) -> Option<Self> {
        if glyphs.is_empty() || glyphs.iter().all(|g| g.ch.is_whitespace()) {
            return None;
        }

        let n = glyphs.len() as f32;
        let avg_size = glyphs.iter().map(|g| g.size).sum::<f32>() / n;
        let y = glyphs.iter().map(|g| g.y).sum::<f32>() / n;
        let min_x = glyphs
            .iter()
            .map(|g| g.x)
            .fold(f32::INFINITY, f32::min);
        let max_x = glyphs
            .iter()
            .map(|g| g.x + g.advance())
            .fold(f32::NEG_INFINITY, f32::max);

        let bold_count = glyphs.iter().filter(|g| g.bold).count();
        let italic_count = glyphs.iter().filter(|g| g.italic).count();
        let half = glyphs.len() / 2;

        let text: String = glyphs.iter().map(|g| g.ch).collect();

        Some(Self {
            bold: bold_count > half,
            italic: italic_count > half,
            y,
            min_x,
            max_x,
            avg_size,
            text,
            glyphs,
        })
    }

    /// Horizontal center of the line span.
    pub fn x_center(&self) -> f32 {
        (self.min_x + self.max_x) / 2.0
    }

    /// Number of characters on the line.
    pub fn char_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Bounding box, using the font size as the vertical extent above the
    /// baseline.
    pub fn bbox(&self) -> Rect {
        Rect::new(self.min_x, self.y - self.avg_size, self.max_x, self.y)
    }
}

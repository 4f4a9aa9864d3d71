//! The positioned character record, unit of the pipeline.

/// One positioned character delivered by the text shaper.
///
/// Immutable once built; everything downstream is derived from glyphs.
#[derive(Debug, Clone)]
pub struct Glyph {
    /// The character
    pub ch: char,
    /// X origin (left edge of the glyph cell)
    pub x: f32,
    /// Y origin (baseline, top-down space)
    pub y: f32,
    /// Font size in points
    pub size: f32,
    /// Font family name as reported by the shaper
    pub font: String,
    /// Whether the glyph's font weight is bold
    pub bold: bool,
    /// Whether the glyph's font style is italic
    pub italic: bool,
}

impl Glyph {
    /// Estimated horizontal advance. Shapers that do not report advances
    /// get the half-em approximation used throughout the pipeline.
    pub fn advance(&self) -> f32 {
        self.size * 0.5
    }
}

//! External collaborator contracts: glyph sources and OCR.
//!
//! The engine consumes positioned glyphs through the [`GlyphSource`] trait
//! and never touches a PDF library directly; [`pdf::PdfGlyphSource`] is the
//! default lopdf-backed implementation.

pub mod pdf;

use crate::error::Result;
use crate::model::Rect;

/// Writing mode reported with each line. Only horizontal lines are
/// reconstructed; vertical text passes through in shaper order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritingMode {
    /// Left-to-right horizontal text
    #[default]
    Horizontal,
    /// Top-to-bottom vertical text
    Vertical,
}

/// One framing or character event in a page's glyph stream.
///
/// Ordering is the visual reading order of the shaper; the engine performs
/// no reordering.
#[derive(Debug, Clone)]
pub enum PageEvent {
    /// A new line begins with a provisional bounding box.
    BeginLine {
        /// Provisional line bbox as reported by the shaper
        bbox: Rect,
        /// Writing mode of the line
        mode: WritingMode,
    },
    /// One character of the current line.
    Char {
        /// The character
        ch: char,
        /// X origin
        x: f32,
        /// Y origin (baseline, top-down space)
        y: f32,
        /// Font size in points
        size: f32,
        /// Font family name
        font: String,
        /// Bold weight
        bold: bool,
        /// Italic style
        italic: bool,
    },
    /// The current line ends; commit it if non-empty.
    EndLine,
}

/// A page's dimensions and ordered event stream.
#[derive(Debug, Clone)]
pub struct GlyphPage {
    /// 1-indexed page number
    pub number: u32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Ordered glyph events
    pub events: Vec<PageEvent>,
}

/// A source of per-page glyph streams. Required collaborator.
pub trait GlyphSource: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Fetch one page's dimensions and event stream. Pages are 1-indexed.
    fn page(&self, number: u32) -> Result<GlyphPage>;

    /// Raster image of a page for OCR, if the source can produce one.
    /// The default implementation cannot.
    fn raster(&self, _number: u32) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

/// Optional OCR collaborator, consulted only when glyph extraction yields
/// less than one character of text or OCR is explicitly enabled.
pub trait OcrAdapter: Send + Sync {
    /// Recognize plain text in a raster image.
    fn recognize(&self, image: &[u8], language: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_raster_is_none() {
        struct Empty;
        impl GlyphSource for Empty {
            fn page_count(&self) -> u32 {
                0
            }
            fn page(&self, _n: u32) -> Result<GlyphPage> {
                unreachable!()
            }
        }
        assert!(Empty.raster(1).unwrap().is_none());
    }
}

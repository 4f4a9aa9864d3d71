//! # glyphmark
//!
//! Layout-aware PDF to Markdown reconstruction.
//!
//! Given per-page glyph records (character, position, font, size, weight,
//! style) from a text shaper, glyphmark rebuilds document structure the
//! source only encodes as painting operations: headings, paragraphs,
//! lists, tables and mathematical notation come back out as clean
//! Markdown, while running headers, footers and page numbers are
//! discarded.
//!
//! ## Quick start
//!
//! ```no_run
//! use glyphmark::{convert_file, ConvertOptions};
//!
//! fn main() -> glyphmark::Result<()> {
//!     let conversion = convert_file("paper.pdf", &ConvertOptions::default())?;
//!     println!("{}", conversion.markdown);
//!     println!("{} words", conversion.stats.word_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! Per page: glyph events become lines, lines partition into columns,
//! columns group into blocks, blocks classify as prose, headings, lists,
//! code or table candidates, candidate blocks run through three table
//! strategies, and the emitter writes Markdown in reading order. After
//! all pages: repeating headers and footers are stripped, hyphenation is
//! repaired, orphan lines and bullets are merged, and statistics are
//! computed.
//!
//! The layout analyzer leans deliberately toward prose: a two-column
//! academic page misread as a table destroys the output, so ambiguous
//! blocks stay paragraphs.

pub mod classify;
pub mod config;
pub mod detect;
pub mod emit;
pub mod engine;
pub mod error;
pub mod garbled;
pub mod json;
pub mod layout;
pub mod math;
pub mod model;
pub mod normalize;
pub mod options;
pub mod source;
pub mod table;

pub use config::ScoreWeights;
pub use engine::{CancelToken, Engine};
pub use error::{Error, Result};
pub use json::{to_json, JsonFormat};
pub use model::{
    Conversion, DocumentStats, PageAdvisory, PageWarning, VisionAdvisory, WarningKind,
};
pub use options::ConvertOptions;
pub use source::{pdf::PdfGlyphSource, GlyphPage, GlyphSource, OcrAdapter, PageEvent};

use std::path::Path;

/// Convert a PDF file to Markdown.
pub fn convert_file<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> Result<Conversion> {
    detect::detect_format_from_path(path.as_ref())?;
    let source = PdfGlyphSource::open(path)?;
    Engine::new(options.clone()).convert(&source)
}

/// Convert a password-protected PDF file to Markdown.
pub fn convert_file_with_password<P: AsRef<Path>>(
    path: P,
    password: &str,
    options: &ConvertOptions,
) -> Result<Conversion> {
    detect::detect_format_from_path(path.as_ref())?;
    let source = PdfGlyphSource::open_with_password(path, Some(password))?;
    Engine::new(options.clone()).convert(&source)
}

/// Convert PDF bytes to Markdown.
pub fn convert_bytes(data: &[u8], options: &ConvertOptions) -> Result<Conversion> {
    detect::detect_format_from_bytes(data)?;
    let source = PdfGlyphSource::from_bytes(data)?;
    Engine::new(options.clone()).convert(&source)
}

/// Convert any glyph source to Markdown.
pub fn convert_source(source: &dyn GlyphSource, options: &ConvertOptions) -> Result<Conversion> {
    Engine::new(options.clone()).convert(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_bytes_rejects_non_pdf() {
        let result = convert_bytes(b"not a pdf at all", &ConvertOptions::default());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_public_api_surface() {
        // The exported names stay stable.
        let _options = ConvertOptions::default();
        let _weights = ScoreWeights::default();
        let _token = CancelToken::new();
    }
}

//! Conversion results: the Markdown string, statistics and warnings.

use serde::{Deserialize, Serialize};

/// Statistics computed over the final Markdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Words after stripping Markdown syntax
    pub word_count: usize,
    /// `#`-prefixed heading lines
    pub heading_count: usize,
    /// Pipe-row table runs
    pub table_count: usize,
    /// Bulleted and numbered list items
    pub list_item_count: usize,
    /// Markdown image references
    pub image_count: usize,
    /// Pages processed
    pub page_count: usize,
}

/// Category of a per-page warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// The page produced zero text lines
    DegenerateLayout,
    /// OCR was needed but unavailable
    OcrUnavailable,
    /// The garbled-font heuristic recommends vision reprocessing
    GarbledMathFont,
    /// Any other recoverable page failure
    PageFailed,
}

/// A recoverable failure recorded against one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageWarning {
    /// 1-indexed page number
    pub page: u32,
    /// Warning category
    pub kind: WarningKind,
    /// Human-readable description
    pub message: String,
}

/// Advisory result of the garbled-font heuristic for one page's text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionAdvisory {
    /// Whether reprocessing through a vision collaborator is warranted
    pub recommend: bool,
    /// Which signal triggered the recommendation
    pub reason: String,
    /// Share of garbled characters in the page text, 0..=100
    pub garbled_percentage: f32,
}

/// A [`VisionAdvisory`] attached to its page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageAdvisory {
    /// 1-indexed page number
    pub page: u32,
    /// The advisory
    pub advisory: VisionAdvisory,
}

/// The document-level conversion result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversion {
    /// The reconstructed Markdown
    pub markdown: String,
    /// Statistics over the final Markdown
    pub stats: DocumentStats,
    /// Per-page recoverable failures
    pub warnings: Vec<PageWarning>,
    /// Per-page garbled-font advisories (only pages that recommend)
    pub advisories: Vec<PageAdvisory>,
}

impl Conversion {
    /// Whether any page recommends the vision fallback.
    pub fn has_garbled_pages(&self) -> bool {
        !self.advisories.is_empty()
    }
}

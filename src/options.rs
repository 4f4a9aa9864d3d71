//! Conversion options.

/// Options controlling the reconstruction pipeline.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Run the table detector on candidate blocks
    pub detect_tables: bool,
    /// Run the math tokenizer on emitted text
    pub detect_math: bool,
    /// Detect and strip repeating headers and footers
    pub remove_headers_footers: bool,
    /// Repair hyphenation at line breaks
    pub fix_hyphenation: bool,
    /// Keep blank-line runs and skip line defragmentation
    pub preserve_layout: bool,
    /// Emit code blocks fenced rather than verbatim
    pub code_fences: bool,
    /// Process pages in parallel
    pub parallel: bool,
    /// OCR is explicitly requested
    pub ocr: bool,
    /// ISO language code passed to the OCR adapter
    pub ocr_language: String,
}

impl ConvertOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable table detection.
    pub fn without_tables(mut self) -> Self {
        self.detect_tables = false;
        self
    }

    /// Disable math tokenization.
    pub fn without_math(mut self) -> Self {
        self.detect_math = false;
        self
    }

    /// Disable header/footer removal.
    pub fn without_header_footer_removal(mut self) -> Self {
        self.remove_headers_footers = false;
        self
    }

    /// Disable hyphenation repair.
    pub fn without_hyphenation_fix(mut self) -> Self {
        self.fix_hyphenation = false;
        self
    }

    /// Preserve the source layout: blank-line runs survive and short
    /// lines are not merged.
    pub fn with_preserved_layout(mut self) -> Self {
        self.preserve_layout = true;
        self
    }

    /// Process pages sequentially.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Request OCR with a language code.
    pub fn with_ocr(mut self, language: impl Into<String>) -> Self {
        self.ocr = true;
        self.ocr_language = language.into();
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            detect_tables: true,
            detect_math: true,
            remove_headers_footers: true,
            fix_hyphenation: true,
            preserve_layout: false,
            code_fences: true,
            parallel: true,
            ocr: false,
            ocr_language: "eng".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let options = ConvertOptions::new()
            .without_tables()
            .without_math()
            .with_preserved_layout()
            .sequential();
        assert!(!options.detect_tables);
        assert!(!options.detect_math);
        assert!(options.preserve_layout);
        assert!(!options.parallel);
        assert!(options.remove_headers_footers);
    }

    #[test]
    fn test_ocr_options() {
        let options = ConvertOptions::new().with_ocr("deu");
        assert!(options.ocr);
        assert_eq!(options.ocr_language, "deu");
    }
}

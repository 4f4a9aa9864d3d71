//! Top-level orchestration: per-page pipeline, cross-page passes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::classify::{body_font_size, merge_adjacent, BlockClassifier};
use crate::config::ScoreWeights;
use crate::emit::MarkdownEmitter;
use crate::error::{Error, Result};
use crate::garbled;
use crate::layout::{analyze_columns, build_lines, group_blocks};
use crate::model::{
    BlockKind, Conversion, PageAdvisory, PageWarning, Table, VisionAdvisory, WarningKind,
};
use crate::normalize::{Normalizer, PageSample};
use crate::options::ConvertOptions;
use crate::source::{GlyphSource, OcrAdapter};
use crate::table::TableDetector;

/// Cooperative cancellation handle, checked between pages and between
/// cross-page passes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Everything one page produces.
struct PageOutcome {
    markdown: String,
    sample: PageSample,
    warnings: Vec<PageWarning>,
    advisory: Option<VisionAdvisory>,
}

/// The conversion engine.
///
/// Pure transformation from glyph streams to Markdown: single-threaded
/// per page, optionally parallel across pages, with the cross-page
/// normalizer running strictly after all pages are available.
pub struct Engine {
    options: ConvertOptions,
    weights: ScoreWeights,
    cancel: CancelToken,
    ocr: Option<Box<dyn OcrAdapter>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

impl Engine {
    /// Create an engine with the given options.
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            weights: ScoreWeights::default(),
            cancel: CancelToken::new(),
            ocr: None,
        }
    }

    /// Override the scoring weights.
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Register an OCR adapter.
    pub fn with_ocr_adapter(mut self, adapter: Box<dyn OcrAdapter>) -> Self {
        self.ocr = Some(adapter);
        self
    }

    /// Handle for cancelling a running conversion from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Convert a whole document.
    pub fn convert(&self, source: &dyn GlyphSource) -> Result<Conversion> {
        let page_count = source.page_count();
        if page_count == 0 {
            return Err(Error::InvalidInput("document has no pages".to_string()));
        }
        if self.options.ocr && self.ocr.is_none() {
            return Err(Error::OcrUnavailable(
                "OCR requested but no adapter is registered".to_string(),
            ));
        }

        let numbers: Vec<u32> = (1..=page_count).collect();
        let outcomes: Vec<PageOutcome> = if self.options.parallel && page_count > 1 {
            numbers
                .par_iter()
                .map(|n| self.convert_page(source, *n))
                .collect::<Result<Vec<_>>>()?
        } else {
            let mut collected = Vec::with_capacity(numbers.len());
            for n in numbers {
                collected.push(self.convert_page(source, n)?);
            }
            collected
        };

        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut warnings = Vec::new();
        let mut advisories = Vec::new();
        let mut samples = Vec::with_capacity(outcomes.len());
        let mut pages_markdown = Vec::with_capacity(outcomes.len());

        for outcome in outcomes {
            warnings.extend(outcome.warnings);
            if let Some(advisory) = outcome.advisory {
                advisories.push(PageAdvisory {
                    page: outcome.sample.page,
                    advisory,
                });
            }
            pages_markdown.push(outcome.markdown);
            samples.push(outcome.sample);
        }

        let document = pages_markdown
            .iter()
            .filter(|m| !m.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n\n");

        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let normalizer = Normalizer::new(self.options.clone());
        let markdown = normalizer.process(&document, &samples);
        let stats = normalizer.stats(&markdown, page_count as usize);

        Ok(Conversion {
            markdown,
            stats,
            warnings,
            advisories,
        })
    }

    /// Run the per-page pipeline. Only password errors and cancellation
    /// are fatal; everything else records a warning and yields an empty
    /// page.
    fn convert_page(&self, source: &dyn GlyphSource, number: u32) -> Result<PageOutcome> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut warnings = Vec::new();

        let page = match source.page(number) {
            Ok(page) => page,
            Err(e @ (Error::PasswordRequired | Error::PasswordIncorrect)) => return Err(e),
            Err(e) => {
                warnings.push(PageWarning {
                    page: number,
                    kind: WarningKind::PageFailed,
                    message: e.to_string(),
                });
                return Ok(PageOutcome {
                    markdown: String::new(),
                    sample: PageSample {
                        page: number,
                        ..Default::default()
                    },
                    warnings,
                    advisory: None,
                });
            }
        };

        let (width, height) = (page.width, page.height);
        let lines = build_lines(page.events);

        // Fewer than one character of text: the OCR path, or an empty
        // page recorded as degenerate.
        if lines.iter().map(|l| l.char_count()).sum::<usize>() < 1 {
            let markdown = self.try_ocr(source, number, &mut warnings);
            if markdown.is_empty() {
                warnings.push(PageWarning {
                    page: number,
                    kind: WarningKind::DegenerateLayout,
                    message: "page produced no text lines".to_string(),
                });
            }
            let sample = PageSample::from_markdown(number, &markdown);
            return Ok(PageOutcome {
                markdown,
                sample,
                warnings,
                advisory: None,
            });
        }

        let body_size = body_font_size(&lines);
        let layout = analyze_columns(lines, width, height)?;

        log::debug!(
            "page {}: {} columns (multi = {}), body size {:.1}",
            number,
            layout.columns.len(),
            layout.is_multi_column,
            body_size
        );

        let classifier = BlockClassifier::new(body_size, layout.is_multi_column, self.weights);
        let detector = TableDetector::new(self.weights);
        let mut emitter = MarkdownEmitter::new(&self.options);

        // Columns left to right, blocks top to bottom within each.
        for (column_index, column) in layout.columns.into_iter().enumerate() {
            let blocks = group_blocks(column.lines);
            let classified = merge_adjacent(
                blocks
                    .into_iter()
                    .map(|b| classifier.classify(b, column_index))
                    .collect(),
            );

            for cb in &classified {
                let tables: Vec<Table> =
                    if self.options.detect_tables && cb.kind == BlockKind::PotentialTable {
                        detector.detect(&cb.block)
                    } else {
                        Vec::new()
                    };
                emitter.emit_block(cb, &tables);
            }
        }

        let markdown = emitter.finish();
        let sample = PageSample::from_markdown(number, &markdown);

        let advisory = match garbled::assess_page(&markdown) {
            a if a.recommend => {
                warnings.push(PageWarning {
                    page: number,
                    kind: WarningKind::GarbledMathFont,
                    message: a.reason.clone(),
                });
                Some(a)
            }
            _ => None,
        };

        Ok(PageOutcome {
            markdown,
            sample,
            warnings,
            advisory,
        })
    }

    /// Attempt OCR on an empty page, when enabled and possible.
    fn try_ocr(
        &self,
        source: &dyn GlyphSource,
        number: u32,
        warnings: &mut Vec<PageWarning>,
    ) -> String {
        if !self.options.ocr {
            return String::new();
        }
        let Some(adapter) = &self.ocr else {
            return String::new();
        };

        let raster = match source.raster(number) {
            Ok(Some(raster)) => raster,
            Ok(None) => {
                warnings.push(PageWarning {
                    page: number,
                    kind: WarningKind::OcrUnavailable,
                    message: "glyph source cannot rasterize pages".to_string(),
                });
                return String::new();
            }
            Err(e) => {
                warnings.push(PageWarning {
                    page: number,
                    kind: WarningKind::OcrUnavailable,
                    message: e.to_string(),
                });
                return String::new();
            }
        };

        match adapter.recognize(&raster, &self.options.ocr_language) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warnings.push(PageWarning {
                    page: number,
                    kind: WarningKind::OcrUnavailable,
                    message: e.to_string(),
                });
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rect;
    use crate::source::{GlyphPage, PageEvent, WritingMode};

    /// A glyph source yielding pre-built pages.
    struct FixtureSource {
        pages: Vec<GlyphPage>,
    }

    impl GlyphSource for FixtureSource {
        fn page_count(&self) -> u32 {
            self.pages.len() as u32
        }

        fn page(&self, number: u32) -> Result<GlyphPage> {
            self.pages
                .get((number - 1) as usize)
                .cloned()
                .ok_or_else(|| Error::InvalidInput("page out of range".to_string()))
        }
    }

    fn text_line_events(text: &str, x0: f32, y: f32, size: f32) -> Vec<PageEvent> {
        let mut events = vec![PageEvent::BeginLine {
            bbox: Rect::new(x0, y - size, x0 + text.len() as f32 * size * 0.5, y),
            mode: WritingMode::Horizontal,
        }];
        for (i, ch) in text.chars().enumerate() {
            events.push(PageEvent::Char {
                ch,
                x: x0 + i as f32 * size * 0.5,
                y,
                size,
                font: "Times".to_string(),
                bold: false,
                italic: false,
            });
        }
        events.push(PageEvent::EndLine);
        events
    }

    fn page_of(texts: &[&str], number: u32) -> GlyphPage {
        let mut events = Vec::new();
        for (i, t) in texts.iter().enumerate() {
            events.extend(text_line_events(t, 50.0, 100.0 + i as f32 * 14.0, 12.0));
        }
        GlyphPage {
            number,
            width: 612.0,
            height: 792.0,
            events,
        }
    }

    #[test]
    fn test_zero_pages_is_invalid_input() {
        let engine = Engine::default();
        let source = FixtureSource { pages: vec![] };
        assert!(matches!(
            engine.convert(&source),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_empty_page_records_warning_not_error() {
        let engine = Engine::default();
        let source = FixtureSource {
            pages: vec![
                page_of(&["Some ordinary text on the first page."], 1),
                GlyphPage {
                    number: 2,
                    width: 612.0,
                    height: 792.0,
                    events: vec![],
                },
            ],
        };
        let conversion = engine.convert(&source).unwrap();
        assert!(conversion.markdown.contains("ordinary text"));
        assert!(conversion
            .warnings
            .iter()
            .any(|w| w.page == 2 && w.kind == WarningKind::DegenerateLayout));
    }

    #[test]
    fn test_ocr_required_without_adapter_fails() {
        let engine = Engine::new(ConvertOptions::new().with_ocr("eng"));
        let source = FixtureSource {
            pages: vec![page_of(&["text"], 1)],
        };
        assert!(matches!(
            engine.convert(&source),
            Err(Error::OcrUnavailable(_))
        ));
    }

    #[test]
    fn test_cancellation_surfaces() {
        let engine = Engine::default();
        engine.cancel_token().cancel();
        let source = FixtureSource {
            pages: vec![page_of(&["text"], 1)],
        };
        assert!(matches!(engine.convert(&source), Err(Error::Cancelled)));
    }

    #[test]
    fn test_determinism() {
        let engine = Engine::new(ConvertOptions::default().sequential());
        let source = FixtureSource {
            pages: vec![
                page_of(
                    &[
                        "The pipeline must be deterministic for any input.",
                        "Each run produces exactly the same bytes as before.",
                    ],
                    1,
                ),
                page_of(&["A second page with more plain prose on it."], 2),
            ],
        };
        let first = engine.convert(&source).unwrap();
        let second = engine.convert(&source).unwrap();
        assert_eq!(first.markdown, second.markdown);
        assert_eq!(first.stats, second.stats);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let pages = vec![
            page_of(&["First page prose content goes along here unchanged."], 1),
            page_of(&["Second page body text is different enough to keep."], 2),
        ];

        let sequential = Engine::new(ConvertOptions::default().sequential())
            .convert(&FixtureSource {
                pages: pages.clone(),
            })
            .unwrap();
        let parallel = Engine::new(ConvertOptions::default())
            .convert(&FixtureSource { pages })
            .unwrap();
        assert_eq!(sequential.markdown, parallel.markdown);
        assert!(sequential.markdown.contains("First page prose"));
    }
}

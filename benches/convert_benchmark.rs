//! Conversion benchmark over synthetic multi-page documents.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use glyphmark::model::Rect;
use glyphmark::source::WritingMode;
use glyphmark::{ConvertOptions, Engine, Error, GlyphPage, GlyphSource, PageEvent, Result};

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

fn line_events(text: &str, x0: f32, y: f32, size: f32) -> Vec<PageEvent> {
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
            font: "Times-Roman".to_string(),
            bold: false,
            italic: false,
        });
    }
    events.push(PageEvent::EndLine);
    events
}

fn synthetic_document(pages: u32) -> FixtureSource {
    let body = [
        "The measurement campaign ran for several weeks in total.",
        "Each sensor array logged readings at one minute intervals.",
        "Calibration drift was corrected against the reference cell.",
        "Aggregated results were written to the archive every night.",
        "Weekly summaries confirmed the stability of the apparatus.",
    ];

    let pages = (1..=pages)
        .map(|n| {
            let mut events = Vec::new();
            events.extend(line_events("Measurement Report", 50.0, 60.0, 18.0));
            for (i, t) in body.iter().enumerate() {
                events.extend(line_events(t, 50.0, 130.0 + i as f32 * 15.0, 12.0));
            }
            events.extend(line_events(
                "| Run | Mean | Spread |",
                50.0,
                300.0,
                12.0,
            ));
            events.extend(line_events(
                "|-----|------|--------|",
                50.0,
                315.0,
                12.0,
            ));
            events.extend(line_events("| 1 | 4.2 | 0.3 |", 50.0, 330.0, 12.0));
            events.extend(line_events("| 2 | 4.4 | 0.2 |", 50.0, 345.0, 12.0));
            events.extend(line_events(&format!("Page {}", n), 50.0, 740.0, 12.0));
            GlyphPage {
                number: n,
                width: 612.0,
                height: 792.0,
                events,
            }
        })
        .collect();

    FixtureSource { pages }
}

fn bench_convert(c: &mut Criterion) {
    let source = synthetic_document(10);
    let engine = Engine::new(ConvertOptions::default().sequential());

    c.bench_function("convert_10_pages", |b| {
        b.iter(|| {
            let conversion = engine.convert(black_box(&source)).unwrap();
            black_box(conversion.markdown.len())
        })
    });
}

fn bench_convert_parallel(c: &mut Criterion) {
    let source = synthetic_document(10);
    let engine = Engine::new(ConvertOptions::default());

    c.bench_function("convert_10_pages_parallel", |b| {
        b.iter(|| {
            let conversion = engine.convert(black_box(&source)).unwrap();
            black_box(conversion.markdown.len())
        })
    });
}

criterion_group!(benches, bench_convert, bench_convert_parallel);
criterion_main!(benches);

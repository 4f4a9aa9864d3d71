//! Glyph line builder: turns the shaper's framed event stream into lines.

use crate::model::{Glyph, Line};
use crate::source::PageEvent;

/// Accumulates glyph events into committed lines.
///
/// `BeginLine` opens a line, `Char` appends to it, `EndLine` commits it if
/// non-empty. No reordering happens here: reading order is the shaper's
/// order.
#[derive(Debug, Default)]
pub struct LineBuilder {
    lines: Vec<Line>,
    current: Option<Vec<Glyph>>,
}

impl LineBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one event.
    pub fn push(&mut self, event: PageEvent) {
        match event {
            PageEvent::BeginLine { .. } => {
                self.commit();
                self.current = Some(Vec::new());
            }
            PageEvent::Char {
                ch,
                x,
                y,
                size,
                font,
                bold,
                italic,
            } => {
                // A stray Char before any BeginLine still opens a line so
                // no glyph is lost.
                let glyphs = self.current.get_or_insert_with(Vec::new);
                glyphs.push(Glyph {
                    ch,
                    x,
                    y,
                    size,
                    font,
                    bold,
                    italic,
                });
            }
            PageEvent::EndLine => self.commit(),
        }
    }

    /// Commit any open line and return all built lines.
    pub fn finish(mut self) -> Vec<Line> {
        self.commit();
        self.lines
    }

    fn commit(&mut self) {
        if let Some(glyphs) = self.current.take() {
            if let Some(line) = Line::from_glyphs(glyphs) {
                self.lines.push(line);
            }
        }
    }
}

/// Build lines from a full event stream.
pub fn build_lines(events: Vec<PageEvent>) -> Vec<Line> {
    let mut builder = LineBuilder::new();
    for event in events {
        builder.push(event);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rect;
    use crate::source::WritingMode;

    fn begin() -> PageEvent {
        PageEvent::BeginLine {
            bbox: Rect::zero(),
            mode: WritingMode::Horizontal,
        }
    }

    fn ch(c: char, x: f32, y: f32) -> PageEvent {
        PageEvent::Char {
            ch: c,
            x,
            y,
            size: 12.0,
            font: "Times".to_string(),
            bold: false,
            italic: false,
        }
    }

    #[test]
    fn test_basic_framing() {
        let events = vec![
            begin(),
            ch('h', 10.0, 100.0),
            ch('i', 16.0, 100.0),
            PageEvent::EndLine,
            begin(),
            ch('y', 10.0, 114.0),
            ch('o', 16.0, 114.0),
            PageEvent::EndLine,
        ];
        let lines = build_lines(events);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "hi");
        assert_eq!(lines[1].text, "yo");
    }

    #[test]
    fn test_empty_line_dropped() {
        let events = vec![begin(), PageEvent::EndLine, begin(), ch('a', 0.0, 0.0)];
        // Unterminated trailing line is committed by finish().
        let lines = build_lines(events);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "a");
    }

    #[test]
    fn test_whitespace_only_line_dropped() {
        let events = vec![begin(), ch(' ', 0.0, 0.0), PageEvent::EndLine];
        assert!(build_lines(events).is_empty());
    }
}

//! Structured-text emitter: classified blocks to Markdown.

use regex::Regex;

use crate::classify::{
    ends_with_sentence_punct, is_bullet_char, numbered_marker_len, FUNCTION_WORDS,
};
use crate::math::MathProcessor;
use crate::model::{Block, BlockKind, ClassifiedBlock, Table};
use crate::options::ConvertOptions;

/// Emitter state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    InParagraph,
    InList,
    InCode,
}

/// A paragraph being accumulated across continuation blocks.
struct PendingParagraph {
    text: String,
    bold_chars: usize,
    italic_chars: usize,
    total_chars: usize,
    bottom_y: f32,
    avg_line_height: f32,
}

/// Emits Markdown for one page's classified blocks in reading order.
pub struct MarkdownEmitter<'a> {
    options: &'a ConvertOptions,
    math: MathProcessor,
    state: State,
    out: String,
    paragraph: Option<PendingParagraph>,
    re_label: Regex,
}

impl<'a> MarkdownEmitter<'a> {
    /// Create an emitter for one page.
    pub fn new(options: &'a ConvertOptions) -> Self {
        Self {
            options,
            math: MathProcessor::new(),
            state: State::Idle,
            out: String::new(),
            paragraph: None,
            re_label: Regex::new(r"^[A-Z][A-Za-z]*(\s+[A-Z][A-Za-z]*)*:\s").unwrap(),
        }
    }

    /// Emit one block with the tables detected inside it.
    pub fn emit_block(&mut self, cb: &ClassifiedBlock, tables: &[Table]) {
        match cb.kind {
            BlockKind::Heading(level) => self.emit_heading(&cb.block, level),
            BlockKind::List => self.emit_list(&cb.block),
            BlockKind::Code => self.emit_code(&cb.block),
            BlockKind::PotentialTable if !tables.is_empty() => {
                self.emit_table_block(&cb.block, tables)
            }
            _ => self.emit_prose(&cb.block),
        }
    }

    /// Flush any pending paragraph and return the page Markdown.
    pub fn finish(mut self) -> String {
        self.flush_paragraph();
        let mut out = std::mem::take(&mut self.out);
        if !self.options.preserve_layout {
            out = collapse_blank_runs(&out);
        }
        out.trim_end().to_string()
    }

    fn emit_heading(&mut self, block: &Block, level: u8) {
        self.flush_paragraph();
        self.state = State::Idle;

        let text = block
            .lines
            .iter()
            .map(|l| l.text.trim())
            .collect::<Vec<_>>()
            .join(" ");
        let text = self.process_math(&text);

        self.out.push_str(&"#".repeat(level.clamp(1, 6) as usize));
        self.out.push(' ');
        self.out.push_str(text.trim());
        self.out.push_str("\n\n");
    }

    fn emit_list(&mut self, block: &Block) {
        self.flush_paragraph();

        // A list continuing from the previous block (another column or
        // a page fragment) joins it without a separating blank line.
        if self.state == State::InList && self.out.ends_with("\n\n") {
            self.out.pop();
        }
        self.state = State::InList;

        for line in &block.lines {
            let trimmed = line.text.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(marker_len) = numbered_marker_len(trimmed) {
                let body = trimmed[..marker_len].trim_end().to_string();
                let item = self.process_math(trimmed[marker_len..].trim());
                self.out.push_str(&body);
                self.out.push(' ');
                self.out.push_str(&item);
            } else {
                // Any bullet glyph normalizes to '-'.
                let body = trimmed
                    .trim_start_matches(|c: char| is_bullet_char(c) || c.is_whitespace());
                let item = self.process_math(body);
                self.out.push('-');
                if !item.is_empty() {
                    self.out.push(' ');
                    self.out.push_str(&item);
                }
            }
            self.out.push('\n');
        }
        self.out.push('\n');
    }

    fn emit_code(&mut self, block: &Block) {
        self.flush_paragraph();
        self.state = State::InCode;

        if self.options.code_fences {
            self.out.push_str("```\n");
        }
        for line in &block.lines {
            self.out.push_str(line.text.trim_end());
            self.out.push('\n');
        }
        if self.options.code_fences {
            self.out.push_str("```\n");
        }
        self.out.push('\n');
        self.state = State::Idle;
    }

    fn emit_table_block(&mut self, block: &Block, tables: &[Table]) {
        self.flush_paragraph();
        self.state = State::Idle;

        // Lines not covered by any table still come out as prose.
        let mut idx = 0usize;
        let mut pending: Vec<&str> = Vec::new();
        while idx < block.lines.len() {
            if let Some(table) = tables.iter().find(|t| t.start_line == idx) {
                if !pending.is_empty() {
                    let text = self.process_math(pending.join(" ").trim());
                    self.out.push_str(&text);
                    self.out.push_str("\n\n");
                    pending.clear();
                }
                self.out.push_str(&table.to_markdown());
                self.out.push('\n');
                idx = table.end_line + 1;
            } else {
                let covered = tables.iter().any(|t| t.overlaps(idx, idx));
                if !covered {
                    pending.push(block.lines[idx].text.trim());
                }
                idx += 1;
            }
        }
        if !pending.is_empty() {
            let text = self.process_math(pending.join(" ").trim());
            self.out.push_str(&text);
            self.out.push_str("\n\n");
        }
    }

    fn emit_prose(&mut self, block: &Block) {
        let text = block
            .lines
            .iter()
            .map(|l| l.text.trim())
            .collect::<Vec<_>>()
            .join(" ");
        if text.trim().is_empty() {
            return;
        }

        // A block that reads as an equation becomes display math.
        if self.options.detect_math && self.math.is_display_block(&text) {
            self.flush_paragraph();
            self.state = State::Idle;
            self.out.push_str(&self.math.render_display(&text));
            self.out.push_str("\n\n");
            return;
        }

        match self.paragraph.take() {
            Some(mut pending) if self.should_merge(&pending, block, &text) => {
                pending.text.push(' ');
                pending.text.push_str(text.trim());
                pending.bold_chars +=
                    (block.bold_ratio() * block.char_count() as f32) as usize;
                pending.italic_chars +=
                    (block.italic_ratio() * block.char_count() as f32) as usize;
                pending.total_chars += block.char_count();
                pending.bottom_y = block.bbox.max_y;
                pending.avg_line_height = block.avg_line_height();
                self.paragraph = Some(pending);
            }
            previous => {
                if previous.is_some() {
                    self.paragraph = previous;
                    self.flush_paragraph();
                }
                self.paragraph = Some(PendingParagraph {
                    text: text.trim().to_string(),
                    bold_chars: (block.bold_ratio() * block.char_count() as f32) as usize,
                    italic_chars: (block.italic_ratio() * block.char_count() as f32) as usize,
                    total_chars: block.char_count(),
                    bottom_y: block.bbox.max_y,
                    avg_line_height: block.avg_line_height(),
                });
                self.state = State::InParagraph;
            }
        }
    }

    /// Continuation rules, applied in order.
    fn should_merge(&self, pending: &PendingParagraph, block: &Block, text: &str) -> bool {
        let prev = pending.text.trim_end();
        let curr = text.trim_start();

        // 1. A label like "Figure 3:" always starts fresh.
        if self.re_label.is_match(curr) {
            return false;
        }

        let first = curr.chars().next().unwrap_or(' ');

        // 2. Finished sentence followed by a capital starts fresh.
        if ends_with_sentence_punct(prev) && first.is_uppercase() {
            return false;
        }

        // 3. A complete thought (content word) followed by a capital
        //    starts fresh.
        if ends_with_content_word(prev) && first.is_uppercase() {
            return false;
        }

        // 4. Lowercase or continuing punctuation always merges.
        if first.is_lowercase()
            || matches!(first, ',' | ';' | ':' | '-')
            || matches!(first, '"' | '\'' | ')' | ']' | '\u{201D}' | '\u{2019}')
        {
            return true;
        }

        // 5. Otherwise the vertical gap decides.
        let gap = block.bbox.min_y - pending.bottom_y;
        gap < 1.5 * pending.avg_line_height
    }

    fn flush_paragraph(&mut self) {
        let Some(pending) = self.paragraph.take() else {
            return;
        };
        if pending.text.trim().is_empty() {
            return;
        }

        let mut text = self.process_math(pending.text.trim());

        // Style propagates when it covers a majority of the characters.
        let total = pending.total_chars.max(1);
        let bold = pending.bold_chars * 2 > total;
        let italic = pending.italic_chars * 2 > total;
        text = match (bold, italic) {
            (true, true) => format!("***{}***", text),
            (true, false) => format!("**{}**", text),
            (false, true) => format!("*{}*", text),
            (false, false) => text,
        };

        self.out.push_str(&text);
        self.out.push_str("\n\n");
        self.state = State::Idle;
    }

    fn process_math(&self, text: &str) -> String {
        if self.options.detect_math {
            self.math.process_text(text)
        } else {
            text.to_string()
        }
    }
}

/// Check if a text ends with a content word: the last word is not in the
/// closed-class connective set.
fn ends_with_content_word(text: &str) -> bool {
    let last: String = match text.split_whitespace().last() {
        Some(word) => word
            .chars()
            .filter(|c| c.is_alphabetic())
            .flat_map(|c| c.to_lowercase())
            .collect(),
        None => return false,
    };
    if last.is_empty() {
        return false;
    }
    // A word carrying terminal punctuation is rule 2's business.
    if ends_with_sentence_punct(text) {
        return false;
    }
    !FUNCTION_WORDS.contains(&last.as_str())
}

/// Collapse runs of more than two newlines down to two.
fn collapse_blank_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0usize;
    for c in text.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines <= 2 {
                out.push(c);
            }
        } else {
            newlines = 0;
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{body_font_size, BlockClassifier};
    use crate::config::ScoreWeights;
    use crate::model::{Glyph, Line};

    fn line_with(text: &str, y: f32, size: f32, bold: bool) -> Line {
        let glyphs: Vec<Glyph> = text
            .chars()
            .enumerate()
            .map(|(i, ch)| Glyph {
                ch,
                x: 20.0 + i as f32 * size * 0.5,
                y,
                size,
                font: "Times".to_string(),
                bold,
                italic: false,
            })
            .collect();
        Line::from_glyphs(glyphs).unwrap()
    }

    fn block(texts: &[&str], y0: f32, size: f32) -> Block {
        let lines: Vec<Line> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| line_with(t, y0 + i as f32 * size * 1.2, size, false))
            .collect();
        Block::from_lines(lines)
    }

    fn classify(b: Block, body: f32) -> ClassifiedBlock {
        BlockClassifier::new(body, false, ScoreWeights::default()).classify(b, 0)
    }

    fn prose(b: Block) -> ClassifiedBlock {
        ClassifiedBlock {
            block: b,
            kind: BlockKind::Prose,
            confidence: 0.8,
            column: 0,
        }
    }

    #[test]
    fn test_heading_emission() {
        let options = ConvertOptions::default();
        let mut emitter = MarkdownEmitter::new(&options);
        let cb = classify(block(&["Results"], 100.0, 18.0), 12.0);
        emitter.emit_block(&cb, &[]);
        let out = emitter.finish();
        assert_eq!(out, "# Results");
    }

    #[test]
    fn test_list_emission_normalizes_bullets() {
        let options = ConvertOptions::default();
        let mut emitter = MarkdownEmitter::new(&options);
        let cb = classify(
            block(&["• first point", "• second point", "▸ third point"], 100.0, 12.0),
            12.0,
        );
        assert_eq!(cb.kind, BlockKind::List);
        emitter.emit_block(&cb, &[]);
        let out = emitter.finish();
        assert_eq!(out, "- first point\n- second point\n- third point");
    }

    #[test]
    fn test_numbered_list_keeps_numbers() {
        let options = ConvertOptions::default();
        let mut emitter = MarkdownEmitter::new(&options);
        let cb = classify(block(&["1. alpha", "2. beta"], 100.0, 12.0), 12.0);
        emitter.emit_block(&cb, &[]);
        let out = emitter.finish();
        assert_eq!(out, "1. alpha\n2. beta");
    }

    #[test]
    fn test_paragraph_merging_on_lowercase() {
        let options = ConvertOptions::default();
        let mut emitter = MarkdownEmitter::new(&options);
        let b1 = prose(block(&["The experiment ran for three weeks and"], 100.0, 12.0));
        let b2 = prose(block(&["produced a consistent series of results."], 130.0, 12.0));
        emitter.emit_block(&b1, &[]);
        emitter.emit_block(&b2, &[]);
        let out = emitter.finish();
        assert_eq!(
            out,
            "The experiment ran for three weeks and produced a consistent series of results."
        );
    }

    #[test]
    fn test_paragraph_break_after_sentence() {
        let options = ConvertOptions::default();
        let mut emitter = MarkdownEmitter::new(&options);
        let b1 = prose(block(
            &["The first paragraph ends with a full stop here."],
            100.0,
            12.0,
        ));
        let b2 = prose(block(
            &["Another paragraph starts with a capital letter now."],
            200.0,
            12.0,
        ));
        emitter.emit_block(&b1, &[]);
        emitter.emit_block(&b2, &[]);
        let out = emitter.finish();
        assert!(out.contains("here.\n\nAnother"));
    }

    #[test]
    fn test_label_never_merges() {
        let options = ConvertOptions::default();
        let mut emitter = MarkdownEmitter::new(&options);
        let b1 = prose(block(
            &["Some earlier prose text continues along nicely and"],
            100.0,
            12.0,
        ));
        let b2 = prose(block(&["Figure Three: the setup"], 118.0, 12.0));
        emitter.emit_block(&b1, &[]);
        emitter.emit_block(&b2, &[]);
        let out = emitter.finish();
        assert!(out.contains("and\n\nFigure Three:"), "got {:?}", out);
    }

    #[test]
    fn test_bold_paragraph_propagation() {
        let options = ConvertOptions::default();
        let mut emitter = MarkdownEmitter::new(&options);
        let lines = vec![line_with(
            "All of this text is bold and continues for a while now.",
            100.0,
            12.0,
            true,
        )];
        let b = Block::from_lines(lines);
        let cb = classify(b, 12.0);
        emitter.emit_block(&cb, &[]);
        let out = emitter.finish();
        assert!(out.starts_with("**"), "got {:?}", out);
        assert!(out.ends_with("**"));
    }

    #[test]
    fn test_code_block_fenced() {
        let options = ConvertOptions::default();
        let mut emitter = MarkdownEmitter::new(&options);
        let cb = classify(
            block(&["def run():", "    return 1;"], 100.0, 12.0),
            12.0,
        );
        assert_eq!(cb.kind, BlockKind::Code);
        emitter.emit_block(&cb, &[]);
        let out = emitter.finish();
        assert!(out.starts_with("```\n"));
        assert!(out.ends_with("```"));
    }

    #[test]
    fn test_body_font_size_integration() {
        let lines: Vec<Line> = (0..20)
            .map(|i| line_with("some body text", 100.0 + i as f32 * 14.0, 10.0, false))
            .collect();
        assert_eq!(body_font_size(&lines), 10.0);
    }
}

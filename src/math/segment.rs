//! Segmentation of text into prose and math, and LaTeX emission.

use regex::Regex;

use super::density::{math_density, strong_indicator_count};
use super::symbols::{
    is_relation_operator, is_strong_indicator, subscript_char, superscript_char,
    unicode_to_latex,
};

/// Characters that may bridge mathy tokens inside an inline span.
const CONNECTOR_CHARS: &str = "+-=<>^_(){}";

/// Minimum density an extracted inline span must reach.
const SPAN_MIN_DENSITY: f32 = 0.2;

/// One piece of a partitioned text. Segments concatenated in order
/// reproduce the input exactly.
#[derive(Debug, Clone)]
pub struct MathSegment {
    /// The original text slice
    pub text: String,
    /// Whether the segment is mathematical
    pub is_math: bool,
    /// Whether math renders as a display block
    pub is_display: bool,
    /// Byte offset of the segment start in the input
    pub start: usize,
    /// Byte offset one past the segment end
    pub end: usize,
}

/// The math pipeline: segmentation, LaTeX mapping, delimiter wrapping.
pub struct MathProcessor {
    re_delimited: Regex,
    re_fraction: Regex,
}

impl Default for MathProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl MathProcessor {
    /// Create a processor with its compiled patterns.
    pub fn new() -> Self {
        let envs = "equation|align|gather|multline|eqnarray|displaymath";
        let re_delimited = Regex::new(&format!(
            r"\$\$[^$]+\$\$|\\\[[\s\S]*?\\\]|\\begin\{{(?:{envs})\*?\}}[\s\S]*?\\end\{{(?:{envs})\*?\}}|\$[^$\n]+\$"
        ))
        .unwrap();
        let re_fraction = Regex::new(r"\b(\d+)\s*/\s*(\d+)\b").unwrap();
        Self {
            re_delimited,
            re_fraction,
        }
    }

    /// Partition a text into prose and math segments.
    pub fn segment(&self, text: &str) -> Vec<MathSegment> {
        let mut segments = Vec::new();
        let mut cursor = 0usize;

        for m in self.re_delimited.find_iter(text) {
            if m.start() > cursor {
                self.segment_region(text, cursor, m.start(), &mut segments);
            }
            let slice = m.as_str();
            let is_display = slice.starts_with("$$")
                || slice.starts_with("\\[")
                || slice.starts_with("\\begin");
            segments.push(MathSegment {
                text: slice.to_string(),
                is_math: true,
                is_display,
                start: m.start(),
                end: m.end(),
            });
            cursor = m.end();
        }
        if cursor < text.len() {
            self.segment_region(text, cursor, text.len(), &mut segments);
        }

        segments
    }

    /// Segment one region with no pre-existing delimiters.
    fn segment_region(
        &self,
        text: &str,
        start: usize,
        end: usize,
        segments: &mut Vec<MathSegment>,
    ) {
        let region = &text[start..end];
        let spans = find_inline_spans(region);
        let plain_words = plain_word_count(region);

        // Prose carrying inline math partitions into alternations.
        if plain_words >= 2 && !spans.is_empty() {
            let mut cursor = 0usize;
            for (s, e) in spans {
                if s > cursor {
                    segments.push(prose_segment(region, cursor, s, start));
                }
                segments.push(MathSegment {
                    text: region[s..e].to_string(),
                    is_math: true,
                    is_display: false,
                    start: start + s,
                    end: start + e,
                });
                cursor = e;
            }
            if cursor < region.len() {
                segments.push(prose_segment(region, cursor, region.len(), start));
            }
            return;
        }

        // A whole region dense enough in strong indicators is math.
        let trimmed_len = region.trim().chars().count();
        let len = region.chars().count();
        let strong = strong_indicator_count(region);
        let threshold = 0.12 + (len as f32 / 50.0).min(1.0) * 0.13;
        let strong_enough = if len > 100 { strong >= 3 } else { strong >= 1 };
        let short_inline =
            plain_words < 2 && trimmed_len > 0 && super::density::is_inline_math(region.trim());

        if (strong_enough && math_density(region) > threshold) || short_inline {
            segments.push(MathSegment {
                text: region.to_string(),
                is_math: true,
                is_display: false,
                start,
                end,
            });
            return;
        }

        segments.push(prose_segment(region, 0, region.len(), start));
    }

    /// Replace Unicode math glyphs with LaTeX and normalize.
    ///
    /// Consecutive super- or subscript glyphs group into one `^{…}` /
    /// `_{…}`; commands ending in a letter get a separating space before
    /// a following alphanumeric; whitespace collapses to single spaces;
    /// simple numeric fractions become `\frac{a}{b}`. Soft hyphens are
    /// the only characters dropped without replacement.
    pub fn to_latex(&self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::new();
        let mut i = 0usize;

        while i < chars.len() {
            let c = chars[i];

            if superscript_char(c).is_some() {
                out.push_str("^{");
                while i < chars.len() {
                    match superscript_char(chars[i]) {
                        Some(base) => {
                            out.push(base);
                            i += 1;
                        }
                        None => break,
                    }
                }
                out.push('}');
                continue;
            }

            if subscript_char(c).is_some() {
                out.push_str("_{");
                while i < chars.len() {
                    match subscript_char(chars[i]) {
                        Some(base) => {
                            out.push(base);
                            i += 1;
                        }
                        None => break,
                    }
                }
                out.push('}');
                continue;
            }

            if let Some(cmd) = unicode_to_latex(c) {
                out.push_str(cmd);
                let needs_space = cmd
                    .chars()
                    .last()
                    .is_some_and(|l| l.is_ascii_alphabetic())
                    && chars.get(i + 1).is_some_and(|n| n.is_alphanumeric());
                if needs_space {
                    out.push(' ');
                }
                i += 1;
                continue;
            }

            if c == '\u{00AD}' {
                i += 1;
                continue;
            }

            out.push(c);
            i += 1;
        }

        let collapsed = collapse_whitespace(&out);
        self.re_fraction
            .replace_all(&collapsed, "\\frac{$1}{$2}")
            .to_string()
    }

    /// Process a prose text: inline math spans become `$…$`, everything
    /// else passes through verbatim. Pre-delimited math is left as-is.
    pub fn process_text(&self, text: &str) -> String {
        let mut out = String::new();
        for segment in self.segment(text) {
            if !segment.is_math {
                out.push_str(&segment.text);
            } else if segment.text.starts_with('$')
                || segment.text.starts_with("\\[")
                || segment.text.starts_with("\\begin")
            {
                out.push_str(&segment.text);
            } else {
                // Surrounding whitespace stays outside the delimiters.
                let text = &segment.text;
                let lead = text.len() - text.trim_start().len();
                let trail = text.trim_end().len();
                out.push_str(&text[..lead]);
                out.push('$');
                out.push_str(&self.to_latex(text.trim()));
                out.push('$');
                out.push_str(&text[trail..]);
            }
        }
        out
    }

    /// Decide whether a standalone block is display math.
    pub fn is_display_block(&self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return false;
        }

        if (trimmed.starts_with("$$") && trimmed.ends_with("$$") && trimmed.len() > 4)
            || (trimmed.starts_with("\\[") && trimmed.ends_with("\\]"))
        {
            return true;
        }
        for env in [
            "\\begin{equation", "\\begin{align", "\\begin{gather",
            "\\begin{multline", "\\begin{eqnarray", "\\begin{displaymath",
        ] {
            if trimmed.contains(env) {
                return true;
            }
        }

        let density = math_density(trimmed);
        if trimmed.contains('\n') {
            return density > 0.35;
        }

        let len = trimmed.chars().count();
        let has_relation = trimmed.chars().any(is_relation_operator);
        let has_construct = trimmed.contains('∫')
            || trimmed.contains('∑')
            || trimmed.contains('√')
            || trimmed.contains("\\frac")
            || trimmed.contains("\\int")
            || trimmed.contains("\\sum")
            || trimmed.contains("\\begin{matrix")
            || trimmed.contains("\\begin{pmatrix")
            || self.re_fraction.is_match(trimmed);

        len < 200 && density > 0.4 && (has_relation || has_construct)
    }

    /// Render a block as display math: `$$\n…\n$$`.
    pub fn render_display(&self, text: &str) -> String {
        let trimmed = text.trim();
        let body = trimmed
            .strip_prefix("$$")
            .and_then(|s| s.strip_suffix("$$"))
            .or_else(|| {
                trimmed
                    .strip_prefix("\\[")
                    .and_then(|s| s.strip_suffix("\\]"))
            })
            .unwrap_or(trimmed);
        format!("$$\n{}\n$$", self.to_latex(body.trim()))
    }
}

fn prose_segment(region: &str, from: usize, to: usize, offset: usize) -> MathSegment {
    MathSegment {
        text: region[from..to].to_string(),
        is_math: false,
        is_display: false,
        start: offset + from,
        end: offset + to,
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// A word token with byte offsets.
struct Token<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                tokens.push(Token {
                    text: &text[s..i],
                    start: s,
                    end: i,
                });
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(Token {
            text: &text[s..],
            start: s,
            end: text.len(),
        });
    }
    tokens
}

fn is_mathy(token: &str) -> bool {
    token.chars().any(is_strong_indicator)
}

fn is_connector(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| CONNECTOR_CHARS.contains(c))
}

/// Tokens that anchor a region as prose: at least two characters,
/// starting with a letter, with no strong indicator inside.
fn plain_word_count(text: &str) -> usize {
    tokenize(text)
        .iter()
        .filter(|t| {
            t.text.chars().count() >= 2
                && t.text.chars().next().map(char::is_alphabetic).unwrap_or(false)
                && !is_mathy(t.text)
        })
        .count()
}

/// Extract inline math spans from a prose line.
///
/// A span is a maximal run of mathy tokens (tokens containing a strong
/// indicator) joined through connector tokens. Spans longer than 80
/// characters or six words, or that end a sentence, are discarded, and a
/// span must reach the minimum density.
pub fn find_inline_spans(text: &str) -> Vec<(usize, usize)> {
    let tokens = tokenize(text);
    let mut spans = Vec::new();
    let mut i = 0usize;

    while i < tokens.len() {
        if !is_mathy(tokens[i].text) {
            i += 1;
            continue;
        }

        let start_tok = i;
        let mut end_tok = i;
        let mut j = i + 1;
        loop {
            let mut k = j;
            while k < tokens.len() && is_connector(tokens[k].text) {
                k += 1;
            }
            if k < tokens.len() && is_mathy(tokens[k].text) {
                end_tok = k;
                j = k + 1;
            } else {
                break;
            }
        }

        let start = tokens[start_tok].start;
        let end = tokens[end_tok].end;
        let span_text = &text[start..end];
        let words = end_tok - start_tok + 1;
        let too_long = span_text.chars().count() > 80 || words > 6;
        let sentence_tail = span_text.trim_end().ends_with('.') && words > 2;

        if !too_long && !sentence_tail && math_density(span_text) >= SPAN_MIN_DENSITY {
            spans.push((start, end));
        }

        i = end_tok + 1;
    }

    spans
}

//! Block classifier: list, code, heading, or prose-vs-table scoring.
//!
//! Tests run in a fixed order and the first accepting test wins; the
//! scoring fallback leans toward prose because a false-positive table is
//! the most damaging failure mode on academic layouts.

use regex::Regex;

use crate::config::ScoreWeights;
use crate::model::{Block, BlockKind, ClassifiedBlock};

/// Closed-class English function words. Membership is the prose signal;
/// the same set backs the "ends with a complete thought" continuation
/// test in the emitter.
pub(crate) const FUNCTION_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "have", "has", "had", "do",
    "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall", "can",
    "to", "of", "in", "for", "on", "with", "at", "by", "from", "as", "into", "through",
    "during", "before", "after", "and", "but", "or", "nor", "so", "yet", "both", "either",
    "neither", "not", "only", "also", "just", "than", "then", "now", "here", "there", "this",
    "that", "these", "those", "it", "its", "they", "their", "them", "he", "she", "his", "her",
    "we", "our", "you", "your", "who", "which", "what",
];

/// Bullet glyphs that open list items.
const BULLET_CHARS: &[char] = &[
    '-', '•', '●', '○', '◦', '▪', '▸', '►', '◆', '✓', '✗', '★', '☆',
];

/// Keywords whose presence at line start suggests source code.
const CODE_KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "return", "function", "def", "class", "import", "from",
];

/// Check if a character is a bullet glyph (explicit set plus the Unicode
/// bullet range U+2022..=U+2043).
pub(crate) fn is_bullet_char(c: char) -> bool {
    BULLET_CHARS.contains(&c) || ('\u{2022}'..='\u{2043}').contains(&c)
}

/// Check if a trimmed line opens with a list marker.
pub(crate) fn starts_with_list_marker(line: &str) -> bool {
    let trimmed = line.trim_start();
    if let Some(first) = trimmed.chars().next() {
        if is_bullet_char(first) {
            return true;
        }
    }
    numbered_marker_len(trimmed).is_some()
}

/// Length in bytes of a leading `<digits>[.)]<space>` marker, if present.
pub(crate) fn numbered_marker_len(trimmed: &str) -> Option<usize> {
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 || digits > 3 {
        return None;
    }
    let rest = &trimmed[digits..];
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some('.') | Some(')'), Some(c)) if c.is_whitespace() => {
            Some(digits + 1 + c.len_utf8())
        }
        _ => None,
    }
}

/// Check if a line ends with sentence punctuation, allowing trailing
/// closing quotes or parentheses.
pub(crate) fn ends_with_sentence_punct(line: &str) -> bool {
    let trimmed = line
        .trim_end()
        .trim_end_matches(['"', '\'', '\u{201D}', '\u{2019}', ')', ']']);
    trimmed.ends_with(['.', '!', '?'])
}

/// Fraction of word tokens that are closed-class function words.
pub(crate) fn function_word_ratio(text: &str) -> f32 {
    let mut total = 0usize;
    let mut hits = 0usize;
    for word in text.split_whitespace() {
        let cleaned: String = word
            .chars()
            .filter(|c| c.is_alphabetic())
            .flat_map(|c| c.to_lowercase())
            .collect();
        if cleaned.is_empty() {
            continue;
        }
        total += 1;
        if FUNCTION_WORDS.contains(&cleaned.as_str()) {
            hits += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        hits as f32 / total as f32
    }
}

/// Check if a token is purely numeric: digits with optional sign, one
/// wrapping currency symbol or parenthesis pair, thousands commas, a
/// single decimal point and an optional trailing percent.
pub(crate) fn is_numeric_token(token: &str) -> bool {
    let mut s = token.trim();
    if s.is_empty() {
        return false;
    }

    if s.starts_with('(') && s.ends_with(')') && s.len() > 2 {
        s = &s[1..s.len() - 1];
    }
    let s = s.strip_suffix('%').unwrap_or(s);
    let s = s
        .strip_prefix(['$', '€', '£', '¥'])
        .unwrap_or(s);
    let s = s
        .strip_suffix(['$', '€', '£', '¥'])
        .unwrap_or(s);
    let s = s.strip_prefix(['+', '-']).unwrap_or(s);

    if s.is_empty() {
        return false;
    }

    let mut seen_digit = false;
    let mut seen_point = false;
    for c in s.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            ',' => {}
            '.' if !seen_point => seen_point = true,
            _ => return false,
        }
    }
    seen_digit
}

/// Split a line into cells on runs of two or more spaces.
pub(crate) fn split_cells(line: &str) -> Vec<&str> {
    let mut cells = Vec::new();
    let mut rest = line.trim();
    while !rest.is_empty() {
        match rest.find("  ") {
            Some(pos) => {
                let (cell, tail) = rest.split_at(pos);
                if !cell.trim().is_empty() {
                    cells.push(cell.trim());
                }
                rest = tail.trim_start();
            }
            None => {
                cells.push(rest);
                break;
            }
        }
    }
    cells
}

/// Character-count-weighted modal font size across lines, rounded to 0.5.
///
/// This is the document body size used as the reference for heading-level
/// thresholds.
pub fn body_font_size(lines: &[crate::model::Line]) -> f32 {
    let mut histogram: std::collections::BTreeMap<i32, usize> = std::collections::BTreeMap::new();
    for line in lines {
        let key = (line.avg_size * 2.0).round() as i32;
        *histogram.entry(key).or_insert(0) += line.char_count();
    }
    histogram
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(key, _)| key as f32 / 2.0)
        .unwrap_or(12.0)
}

/// Heading level from the size ratio against the body font.
pub fn heading_level(size: f32, body: f32) -> u8 {
    if body <= 0.0 {
        return 3;
    }
    let ratio = size / body;
    if ratio >= 1.5 {
        1
    } else if ratio >= 1.25 {
        2
    } else {
        3
    }
}

/// The ordered classifier. One instance per page.
pub struct BlockClassifier {
    weights: ScoreWeights,
    body_size: f32,
    multi_column: bool,
    re_assignment: Regex,
    re_call: Regex,
}

impl BlockClassifier {
    /// Create a classifier for a page.
    pub fn new(body_size: f32, multi_column: bool, weights: ScoreWeights) -> Self {
        Self {
            weights,
            body_size,
            multi_column,
            re_assignment: Regex::new(r"^\s*[A-Za-z_][A-Za-z0-9_]*\s*=\s*[^=]").unwrap(),
            re_call: Regex::new(r"[A-Za-z_][A-Za-z0-9_]*\(").unwrap(),
        }
    }

    /// Classify one block. Total: always returns a label.
    pub fn classify(&self, block: Block, column: usize) -> ClassifiedBlock {
        let text = block.text();
        if text.trim().is_empty() {
            return ClassifiedBlock {
                block,
                kind: BlockKind::Unknown,
                confidence: 0.0,
                column,
            };
        }

        if self.is_list(&block) {
            return ClassifiedBlock {
                block,
                kind: BlockKind::List,
                confidence: 0.9,
                column,
            };
        }

        if self.is_code(&block) {
            return ClassifiedBlock {
                block,
                kind: BlockKind::Code,
                confidence: 0.7,
                column,
            };
        }

        if self.is_heading(&block, &text) {
            let level = heading_level(block.avg_size, self.body_size);
            return ClassifiedBlock {
                block,
                kind: BlockKind::Heading(level),
                confidence: 0.8,
                column,
            };
        }

        let prose = self.prose_score(&block, &text);
        let table = self.table_score(&block, &text);
        log::debug!(
            "classifier: prose {:.2}, table {:.2} for block starting {:?}",
            prose,
            table,
            text.lines().next().unwrap_or("")
        );

        // Clear table only; every ambiguous case leans prose.
        if table >= self.weights.table_accept && prose < self.weights.table_accept_prose_max {
            return ClassifiedBlock {
                block,
                kind: BlockKind::PotentialTable,
                confidence: table,
                column,
            };
        }

        let kind = if self.multi_column {
            BlockKind::ProseColumn
        } else {
            BlockKind::Prose
        };
        ClassifiedBlock {
            block,
            kind,
            confidence: prose.max(0.5),
            column,
        }
    }

    fn is_list(&self, block: &Block) -> bool {
        let marked = block
            .lines
            .iter()
            .filter(|l| starts_with_list_marker(&l.text))
            .count();
        marked as f32 / block.lines.len() as f32 >= 0.6
    }

    fn is_code(&self, block: &Block) -> bool {
        let code_like = block
            .lines
            .iter()
            .filter(|l| self.line_looks_like_code(&l.text))
            .count();
        code_like as f32 / block.lines.len() as f32 >= 0.5
    }

    fn line_looks_like_code(&self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return false;
        }

        // Lone bracket line
        if trimmed.len() <= 2 && trimmed.chars().all(|c| "{}()[];".contains(c)) {
            return true;
        }

        // Leading keyword
        let first_word = trimmed
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or("");
        if CODE_KEYWORDS.contains(&first_word) {
            return true;
        }

        if trimmed.ends_with(';') || trimmed.ends_with('{') {
            return true;
        }

        if line.starts_with("    ") {
            return true;
        }

        if self.re_call.is_match(trimmed) && !trimmed.contains(". ") {
            return true;
        }

        self.re_assignment.is_match(trimmed)
    }

    fn is_heading(&self, block: &Block, text: &str) -> bool {
        let trimmed = text.trim();
        if block.line_count() > 3 || trimmed.chars().count() > 200 {
            return false;
        }

        let len = trimmed.chars().count();
        if len > 50 && ends_with_sentence_punct(trimmed) {
            return false;
        }

        let no_sentence_punct = !trimmed.contains(['.', '!', '?']);
        (len < 100 && no_sentence_punct) || block.avg_size > self.body_size + 0.1
    }

    fn prose_score(&self, _block: &Block, text: &str) -> f32 {
        let w = &self.weights;
        let mut score = 0.0;

        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return 0.0;
        }

        let sentences = text
            .split(['.', '!', '?'])
            .filter(|s| !s.trim().is_empty())
            .count()
            .max(1);
        let words_per_sentence = words.len() as f32 / sentences as f32;
        if (5.0..=30.0).contains(&words_per_sentence) {
            score += w.prose_sentence_length;
        }

        let fw_ratio = function_word_ratio(text);
        if fw_ratio >= 0.15 {
            score += w.prose_function_words;
        }
        if fw_ratio > 0.25 {
            score += w.prose_function_words_high;
        }

        let lines: Vec<&str> = text.lines().collect();
        let terminal = lines
            .iter()
            .filter(|l| ends_with_sentence_punct(l))
            .count();
        if terminal as f32 / lines.len() as f32 > 0.3 {
            score += w.prose_terminal_punct;
        }

        let mean_word_len =
            words.iter().map(|s| s.chars().count()).sum::<usize>() as f32 / words.len() as f32;
        if (4.0..=8.0).contains(&mean_word_len) {
            score += w.prose_word_length;
        }

        score.min(1.0)
    }

    fn table_score(&self, _block: &Block, text: &str) -> f32 {
        let w = &self.weights;
        let mut score = 0.0;

        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.is_empty() {
            return 0.0;
        }

        if text.contains('|') {
            score += w.table_pipe;
        }

        // Lines dominated by short, space-free cells.
        let short_cell_lines = lines
            .iter()
            .filter(|line| {
                let cells = split_cells(line);
                if cells.is_empty() {
                    return false;
                }
                let short = cells
                    .iter()
                    .filter(|c| c.chars().count() <= 20 && !c.contains(' '))
                    .count();
                short * 2 >= cells.len()
            })
            .count();
        if short_cell_lines as f32 / lines.len() as f32 >= 0.4 {
            score += w.table_short_cells;
        }

        let numeric_lines = lines
            .iter()
            .filter(|line| line.split_whitespace().any(is_numeric_token))
            .count();
        if numeric_lines as f32 / lines.len() as f32 >= 0.3 {
            score += w.table_numeric;
        }

        // Consistent cell counts across lines, one line forgiven.
        let counts: Vec<usize> = lines.iter().map(|l| split_cells(l).len()).collect();
        if let Some(modal) = modal_count(&counts) {
            if modal.0 >= 2 {
                let needed = ((lines.len().saturating_sub(1)) as f32 * 0.6).ceil() as usize;
                if modal.1 >= needed.max(1) {
                    score += w.table_consistent_cells;
                }
            }
        }

        let mean_len = lines.iter().map(|l| l.chars().count()).sum::<usize>() as f32
            / lines.len() as f32;
        if mean_len > 100.0 {
            score -= w.table_long_line_penalty;
        }

        score.clamp(0.0, 1.0)
    }
}

/// Most common value and its frequency, smallest value winning ties.
fn modal_count(counts: &[usize]) -> Option<(usize, usize)> {
    let mut histogram: std::collections::BTreeMap<usize, usize> = std::collections::BTreeMap::new();
    for &c in counts {
        *histogram.entry(c).or_insert(0) += 1;
    }
    histogram
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(value, freq)| (value, freq))
}

/// Merge adjacent blocks of identical kind within the same column.
pub fn merge_adjacent(blocks: Vec<ClassifiedBlock>) -> Vec<ClassifiedBlock> {
    let mut merged: Vec<ClassifiedBlock> = Vec::new();

    for cb in blocks {
        match merged.last_mut() {
            Some(prev) if prev.kind == cb.kind && prev.column == cb.column => {
                let mut lines = std::mem::take(&mut prev.block.lines);
                lines.extend(cb.block.lines);
                prev.confidence = (prev.confidence + cb.confidence) / 2.0;
                prev.block = Block::from_lines(lines);
            }
            _ => merged.push(cb),
        }
    }

    merged
}

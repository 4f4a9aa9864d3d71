//! Cross-page normalization: header/footer removal, hyphenation repair,
//! line defragmentation, bullet merging and document statistics.

use std::collections::HashSet;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::classify::{is_bullet_char, starts_with_list_marker};
use crate::model::DocumentStats;
use crate::options::ConvertOptions;

/// Header/footer detection requires at least this many pages.
const MIN_PAGES_FOR_PATTERNS: usize = 3;

/// How many lines from the top and bottom of each page are candidates.
const SAMPLE_LINES: usize = 3;

/// Jaccard similarity at which two normalized lines cluster together.
const SIMILARITY_THRESHOLD: f32 = 0.8;

/// A pattern must appear on at least this fraction of pages.
const PAGE_FREQUENCY_THRESHOLD: f32 = 0.5;

/// Lines of at most this length are defragmentation candidates.
const FRAGMENT_MAX_LEN: usize = 45;

/// First and last lines of one page, kept for header/footer detection.
/// This is the only cross-page state retained after a page is emitted.
#[derive(Debug, Clone, Default)]
pub struct PageSample {
    /// 1-indexed page number
    pub page: u32,
    /// First few non-empty lines
    pub first_lines: Vec<String>,
    /// Last few non-empty lines
    pub last_lines: Vec<String>,
}

impl PageSample {
    /// Sample the first and last lines of a page's Markdown.
    pub fn from_markdown(page: u32, markdown: &str) -> Self {
        let lines: Vec<&str> = markdown
            .lines()
            .filter(|l| !l.trim().is_empty())
            .collect();
        Self {
            page,
            first_lines: lines
                .iter()
                .take(SAMPLE_LINES)
                .map(|s| s.to_string())
                .collect(),
            last_lines: lines
                .iter()
                .rev()
                .take(SAMPLE_LINES)
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// A detected repeating header or footer pattern.
#[derive(Debug, Clone)]
pub struct RepeatingPattern {
    /// Normalized representative text
    pub normalized: String,
    /// Word set of the representative
    words: HashSet<String>,
    /// Distinct pages the pattern appeared on
    pub page_count: usize,
}

/// The document-level normalizer.
pub struct Normalizer {
    options: ConvertOptions,
    re_hyphen_lower: Regex,
    re_hyphen_upper: Regex,
    re_endash: Regex,
    re_heading: Regex,
    re_image: Regex,
}

impl Normalizer {
    /// Create a normalizer with compiled patterns.
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            re_hyphen_lower: Regex::new(r"([A-Za-z])-[ \t]*\n[ \t]*([a-z])").unwrap(),
            re_hyphen_upper: Regex::new(r"([A-Za-z])-[ \t]*\n[ \t]*([A-Z])").unwrap(),
            re_endash: Regex::new(r"([A-Za-z])\u{2013}[ \t]*\n[ \t]*([a-z])").unwrap(),
            re_heading: Regex::new(r"(?m)^#+\s+.+$").unwrap(),
            re_image: Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap(),
        }
    }

    /// Detect repeating header/footer patterns across page samples.
    ///
    /// Candidate lines normalize (digit runs to `#`, collapsed
    /// whitespace, lowercase) and cluster by Jaccard similarity on word
    /// sets; a cluster seen on at least half the pages is a pattern.
    pub fn detect_patterns(&self, samples: &[PageSample]) -> Vec<RepeatingPattern> {
        if samples.len() < MIN_PAGES_FOR_PATTERNS {
            return Vec::new();
        }

        let mut clusters: Vec<(RepeatingPattern, HashSet<u32>)> = Vec::new();

        for sample in samples {
            for line in sample.first_lines.iter().chain(sample.last_lines.iter()) {
                let normalized = normalize_pattern_line(line);
                if normalized.is_empty() {
                    continue;
                }
                let words = word_set(&normalized);

                let found = clusters.iter_mut().find(|(pattern, _)| {
                    jaccard(&pattern.words, &words) >= SIMILARITY_THRESHOLD
                });
                match found {
                    Some((_, pages)) => {
                        pages.insert(sample.page);
                    }
                    None => {
                        let mut pages = HashSet::new();
                        pages.insert(sample.page);
                        clusters.push((
                            RepeatingPattern {
                                normalized,
                                words,
                                page_count: 0,
                            },
                            pages,
                        ));
                    }
                }
            }
        }

        let min_pages =
            (samples.len() as f32 * PAGE_FREQUENCY_THRESHOLD).ceil() as usize;
        clusters
            .into_iter()
            .filter_map(|(mut pattern, pages)| {
                pattern.page_count = pages.len();
                if pattern.page_count >= min_pages {
                    log::debug!(
                        "normalizer: header/footer pattern {:?} on {} pages",
                        pattern.normalized,
                        pattern.page_count
                    );
                    Some(pattern)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Run the full normalization pass over the concatenated document.
    pub fn process(&self, text: &str, samples: &[PageSample]) -> String {
        let mut result: String = text.nfc().collect();

        // Soft hyphens never survive.
        result = result.replace('\u{00AD}', "");

        if self.options.remove_headers_footers {
            let patterns = self.detect_patterns(samples);
            if !patterns.is_empty() {
                result = self.remove_patterns(&result, &patterns);
            }
        }

        if self.options.fix_hyphenation {
            result = self.fix_hyphenation(&result);
        }

        // Bullet merging runs before defragmentation so an orphan glyph
        // becomes a list item instead of being glued to its text.
        result = self.merge_lone_bullets(&result);

        if !self.options.preserve_layout {
            result = self.defragment_lines(&result);
        }

        if !self.options.preserve_layout {
            result = limit_blank_runs(&result);
        }

        result.trim().to_string()
    }

    /// Remove every line whose normalized form matches a pattern.
    fn remove_patterns(&self, text: &str, patterns: &[RepeatingPattern]) -> String {
        let kept: Vec<&str> = text
            .lines()
            .filter(|line| {
                let normalized = normalize_pattern_line(line);
                if normalized.is_empty() {
                    return true;
                }
                let words = word_set(&normalized);
                !patterns
                    .iter()
                    .any(|p| jaccard(&p.words, &words) >= SIMILARITY_THRESHOLD)
            })
            .collect();
        kept.join("\n")
    }

    /// Join words hyphenated across line breaks. Lowercase continuations
    /// drop the hyphen; capitalized continuations keep it (compound
    /// names). En-dash breaks join like hyphens. Hyphens inside a line
    /// are untouched.
    fn fix_hyphenation(&self, text: &str) -> String {
        let result = self.re_hyphen_lower.replace_all(text, "$1$2");
        let result = self.re_endash.replace_all(&result, "$1$2");
        self.re_hyphen_upper.replace_all(&result, "$1-$2").to_string()
    }

    /// Merge short orphan lines into their predecessor.
    fn defragment_lines(&self, text: &str) -> String {
        let mut out: Vec<String> = Vec::new();

        for line in text.lines() {
            let trimmed = line.trim();
            let is_candidate = !trimmed.is_empty()
                && trimmed.chars().count() <= FRAGMENT_MAX_LEN
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('|')
                && !starts_with_list_marker(trimmed);

            if is_candidate {
                if let Some(prev) = out.last_mut() {
                    let prev_trimmed = prev.trim_end();
                    let prev_ok = !prev_trimmed.is_empty()
                        && !prev_trimmed.starts_with('#')
                        && !prev_trimmed.starts_with('|');
                    let prev_open = !prev_trimmed.ends_with(['.', '!', '?', ';', ':']);
                    let starts_lower = trimmed
                        .chars()
                        .next()
                        .map(|c| c.is_lowercase())
                        .unwrap_or(false);

                    if prev_ok && (prev_open || starts_lower) {
                        let merged = format!("{} {}", prev_trimmed, trimmed);
                        *prev = merged;
                        continue;
                    }
                }
            }

            out.push(line.to_string());
        }

        out.join("\n")
    }

    /// Merge a line that is a single bullet glyph with the following
    /// line, unless the next line opens its own list item.
    fn merge_lone_bullets(&self, text: &str) -> String {
        let lines: Vec<&str> = text.lines().collect();
        let mut out: Vec<String> = Vec::new();
        let mut i = 0usize;

        while i < lines.len() {
            let trimmed = lines[i].trim();
            let is_lone_bullet =
                trimmed.chars().count() == 1 && trimmed.chars().all(is_bullet_char);

            if is_lone_bullet {
                if let Some(next) = lines.get(i + 1) {
                    let next_trimmed = next.trim();
                    if !next_trimmed.is_empty() && !starts_with_list_marker(next_trimmed) {
                        out.push(format!("- {}", next_trimmed));
                        i += 2;
                        continue;
                    }
                }
            }

            out.push(lines[i].to_string());
            i += 1;
        }

        out.join("\n")
    }

    /// Compute document statistics over the final Markdown.
    pub fn stats(&self, markdown: &str, page_count: usize) -> DocumentStats {
        let heading_count = self.re_heading.find_iter(markdown).count();
        let image_count = self.re_image.find_iter(markdown).count();

        // Tables are runs of two or more consecutive pipe rows.
        let mut table_count = 0usize;
        let mut pipe_run = 0usize;
        for line in markdown.lines().chain(std::iter::once("")) {
            if line.trim_start().starts_with('|') {
                pipe_run += 1;
            } else {
                if pipe_run >= 2 {
                    table_count += 1;
                }
                pipe_run = 0;
            }
        }

        let list_item_count = markdown
            .lines()
            .filter(|l| {
                let t = l.trim_start();
                t.starts_with("- ") || t.starts_with("* ") || {
                    crate::classify::numbered_marker_len(t).is_some()
                }
            })
            .count();

        let word_count = strip_markdown(markdown).split_whitespace().count();

        DocumentStats {
            word_count,
            heading_count,
            table_count,
            list_item_count,
            image_count,
            page_count,
        }
    }
}

/// Normalize a line for pattern matching: digit runs become `#`,
/// whitespace collapses, everything lowercases.
fn normalize_pattern_line(line: &str) -> String {
    let mut out = String::new();
    let mut in_digits = false;
    let mut in_space = false;

    for c in line.trim().chars() {
        if c.is_ascii_digit() {
            if !in_digits {
                out.push('#');
            }
            in_digits = true;
            in_space = false;
        } else if c.is_whitespace() {
            if !in_space && !out.is_empty() {
                out.push(' ');
            }
            in_space = true;
            in_digits = false;
        } else {
            for lower in c.to_lowercase() {
                out.push(lower);
            }
            in_digits = false;
            in_space = false;
        }
    }

    out.trim_end().to_string()
}

fn word_set(normalized: &str) -> HashSet<String> {
    normalized
        .split_whitespace()
        .map(|w| w.to_string())
        .collect()
}

/// Jaccard similarity of two word sets.
fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

/// Collapse runs of more than two newlines down to two.
fn limit_blank_runs(text: &str) -> String {
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

/// Strip Markdown syntax for word counting.
fn strip_markdown(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    for line in markdown.lines() {
        let trimmed = line.trim_start();
        let body = trimmed.trim_start_matches('#').trim_start();
        for c in body.chars() {
            match c {
                '*' | '|' | '`' | '_' | '[' | ']' | '(' | ')' | '!' | '$' => out.push(' '),
                '-' if body.starts_with("- ") => out.push(' '),
                _ => out.push(c),
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new(ConvertOptions::default())
    }

    fn samples_with_header(title: &str, pages: u32) -> Vec<PageSample> {
        (1..=pages)
            .map(|p| PageSample {
                page: p,
                first_lines: vec![title.to_string(), "Body starts here".to_string()],
                last_lines: vec![format!("Page {}", p)],
            })
            .collect()
    }

    #[test]
    fn test_pattern_detection_needs_three_pages() {
        let n = normalizer();
        let samples = samples_with_header("Journal of Tests", 2);
        assert!(n.detect_patterns(&samples).is_empty());
    }

    #[test]
    fn test_header_and_footer_detected() {
        let n = normalizer();
        let samples = samples_with_header("Journal of Tests", 5);
        let patterns = n.detect_patterns(&samples);

        assert!(patterns
            .iter()
            .any(|p| p.normalized == "journal of tests"));
        // "Page 1" .. "Page 5" normalize to "page #" and cluster.
        assert!(patterns.iter().any(|p| p.normalized == "page #"));
    }

    #[test]
    fn test_case_variation_clusters() {
        let n = normalizer();
        let mut samples = samples_with_header("Document Title", 5);
        samples[1].first_lines[0] = "DOCUMENT TITLE".to_string();
        samples[3].first_lines[0] = "document title".to_string();
        let patterns = n.detect_patterns(&samples);
        let title = patterns
            .iter()
            .find(|p| p.normalized == "document title")
            .expect("title pattern");
        assert_eq!(title.page_count, 5);
    }

    #[test]
    fn test_pattern_removal() {
        let n = normalizer();
        let samples = samples_with_header("Document Title", 5);
        let text = "Document Title\n\nReal content stays intact.\n\nPage 3";
        let out = n.process(text, &samples);
        assert!(!out.contains("Document Title"));
        assert!(!out.contains("Page 3"));
        assert!(out.contains("Real content stays intact."));
    }

    #[test]
    fn test_removal_is_idempotent() {
        let n = normalizer();
        let samples = samples_with_header("Running Header", 4);
        let text = "Running Header\n\nParagraph one stays.\n\nPage 2";
        let once = n.process(text, &samples);
        let twice = n.process(&once, &samples);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_hyphenation_repair() {
        let n = normalizer();
        let out = n.process("The infor-\nmation was complete.", &[]);
        assert!(out.contains("information"));
        assert!(!out.contains("infor-"));
    }

    #[test]
    fn test_hyphenation_keeps_inline_hyphens() {
        let n = normalizer();
        let out = n.process("A well-known example stays hyphenated.", &[]);
        assert!(out.contains("well-known"));
    }

    #[test]
    fn test_hyphenation_capitalized_keeps_hyphen() {
        let n = normalizer();
        let out = n.process("The Miller-\nSmith proposal was accepted.", &[]);
        assert!(out.contains("Miller-Smith"));
    }

    #[test]
    fn test_no_hyphen_newline_pairs_remain() {
        let n = normalizer();
        let inputs = [
            "exam-\nple",
            "self-\nevident case-\nstudy",
            "Top-\nDown and bottom-\nup",
        ];
        for input in inputs {
            let out = n.process(input, &[]);
            let re = Regex::new(r"[A-Za-z]-\n[A-Za-z]").unwrap();
            assert!(!re.is_match(&out), "{:?} -> {:?}", input, out);
        }
    }

    #[test]
    fn test_defragmentation() {
        let n = normalizer();
        let out = n.process("This sentence was broken across\nan orphan line here.", &[]);
        assert!(out.contains("broken across an orphan line here."));
    }

    #[test]
    fn test_defragmentation_respects_sentence_end() {
        let n = normalizer();
        let text = "The first sentence ends here.\nNew thought begins";
        let out = n.process(text, &[]);
        // Previous ends with '.' and the fragment starts uppercase, so it
        // stays on its own line.
        assert!(out.contains("here.\nNew thought begins"));
    }

    #[test]
    fn test_lone_bullet_merge() {
        let n = normalizer();
        let out = n.process("•\nThe orphaned item text", &[]);
        assert!(out.contains("- The orphaned item text"), "got {:?}", out);
    }

    #[test]
    fn test_consecutive_lone_bullets_each_merge() {
        let n = normalizer();
        let out = n.process("•\nfirst item\n•\nsecond item", &[]);
        assert!(out.contains("- first item"));
        assert!(out.contains("- second item"));
    }

    #[test]
    fn test_stats() {
        let n = normalizer();
        let md = "# Title\n\nSome body text here.\n\n- item one\n- item two\n\n| a | b |\n| --- | --- |\n| 1 | 2 |\n\n![fig](img.png)";
        let stats = n.stats(md, 2);
        assert_eq!(stats.heading_count, 1);
        assert_eq!(stats.table_count, 1);
        assert_eq!(stats.list_item_count, 2);
        assert_eq!(stats.image_count, 1);
        assert_eq!(stats.page_count, 2);
        assert!(stats.word_count >= 8);
    }

    #[test]
    fn test_jaccard() {
        let a: HashSet<String> = ["page", "#"].iter().map(|s| s.to_string()).collect();
        let b: HashSet<String> = ["page", "#"].iter().map(|s| s.to_string()).collect();
        assert!((jaccard(&a, &b) - 1.0).abs() < f32::EPSILON);

        let c: HashSet<String> = ["other", "words"].iter().map(|s| s.to_string()).collect();
        assert!(jaccard(&a, &c) < 0.01);
    }

    #[test]
    fn test_normalize_pattern_line() {
        assert_eq!(normalize_pattern_line("Page 12"), "page #");
        assert_eq!(normalize_pattern_line("  Mixed   CASE  7x"), "mixed case #x");
        assert_eq!(normalize_pattern_line(""), "");
    }
}

//! Cross-page normalization properties through the public API.

use glyphmark::normalize::{Normalizer, PageSample};
use glyphmark::ConvertOptions;

fn normalizer() -> Normalizer {
    Normalizer::new(ConvertOptions::default())
}

fn samples(header: &str, pages: u32) -> Vec<PageSample> {
    (1..=pages)
        .map(|p| PageSample {
            page: p,
            first_lines: vec![header.to_string()],
            last_lines: vec![format!("{} / {}", p, pages)],
        })
        .collect()
}

// Property: applying header/footer removal twice yields the same text.
#[test]
fn test_header_footer_idempotence() {
    let n = normalizer();
    let s = samples("Conference Proceedings 2024", 6);
    let text = "Conference Proceedings 2024\n\nThe actual abstract text survives.\n\n3 / 6\n\nMore content on a later page stays too.";

    let once = n.process(text, &s);
    let twice = n.process(&once, &s);
    assert_eq!(once, twice);
    assert!(once.contains("abstract text survives"));
    assert!(!once.contains("Conference Proceedings"));
}

// Property: no letter-hyphen-newline-letter pair survives repair, while
// in-line hyphens are untouched.
#[test]
fn test_hyphenation_repair_invariant() {
    let n = normalizer();
    let text = "A state-of-the-art preproc-\nessing stage feeds the well-\nknown pipeline.";
    let out = n.process(text, &[]);

    assert!(out.contains("preprocessing"));
    assert!(out.contains("wellknown") || out.contains("well-known"));
    assert!(out.contains("state-of-the-art"));

    let re = regex::Regex::new(r"[A-Za-z]-\n[A-Za-z]").unwrap();
    assert!(!re.is_match(&out), "got {:?}", out);
}

// Property: a standalone bullet merges with its successor; consecutive
// standalone bullets each merge with theirs.
#[test]
fn test_bullet_merge_property() {
    let n = normalizer();

    let out = n.process("•\ncollect the readings", &[]);
    assert!(out.contains("- collect the readings"));

    let out = n.process("•\nfirst entry\n•\nsecond entry", &[]);
    assert!(out.contains("- first entry"));
    assert!(out.contains("- second entry"));
}

// Soft hyphens disappear everywhere.
#[test]
fn test_soft_hyphen_stripped() {
    let n = normalizer();
    let out = n.process("in\u{00AD}formation and know\u{00AD}ledge", &[]);
    assert!(out.contains("information"));
    assert!(out.contains("knowledge"));
}

// Statistics count the structures of the final Markdown.
#[test]
fn test_stats_on_normalized_output() {
    let n = normalizer();
    let markdown = "# Heading One\n\n## Heading Two\n\nBody words in a paragraph here.\n\n- alpha\n- beta\n\n| h1 | h2 |\n| --- | --- |\n| a | b |";
    let stats = n.stats(markdown, 3);

    assert_eq!(stats.heading_count, 2);
    assert_eq!(stats.list_item_count, 2);
    assert_eq!(stats.table_count, 1);
    assert_eq!(stats.image_count, 0);
    assert_eq!(stats.page_count, 3);
}

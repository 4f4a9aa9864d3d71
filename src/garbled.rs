//! Garbled math font heuristic.
//!
//! When a PDF's embedded math font cannot be decoded to Unicode, the
//! shaper emits replacement characters, Private-Use-Area glyphs and
//! broken operator fragments. This module only reports an advisory; the
//! engine never calls a vision collaborator itself.

use crate::model::VisionAdvisory;

/// Replacement characters at or above this count trigger the advisory.
const REPLACEMENT_THRESHOLD: usize = 3;

/// Private-Use-Area characters at or above this count trigger it.
const PUA_THRESHOLD: usize = 2;

/// Pattern matches at or above this count trigger it.
const PATTERN_THRESHOLD: usize = 3;

/// Assess one page's emitted text for garbled math font damage.
pub fn assess_page(text: &str) -> VisionAdvisory {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len().max(1);

    let replacement = chars.iter().filter(|c| **c == '\u{FFFD}').count();
    let pua = chars.iter().filter(|c| is_pua(**c)).count();
    let pattern_hits = count_garbled_patterns(&chars);

    let garbled_percentage = (replacement + pua) as f32 / total as f32 * 100.0;

    let reason = if replacement >= REPLACEMENT_THRESHOLD {
        Some(format!("{} replacement characters", replacement))
    } else if pua >= PUA_THRESHOLD {
        Some(format!("{} private-use-area characters", pua))
    } else if pattern_hits >= PATTERN_THRESHOLD {
        Some(format!("{} garbled math fragments", pattern_hits))
    } else {
        None
    };

    match reason {
        Some(reason) => VisionAdvisory {
            recommend: true,
            reason,
            garbled_percentage,
        },
        None => VisionAdvisory {
            recommend: false,
            reason: String::new(),
            garbled_percentage,
        },
    }
}

/// Private Use Area (BMP plane).
fn is_pua(c: char) -> bool {
    ('\u{E000}'..='\u{F8FF}').contains(&c)
}

/// Unicode Mathematical Operators block.
fn is_math_operator_block(c: char) -> bool {
    ('\u{2200}'..='\u{22FF}').contains(&c)
}

/// Count matches of the garbled-fragment pattern set:
/// letter-replacement-letter, doubled replacements, runs of three or
/// more raw operator-block characters, and the planck-constant subscript
/// wreckage (`ℎ` chased by `>`/`@`/replacement) typical of broken
/// symbol fonts.
fn count_garbled_patterns(chars: &[char]) -> usize {
    let mut hits = 0usize;

    for w in chars.windows(3) {
        if w[0].is_alphabetic() && w[1] == '\u{FFFD}' && w[2].is_alphabetic() {
            hits += 1;
        }
    }

    for w in chars.windows(2) {
        if w[0] == '\u{FFFD}' && w[1] == '\u{FFFD}' {
            hits += 1;
        }
    }

    let mut run = 0usize;
    for c in chars {
        if is_math_operator_block(*c) {
            run += 1;
            if run == 3 {
                hits += 1;
            }
        } else {
            run = 0;
        }
    }

    for (i, c) in chars.iter().enumerate() {
        if *c == '\u{210E}' {
            let tail = &chars[i + 1..chars.len().min(i + 4)];
            if tail
                .iter()
                .any(|t| *t == '>' || *t == '@' || *t == '\u{FFFD}')
            {
                hits += 1;
            }
        }
    }

    // Parenthesized garbage followed by an operator: K(…�…)+ shapes.
    let mut depth = 0usize;
    let mut garbled_inside = false;
    for (i, c) in chars.iter().enumerate() {
        match c {
            '(' => {
                depth += 1;
                garbled_inside = false;
            }
            ')' if depth > 0 => {
                depth -= 1;
                let followed_by_op = chars
                    .get(i + 1)
                    .map(|n| matches!(n, '+' | '-' | '=' | '*'))
                    .unwrap_or(false);
                if garbled_inside && followed_by_op {
                    hits += 1;
                }
            }
            _ if depth > 0 && (*c == '\u{FFFD}' || is_pua(*c)) => {
                garbled_inside = true;
            }
            _ => {}
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_not_flagged() {
        let advisory = assess_page("A perfectly ordinary page of text with x = y + 1.");
        assert!(!advisory.recommend);
        assert_eq!(advisory.garbled_percentage, 0.0);
    }

    #[test]
    fn test_replacement_characters_flagged() {
        let advisory = assess_page("K(\u{FFFD}\u{FFFD}LC>@\u{FFFD}+ \u{FFFD}\u{FFFD}Mℎ>@\u{FFFD})");
        assert!(advisory.recommend);
        assert!(advisory.garbled_percentage > 0.0);
    }

    #[test]
    fn test_pua_characters_flagged() {
        let advisory = assess_page("text \u{E001} more \u{E002} text");
        assert!(advisory.recommend);
        assert!(advisory.reason.contains("private-use-area"));
    }

    #[test]
    fn test_operator_run_counts_once() {
        // One run of four operator chars is a single pattern hit, so it
        // stays below the pattern threshold by itself.
        let advisory = assess_page("∀∃∈∋ is one fragment");
        assert!(!advisory.recommend);
    }

    #[test]
    fn test_legitimate_math_not_flagged() {
        let advisory = assess_page("We know α ≤ β and ∑ x converges.");
        assert!(!advisory.recommend);
    }

    #[test]
    fn test_percentage_computation() {
        let advisory = assess_page("ab\u{FFFD}\u{FFFD}\u{FFFD}c");
        assert!(advisory.recommend);
        assert!((advisory.garbled_percentage - 50.0).abs() < 0.01);
    }
}

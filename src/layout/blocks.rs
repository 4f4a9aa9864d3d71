//! Block grouper: lines separated by small vertical gaps form blocks.

use crate::model::{Block, Line};

/// Break a block when the baseline gap exceeds this multiple of the mean
/// font size of the adjacent lines.
const GAP_FACTOR: f32 = 2.5;

/// Group a column's lines into blocks.
///
/// Lines are sorted by y; a new block starts whenever the gap to the
/// previous line exceeds `2.5 × mean(prev.avg_size, curr.avg_size)`.
pub fn group_blocks(mut lines: Vec<Line>) -> Vec<Block> {
    if lines.is_empty() {
        return Vec::new();
    }

    lines.sort_by(|a, b| {
        a.y.partial_cmp(&b.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                a.min_x
                    .partial_cmp(&b.min_x)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });

    let mut blocks = Vec::new();
    let mut current: Vec<Line> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            let gap = line.y - prev.y;
            let threshold = GAP_FACTOR * (prev.avg_size + line.avg_size) / 2.0;
            if gap > threshold {
                blocks.push(Block::from_lines(std::mem::take(&mut current)));
            }
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(Block::from_lines(current));
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Glyph;

    fn line(text: &str, y: f32) -> Line {
        let glyphs: Vec<Glyph> = text
            .chars()
            .enumerate()
            .map(|(i, ch)| Glyph {
                ch,
                x: 20.0 + i as f32 * 6.0,
                y,
                size: 12.0,
                font: "Times".to_string(),
                bold: false,
                italic: false,
            })
            .collect();
        Line::from_glyphs(glyphs).unwrap()
    }

    #[test]
    fn test_close_lines_share_a_block() {
        let blocks = group_blocks(vec![
            line("one", 100.0),
            line("two", 114.0),
            line("three", 128.0),
        ]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].line_count(), 3);
    }

    #[test]
    fn test_large_gap_splits() {
        // 2.5 * 12 = 30; a 50pt gap breaks the block.
        let blocks = group_blocks(vec![
            line("one", 100.0),
            line("two", 114.0),
            line("far", 164.0),
        ]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].line_count(), 2);
        assert_eq!(blocks[1].line_count(), 1);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let blocks = group_blocks(vec![line("second", 114.0), line("first", 100.0)]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text(), "first\nsecond");
    }
}

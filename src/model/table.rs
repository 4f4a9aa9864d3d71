//! The table output type shared by all detection strategies.

use serde::{Deserialize, Serialize};

/// Horizontal alignment of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left-aligned
    Left,
    /// Centered
    Center,
    /// Right-aligned (numeric columns)
    Right,
}

/// Which strategy produced a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionKind {
    /// Pipe-bordered rows
    Bordered,
    /// Whitespace-aligned ASCII rows
    Whitespace,
    /// Column-clustered positioned rows
    Positioned,
}

/// A detected table, ready for Markdown emission.
#[derive(Debug, Clone)]
pub struct Table {
    /// Cell text, row-major; every row has the same length
    pub rows: Vec<Vec<String>>,
    /// Whether the first row is a header
    pub has_header: bool,
    /// Per-column alignment
    pub alignments: Vec<Alignment>,
    /// Acceptance confidence in [0, 1]
    pub confidence: f32,
    /// The strategy that produced this table
    pub detection: DetectionKind,
    /// First source line (block-relative) covered by the table
    pub start_line: usize,
    /// Last source line (block-relative) covered by the table
    pub end_line: usize,
}

impl Table {
    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.len()).unwrap_or(0)
    }

    /// Whether the table's source range overlaps another range.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start_line <= end && start <= self.end_line
    }

    /// Render as a GitHub-flavored Markdown table.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        for (i, row) in self.rows.iter().enumerate() {
            out.push('|');
            for cell in row {
                out.push(' ');
                out.push_str(&cell.replace('\n', " ").replace('|', "\\|"));
                out.push_str(" |");
            }
            out.push('\n');

            if i == 0 {
                out.push('|');
                for col in 0..self.column_count() {
                    let marker = match self.alignments.get(col) {
                        Some(Alignment::Right) => " ---: |",
                        Some(Alignment::Center) => " :---: |",
                        _ => " --- |",
                    };
                    out.push_str(marker);
                }
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table {
            rows: vec![
                vec!["Name".to_string(), "Age".to_string()],
                vec!["Alice".to_string(), "30".to_string()],
            ],
            has_header: true,
            alignments: vec![Alignment::Left, Alignment::Right],
            confidence: 0.8,
            detection: DetectionKind::Bordered,
            start_line: 0,
            end_line: 1,
        }
    }

    #[test]
    fn test_markdown_render() {
        let md = table().to_markdown();
        assert!(md.contains("| Name | Age |"));
        assert!(md.contains("| --- | ---: |"));
        assert!(md.contains("| Alice | 30 |"));
    }

    #[test]
    fn test_overlaps() {
        let t = table();
        assert!(t.overlaps(1, 5));
        assert!(t.overlaps(0, 0));
        assert!(!t.overlaps(2, 5));
    }
}

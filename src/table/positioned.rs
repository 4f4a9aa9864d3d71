//! Column-clustered positioned-row strategy.
//!
//! Used when per-character x positions are available: cell start
//! coordinates are clustered across rows and each cluster becomes a
//! column. This catches tables whose cells are separated by position
//! rather than by characters.

use crate::config::ScoreWeights;
use crate::model::{Block, DetectionKind, Line, Table};

use super::grid::{column_alignments, Grid, GridProfile};
use super::TableStrategy;

/// Distance from the drifting cluster centroid within which a cell start
/// joins the cluster.
const CLUSTER_TOLERANCE: f32 = 15.0;

/// Cells on a line split where the x gap exceeds this multiple of the
/// font size.
const CELL_GAP_FACTOR: f32 = 0.75;

/// Detects tables from positioned cell starts.
pub struct PositionedStrategy;

impl TableStrategy for PositionedStrategy {
    fn name(&self) -> &'static str {
        "positioned"
    }

    fn detect(&self, block: &Block, weights: &ScoreWeights) -> Vec<Table> {
        let mut rows: Vec<(usize, Vec<(f32, String)>)> = Vec::new();
        for (idx, line) in block.lines.iter().enumerate() {
            let cells = line_cells(line);
            if cells.len() >= 2 {
                rows.push((idx, cells));
            }
        }

        if rows.len() < 2 {
            return Vec::new();
        }

        let columns = cluster_cell_starts(&rows);
        if columns.len() < 2 {
            return Vec::new();
        }

        let start_line = rows.first().map(|(i, _)| *i).unwrap_or(0);
        let end_line = rows.last().map(|(i, _)| *i).unwrap_or(0);

        let mut cells: Vec<Vec<String>> = Vec::new();
        let mut raw_lengths: Vec<usize> = Vec::new();
        for (_, row) in &rows {
            raw_lengths.push(row.len());
            let mut assigned: Vec<String> = vec![String::new(); columns.len()];
            for (x, text) in row {
                let col = nearest_column(&columns, *x);
                if !assigned[col].is_empty() {
                    assigned[col].push(' ');
                }
                assigned[col].push_str(text);
            }
            cells.push(assigned);
        }

        let grid = Grid::from_aligned(cells, raw_lengths);
        let profile = GridProfile::measure(&grid, 0.0, weights);

        if !profile.accepts(weights) {
            log::debug!(
                "positioned strategy: rejected grid {}x{} with score {:.2}",
                profile.n_rows,
                profile.n_cols,
                profile.score
            );
            return Vec::new();
        }

        // Post-gate veto: positioned grids of long cells are almost
        // always rejoined prose.
        if profile.avg_len > 50.0 {
            log::debug!(
                "positioned strategy: veto, avg cell length {:.1}",
                profile.avg_len
            );
            return Vec::new();
        }

        let has_header = grid.n_rows() > 1;
        let alignments = column_alignments(&grid, has_header, 0.5);
        vec![Table {
            rows: grid.cells,
            has_header,
            alignments,
            confidence: profile.confidence(),
            detection: DetectionKind::Positioned,
            start_line,
            end_line,
        }]
    }
}

/// Split a line into positioned cells: a new cell starts after a run of
/// two or more space glyphs or an x jump larger than the gap threshold.
fn line_cells(line: &Line) -> Vec<(f32, String)> {
    let mut cells: Vec<(f32, String)> = Vec::new();
    let mut text = String::new();
    let mut start_x = 0.0f32;
    let mut prev_end: Option<f32> = None;
    let mut space_run = 0usize;

    for g in &line.glyphs {
        if g.ch.is_whitespace() {
            space_run += 1;
            prev_end = Some(g.x + g.advance());
            continue;
        }

        let gap_break = prev_end
            .map(|end| g.x - end > g.size * CELL_GAP_FACTOR)
            .unwrap_or(false);
        if (space_run >= 2 || gap_break) && !text.is_empty() {
            cells.push((start_x, std::mem::take(&mut text)));
        } else if space_run > 0 && !text.is_empty() {
            text.push(' ');
        }

        if text.is_empty() {
            start_x = g.x;
        }
        text.push(g.ch);
        prev_end = Some(g.x + g.advance());
        space_run = 0;
    }

    if !text.is_empty() {
        cells.push((start_x, text));
    }
    cells
}

/// Cluster cell start positions across rows. Clusters drift: the centroid
/// is the running mean of its members, and a start joins the nearest
/// cluster within the fixed tolerance.
fn cluster_cell_starts(rows: &[(usize, Vec<(f32, String)>)]) -> Vec<f32> {
    let mut starts: Vec<f32> = rows
        .iter()
        .flat_map(|(_, cells)| cells.iter().map(|(x, _)| *x))
        .collect();
    starts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut clusters: Vec<(f32, usize)> = Vec::new(); // (centroid, count)
    for x in starts {
        match clusters.last_mut() {
            Some((centroid, count)) if x - *centroid <= CLUSTER_TOLERANCE => {
                *count += 1;
                *centroid += (x - *centroid) / *count as f32;
            }
            _ => clusters.push((x, 1)),
        }
    }

    clusters.into_iter().map(|(centroid, _)| centroid).collect()
}

fn nearest_column(columns: &[f32], x: f32) -> usize {
    let mut best = 0usize;
    let mut best_dist = f32::MAX;
    for (i, col) in columns.iter().enumerate() {
        let dist = (x - col).abs();
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Glyph;

    /// Build a line from (text, x) cell specs on one baseline.
    fn positioned_line(cells: &[(&str, f32)], y: f32) -> Line {
        let mut glyphs = Vec::new();
        for (text, x0) in cells {
            for (i, ch) in text.chars().enumerate() {
                glyphs.push(Glyph {
                    ch,
                    x: x0 + i as f32 * 6.0,
                    y,
                    size: 12.0,
                    font: "Times".to_string(),
                    bold: false,
                    italic: false,
                });
            }
        }
        Line::from_glyphs(glyphs).unwrap()
    }

    #[test]
    fn test_line_cells_split_on_gap() {
        let line = positioned_line(&[("Name", 20.0), ("Age", 150.0)], 100.0);
        let cells = line_cells(&line);
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].1, "Name");
        assert_eq!(cells[1].1, "Age");
        assert!((cells[1].0 - 150.0).abs() < 0.01);
    }

    #[test]
    fn test_line_cells_keep_single_spaced_words() {
        let mut glyphs = Vec::new();
        for (i, ch) in "two words".chars().enumerate() {
            glyphs.push(Glyph {
                ch,
                x: 20.0 + i as f32 * 6.0,
                y: 100.0,
                size: 12.0,
                font: "Times".to_string(),
                bold: false,
                italic: false,
            });
        }
        let line = Line::from_glyphs(glyphs).unwrap();
        let cells = line_cells(&line);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].1, "two words");
    }

    #[test]
    fn test_positioned_table() {
        let lines = vec![
            positioned_line(&[("Metric", 20.0), ("Value", 150.0), ("Unit", 280.0)], 100.0),
            positioned_line(&[("Latency", 20.0), ("42", 150.0), ("ms", 280.0)], 114.0),
            positioned_line(&[("Throughput", 20.0), ("980", 150.0), ("rps", 280.0)], 128.0),
            positioned_line(&[("Errors", 20.0), ("3", 150.0), ("count", 280.0)], 142.0),
        ];
        let block = Block::from_lines(lines);
        let tables = PositionedStrategy.detect(&block, &ScoreWeights::default());
        assert_eq!(tables.len(), 1);

        let t = &tables[0];
        assert_eq!(t.column_count(), 3);
        assert_eq!(t.row_count(), 4);
        assert_eq!(t.detection, DetectionKind::Positioned);
        assert_eq!(t.rows[1], vec!["Latency", "42", "ms"]);
    }

    #[test]
    fn test_prose_lines_not_a_table() {
        let lines = vec![
            positioned_line(&[("The method was applied to the corpus", 20.0)], 100.0),
            positioned_line(&[("and the results were compared against", 20.0)], 114.0),
        ];
        let block = Block::from_lines(lines);
        let tables = PositionedStrategy.detect(&block, &ScoreWeights::default());
        assert!(tables.is_empty());
    }
}

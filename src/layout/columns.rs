//! Column detector: x-axis density histogram with gap-run analysis.

use crate::error::{Error, Result};
use crate::model::{ColumnRegion, Line, PageLayout};

/// Number of histogram bins across the page width.
const BINS: usize = 50;

/// A bin is a gap when its count falls below this fraction of the mean.
const GAP_DENSITY_RATIO: f32 = 0.2;

/// A gap run must be wider than this fraction of the page width to become
/// a column boundary.
const MIN_GAP_WIDTH_RATIO: f32 = 0.03;

/// A column must be at least this fraction of the page width.
const MIN_COLUMN_WIDTH_RATIO: f32 = 0.20;

/// Partition a page's lines into columns.
///
/// Builds a 50-bin histogram of line x-coverage, finds low-density gap
/// runs wide enough to be gutters, splits the page at the run midpoints
/// and keeps the parts that are wide enough and actually occupied. Falls
/// back to a single full-width column when nothing survives.
///
/// Fails with [`Error::DegenerateLayout`] only when `lines` is empty.
pub fn analyze_columns(lines: Vec<Line>, page_width: f32, page_height: f32) -> Result<PageLayout> {
    if lines.is_empty() {
        return Err(Error::DegenerateLayout);
    }

    let width = if page_width > 0.0 {
        page_width
    } else {
        lines.iter().map(|l| l.max_x).fold(0.0f32, f32::max)
    };
    let bin_width = width / BINS as f32;

    let mut histogram = [0usize; BINS];
    for line in &lines {
        let first = ((line.min_x / bin_width) as usize).min(BINS - 1);
        let last = ((line.max_x / bin_width) as usize).min(BINS - 1);
        for bin in histogram.iter_mut().take(last + 1).skip(first) {
            *bin += 1;
        }
    }

    let avg_density = histogram.iter().sum::<usize>() as f32 / BINS as f32;
    let gap_threshold = avg_density * GAP_DENSITY_RATIO;

    // Collect gap runs and keep those wide enough to be gutters; the run
    // midpoint becomes a boundary.
    let mut boundaries: Vec<f32> = Vec::new();
    let mut run_start: Option<usize> = None;
    for i in 0..=BINS {
        let is_gap = i < BINS && (histogram[i] as f32) < gap_threshold;
        if is_gap {
            run_start.get_or_insert(i);
        } else if let Some(start) = run_start.take() {
            let run_width = (i - start) as f32 * bin_width;
            if run_width > width * MIN_GAP_WIDTH_RATIO {
                let mid = (start as f32 + (i - start) as f32 / 2.0) * bin_width;
                boundaries.push(mid);
            }
        }
    }

    log::debug!(
        "column detector: avg density {:.2}, {} boundaries at {:?}",
        avg_density,
        boundaries.len(),
        boundaries
    );

    // Split [0, width] at the boundaries into candidate columns.
    let mut cuts = vec![0.0f32];
    cuts.extend(&boundaries);
    cuts.push(width);

    let mut candidates: Vec<(f32, f32)> = cuts
        .windows(2)
        .map(|w| (w[0], w[1] - w[0]))
        .filter(|(_, w)| *w > 0.0)
        .collect();

    // Keep candidates that are wide enough and contain a line center.
    candidates.retain(|(x, w)| {
        *w >= width * MIN_COLUMN_WIDTH_RATIO
            && lines
                .iter()
                .any(|l| l.x_center() >= *x && l.x_center() < *x + *w)
    });

    if candidates.is_empty() {
        log::debug!("column detector: no columns survived, using full width");
        candidates.push((0.0, width));
    }

    let mut columns: Vec<ColumnRegion> = candidates
        .into_iter()
        .map(|(x, w)| ColumnRegion {
            x,
            width: w,
            lines: Vec::new(),
        })
        .collect();

    // Assign each line to the containing column, or the nearest one when
    // its candidate column was dropped.
    for line in lines {
        let center = line.x_center();
        let idx = columns
            .iter()
            .position(|c| c.contains_x(center))
            .unwrap_or_else(|| nearest_column(&columns, center));
        columns[idx].lines.push(line);
    }

    columns.retain(|c| !c.lines.is_empty());
    let is_multi_column = columns.len() > 1;

    log::debug!(
        "column detector: {} columns, multi-column = {}",
        columns.len(),
        is_multi_column
    );

    Ok(PageLayout {
        columns,
        is_multi_column,
        page_width: width,
        page_height,
    })
}

fn nearest_column(columns: &[ColumnRegion], x: f32) -> usize {
    let mut best = 0;
    let mut best_dist = f32::MAX;
    for (i, col) in columns.iter().enumerate() {
        let center = col.x + col.width / 2.0;
        let dist = (x - center).abs();
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

    fn line_at(x0: f32, x1: f32, y: f32) -> Line {
        let n = ((x1 - x0) / 6.0).max(1.0) as usize;
        let glyphs: Vec<Glyph> = (0..n)
            .map(|i| Glyph {
                ch: if i % 6 == 5 { ' ' } else { 'x' },
                x: x0 + i as f32 * 6.0,
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
    fn test_empty_page_is_degenerate() {
        let result = analyze_columns(vec![], 612.0, 792.0);
        assert!(matches!(result, Err(Error::DegenerateLayout)));
    }

    #[test]
    fn test_single_column() {
        let lines: Vec<Line> = (0..10).map(|i| line_at(50.0, 550.0, 100.0 + i as f32 * 14.0)).collect();
        let layout = analyze_columns(lines, 612.0, 792.0).unwrap();
        assert_eq!(layout.columns.len(), 1);
        assert!(!layout.is_multi_column);
        assert_eq!(layout.line_count(), 10);
    }

    #[test]
    fn test_two_columns() {
        let mut lines = Vec::new();
        for i in 0..12 {
            lines.push(line_at(50.0, 280.0, 100.0 + i as f32 * 14.0));
            lines.push(line_at(330.0, 560.0, 100.0 + i as f32 * 14.0));
        }
        let layout = analyze_columns(lines, 612.0, 792.0).unwrap();
        assert!(layout.is_multi_column);
        assert_eq!(layout.columns.len(), 2);
        assert!(layout.columns[0].x < layout.columns[1].x);
        assert_eq!(layout.columns[0].lines.len(), 12);
        assert_eq!(layout.columns[1].lines.len(), 12);
    }

    #[test]
    fn test_narrow_slivers_do_not_split() {
        // A single wide paragraph with a small internal gap should stay
        // one column: the gap is narrower than 3% of the page.
        let lines: Vec<Line> = (0..8)
            .map(|i| line_at(40.0, 570.0, 100.0 + i as f32 * 14.0))
            .collect();
        let layout = analyze_columns(lines, 612.0, 792.0).unwrap();
        assert_eq!(layout.columns.len(), 1);
    }
}

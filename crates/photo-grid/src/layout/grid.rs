//! Grid layout calculation
//!
//! This module handles the geometric layout of the image grid on a page,
//! including per-row/per-column sizing and grid-line positions.

use crate::constants::mm_to_pt;
use crate::options::GridConfig;
use std::collections::BTreeMap;

use super::{LineDirection, LineSegment, PageGeometry, Rect};

// =============================================================================
// Grid Creation
// =============================================================================

/// Compute the page geometry for a configuration.
///
/// Row heights and column widths come from the overrides where present and
/// from an even split of the usable area otherwise. Cell origins are prefix
/// sums of those sizes. Oversized overrides are not clipped; check
/// [`PageGeometry::overflows`].
///
/// The configuration is expected to have passed [`GridConfig::validate`].
pub fn compute_layout(config: &GridConfig) -> PageGeometry {
    let (page_w_mm, page_h_mm) = config.page_dimensions_mm();
    let page_width = mm_to_pt(page_w_mm);
    let page_height = mm_to_pt(page_h_mm);

    let margin = mm_to_pt(config.margin_mm);
    let usable = Rect::new(
        margin,
        margin,
        page_width - 2.0 * margin,
        page_height - 2.0 * margin,
    );

    let rows = config.rows.max(1);
    let cols = config.columns.max(1);

    let heights = track_sizes(rows, usable.height, &config.row_heights_mm);
    let widths = track_sizes(cols, usable.width, &config.column_widths_mm);

    let tops = prefix_offsets(usable.y, &heights);
    let lefts = prefix_offsets(usable.x, &widths);

    let mut cells = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            cells.push(Rect::new(lefts[col], tops[row], widths[col], heights[row]));
        }
    }

    let lines = if config.grid_lines.visible {
        grid_lines(&tops, &lefts)
    } else {
        Vec::new()
    };

    PageGeometry {
        page_width,
        page_height,
        usable,
        rows,
        cols,
        cells,
        lines,
    }
}

// =============================================================================
// Track Sizing
// =============================================================================

/// Sizes (points) of `count` rows or columns sharing `available` points.
fn track_sizes(count: usize, available: f32, overrides_mm: &BTreeMap<usize, f32>) -> Vec<f32> {
    let uniform = available / count as f32;
    (0..count)
        .map(|i| overrides_mm.get(&i).map_or(uniform, |&mm| mm_to_pt(mm)))
        .collect()
}

/// Running offsets: `count + 1` boundaries starting at `origin`.
fn prefix_offsets(origin: f32, sizes: &[f32]) -> Vec<f32> {
    let mut offsets = Vec::with_capacity(sizes.len() + 1);
    let mut acc = origin;
    offsets.push(acc);
    for size in sizes {
        acc += size;
        offsets.push(acc);
    }
    offsets
}

// =============================================================================
// Grid Lines
// =============================================================================

/// One horizontal line per row boundary and one vertical line per column
/// boundary, each spanning the whole grid.
fn grid_lines(tops: &[f32], lefts: &[f32]) -> Vec<LineSegment> {
    let (Some(&top), Some(&bottom)) = (tops.first(), tops.last()) else {
        return Vec::new();
    };
    let (Some(&left), Some(&right)) = (lefts.first(), lefts.last()) else {
        return Vec::new();
    };

    let horizontal = tops.iter().map(|&y| LineSegment {
        direction: LineDirection::Horizontal,
        x1: left,
        y1: y,
        x2: right,
        y2: y,
    });
    let vertical = lefts.iter().map(|&x| LineSegment {
        direction: LineDirection::Vertical,
        x1: x,
        y1: top,
        x2: x,
        y2: bottom,
    });

    horizontal.chain(vertical).collect()
}

// =============================================================================
// Tests
// =============================================================================

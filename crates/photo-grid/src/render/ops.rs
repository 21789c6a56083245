//! Content stream operators
//!
//! Layout coordinates have their origin at the top-left of the page; PDF
//! user space starts bottom-left, so every y is flipped against the page
//! height here.

use crate::layout::{LineSegment, Rect};
use crate::types::GridLineStyle;

/// Place image XObject `name` so that it fills `rect`.
///
/// Image space is the unit square, so the transform is a plain scale by the
/// destination size plus a translation to its lower-left corner.
pub fn image_placement_ops(name: &str, rect: &Rect, page_height: f32) -> String {
    let y = page_height - rect.bottom();
    format!(
        "q {} 0 0 {} {} {} cm /{} Do Q\n",
        rect.width, rect.height, rect.x, y, name
    )
}

/// Stroke one grid line in the given colour and width.
///
/// Lines use projecting square caps (`2 J`): each segment extends half the
/// stroke width past its endpoints, so the outer corners of the grid close.
pub fn line_ops(line: &LineSegment, style: &GridLineStyle, page_height: f32) -> String {
    let (r, g, b) = style.color.unit();
    format!(
        "q {} {} {} RG {} w 2 J {} {} m {} {} l S Q\n",
        r,
        g,
        b,
        style.width_pt,
        line.x1,
        page_height - line.y1,
        line.x2,
        page_height - line.y2
    )
}

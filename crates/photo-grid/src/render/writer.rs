use crate::composite::PlacedImage;
use crate::layout::LineSegment;
use crate::types::{GridLineStyle, Result};
use std::path::PathBuf;

/// Sequential-page document sink.
///
/// Calls arrive as `begin_page → place_image* → draw_line* → end_page`,
/// repeated per page, then a single `finalize`. Only one thread drives a
/// writer at a time. A writer dropped before `finalize` must leave nothing
/// at its destination.
pub trait DocumentWriter {
    /// Start a new page of the given size in points
    fn begin_page(&mut self, width: f32, height: f32) -> Result<()>;

    /// Blit a composited raster onto the current page
    fn place_image(&mut self, image: &PlacedImage) -> Result<()>;

    /// Stroke one grid-line segment on the current page
    fn draw_line(&mut self, line: &LineSegment, style: &GridLineStyle) -> Result<()>;

    /// Close the current page
    fn end_page(&mut self) -> Result<()>;

    /// Write the finished document and return where it went
    fn finalize(&mut self) -> Result<PathBuf>;
}

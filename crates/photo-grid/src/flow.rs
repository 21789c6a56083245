//! Page flow
//!
//! Drives one generation run: images are partitioned into pages, each cell
//! is composited and handed to the document writer in row-major order, grid
//! lines are drawn on top and the page is closed before the next one opens.

use crate::composite::{ImageCompositor, ImageSource};
use crate::layout::{CellAssignment, PageGeometry, assign_cells, compute_layout};
use crate::options::GridConfig;
use crate::render::DocumentWriter;
use crate::scratch::ScratchSpace;
use crate::types::*;
use std::path::{Path, PathBuf};

/// Receives progress from a running flow and decides whether it continues
pub trait FlowObserver {
    /// Polled before every page and every cell
    fn is_cancelled(&self) -> bool {
        false
    }

    /// `processed` images out of `total` have been handled (placed or skipped)
    fn on_progress(&self, processed: usize, total: usize) {
        let _ = (processed, total);
    }

    fn on_skipped(&self, skipped: &SkippedImage) {
        let _ = skipped;
    }
}

/// Observer that never cancels and ignores notifications
pub struct NoopObserver;

impl FlowObserver for NoopObserver {}

/// Render `images` into `sink` according to `config`.
///
/// The configuration is validated before the first page is opened. Per-image
/// failures follow [`FailurePolicy`]; everything else ends the run. On any
/// error or cancellation `finalize` is never called, so the writer discards
/// what it has buffered.
pub fn render<W>(
    images: &[PathBuf],
    config: &GridConfig,
    sink: &mut W,
    scratch: &ScratchSpace,
    observer: &dyn FlowObserver,
) -> GenerationResult
where
    W: DocumentWriter + ?Sized,
{
    config.validate()?;
    if images.is_empty() {
        return Err(GridError::NoImages);
    }

    let geometry = compute_layout(config);
    if geometry.overflows() {
        log::warn!(
            "Grid extends past the usable area of the {} page; cells will not be clipped",
            config.page_size.name()
        );
    }

    let compositor = ImageCompositor::from_config(config)?;
    let pages = assign_cells(images.len(), geometry.rows, geometry.cols);
    let total = images.len();

    let mut processed = 0;
    let mut placed = 0;
    let mut skipped = Vec::new();

    log::info!(
        "Laying out {} image(s) on {} page(s) of {}x{}",
        total,
        pages.len(),
        geometry.rows,
        geometry.cols
    );

    for (page_index, assignments) in pages.iter().enumerate() {
        check_cancelled(observer)?;

        log::debug!("Begin page {}", page_index + 1);
        sink.begin_page(geometry.page_width, geometry.page_height)?;

        for assignment in assignments {
            check_cancelled(observer)?;

            let path = &images[assignment.image_index];
            match place_cell(sink, &compositor, &geometry, assignment, path, scratch) {
                Ok(()) => placed += 1,
                Err(err) if err.is_image_failure() => match config.failure_policy {
                    FailurePolicy::Skip => {
                        log::warn!("Skipping {}: {}", path.display(), err);
                        let entry = SkippedImage {
                            path: path.clone(),
                            reason: err.to_string(),
                        };
                        observer.on_skipped(&entry);
                        skipped.push(entry);
                    }
                    FailurePolicy::Abort => return Err(err),
                },
                Err(err) => return Err(err),
            }

            processed += 1;
            observer.on_progress(processed, total);
        }

        for line in &geometry.lines {
            sink.draw_line(line, &config.grid_lines)?;
        }

        sink.end_page()?;
        let released = scratch.release_page(page_index)?;
        log::debug!(
            "End page {} ({} scratch raster(s) released)",
            page_index + 1,
            released
        );
    }

    check_cancelled(observer)?;
    let output_path = sink.finalize()?;

    Ok(GenerationSummary {
        output_path,
        page_count: pages.len(),
        placed,
        skipped,
    })
}

fn place_cell<W>(
    sink: &mut W,
    compositor: &ImageCompositor,
    geometry: &PageGeometry,
    assignment: &CellAssignment,
    path: &Path,
    scratch: &ScratchSpace,
) -> Result<()>
where
    W: DocumentWriter + ?Sized,
{
    let slot = assignment.slot;
    let cell = geometry.cell(slot.row, slot.col).ok_or_else(|| {
        GridError::Config(format!("Cell ({}, {}) is outside the grid", slot.row, slot.col))
    })?;

    let source = ImageSource::new(path)?;
    let placed = compositor.fit(&source, cell, slot, scratch)?;
    sink.place_image(&placed)
}

fn check_cancelled(observer: &dyn FlowObserver) -> Result<()> {
    if observer.is_cancelled() {
        log::info!("Generation cancelled");
        return Err(GridError::Cancelled);
    }
    Ok(())
}

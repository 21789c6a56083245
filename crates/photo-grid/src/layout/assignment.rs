//! Cell assignment
//!
//! Images fill each page left-to-right, top-to-bottom in input order and
//! wrap onto a new page once `rows × cols` cells are used.

use super::{CellAssignment, CellSlot};

/// Number of pages needed for `image_count` images
pub fn page_count(image_count: usize, rows: usize, cols: usize) -> usize {
    let per_page = rows * cols;
    if per_page == 0 {
        return 0;
    }
    image_count.div_ceil(per_page)
}

/// Slot of the image at `index` in input order
pub fn slot_for_index(index: usize, rows: usize, cols: usize) -> CellSlot {
    let per_page = rows * cols;
    let within = index % per_page;
    CellSlot::new(index / per_page, within / cols, within % cols)
}

/// Assign every image to a cell, grouped by page.
///
/// Cells after the last image on the final page are simply absent.
pub fn assign_cells(image_count: usize, rows: usize, cols: usize) -> Vec<Vec<CellAssignment>> {
    let per_page = rows * cols;
    if per_page == 0 {
        return Vec::new();
    }

    let indices: Vec<usize> = (0..image_count).collect();
    indices
        .chunks(per_page)
        .map(|chunk| {
            chunk
                .iter()
                .map(|&image_index| CellAssignment {
                    image_index,
                    slot: slot_for_index(image_index, rows, cols),
                })
                .collect()
        })
        .collect()
}

use crate::layout::page_count;
use crate::options::GridConfig;
use crate::types::*;

/// Calculate statistics for a grid run without decoding any image
pub fn calculate_statistics(image_count: usize, config: &GridConfig) -> Result<GridStatistics> {
    config.validate()?;

    if image_count == 0 {
        return Err(GridError::NoImages);
    }

    let cells_per_page = config.cells_per_page();
    let pages = page_count(image_count, config.rows, config.columns);

    // Images on the final page; a full page leaves no remainder
    let last_page_filled = match image_count % cells_per_page {
        0 => cells_per_page,
        n => n,
    };

    Ok(GridStatistics {
        images: image_count,
        cells_per_page,
        pages,
        last_page_filled,
        empty_cells: cells_per_page - last_page_filled,
    })
}

//! Aspect-fit calculation
//!
//! The image is scaled so one dimension matches the cell exactly and the
//! other stays within it, then centered in the remaining slack.

use crate::constants::POINTS_PER_INCH;
use crate::layout::Rect;

/// Result of fitting an image into a cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitPlan {
    /// Placed width in points
    pub width: f32,
    /// Placed height in points
    pub height: f32,
    /// Horizontal offset from the cell's left edge (points)
    pub offset_x: f32,
    /// Vertical offset from the cell's top edge (points)
    pub offset_y: f32,
    /// Resampled raster width in pixels
    pub pixel_width: u32,
    /// Resampled raster height in pixels
    pub pixel_height: u32,
}

impl FitPlan {
    /// Destination rectangle on the page
    pub fn destination(&self, cell: &Rect) -> Rect {
        Rect::new(
            cell.x + self.offset_x,
            cell.y + self.offset_y,
            self.width,
            self.height,
        )
    }
}

/// Fit an `image_width × image_height` pixel image into `cell` at `dpi`.
///
/// Returns `None` for degenerate image or cell dimensions.
pub fn plan_fit(image_width: u32, image_height: u32, cell: &Rect, dpi: f32) -> Option<FitPlan> {
    if image_width == 0 || image_height == 0 || cell.width <= 0.0 || cell.height <= 0.0 {
        return None;
    }

    let image_aspect = image_width as f32 / image_height as f32;
    let wider_than_cell = image_aspect > cell.aspect_ratio();

    let (width, height) = if wider_than_cell {
        (cell.width, cell.width / image_aspect)
    } else {
        (cell.height * image_aspect, cell.height)
    };

    let cell_px_w = points_to_pixels(cell.width, dpi);
    let cell_px_h = points_to_pixels(cell.height, dpi);
    let (pixel_width, pixel_height) = if wider_than_cell {
        let h = (cell_px_w as f32 / image_aspect).round().max(1.0) as u32;
        (cell_px_w, h.min(cell_px_h))
    } else {
        let w = (cell_px_h as f32 * image_aspect).round().max(1.0) as u32;
        (w.min(cell_px_w), cell_px_h)
    };

    Some(FitPlan {
        width,
        height,
        offset_x: (cell.width - width) / 2.0,
        offset_y: (cell.height - height) / 2.0,
        pixel_width,
        pixel_height,
    })
}

/// Pixels covering `points` at `dpi`, at least one
pub fn points_to_pixels(points: f32, dpi: f32) -> u32 {
    (points / POINTS_PER_INCH * dpi).round().max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_image_in_square_cell() {
        let cell = Rect::new(0.0, 0.0, 200.0, 200.0);
        let plan = plan_fit(400, 200, &cell, 72.0).unwrap();

        assert_eq!(plan.width, 200.0);
        assert_eq!(plan.height, 100.0);
        assert_eq!(plan.offset_x, 0.0);
        assert_eq!(plan.offset_y, 50.0);
        assert_eq!((plan.pixel_width, plan.pixel_height), (200, 100));
    }

    #[test]
    fn test_tall_image_in_square_cell() {
        let cell = Rect::new(10.0, 20.0, 200.0, 200.0);
        let plan = plan_fit(100, 400, &cell, 144.0).unwrap();

        assert_eq!(plan.height, 200.0);
        assert_eq!(plan.width, 50.0);
        assert_eq!(plan.offset_x, 75.0);
        assert_eq!(plan.offset_y, 0.0);
        assert_eq!((plan.pixel_width, plan.pixel_height), (100, 400));

        let dest = plan.destination(&cell);
        assert_eq!(dest, Rect::new(85.0, 20.0, 50.0, 200.0));
    }

    #[test]
    fn test_fit_properties_hold_for_many_shapes() {
        let cells = [
            Rect::new(0.0, 0.0, 260.0, 370.0),
            Rect::new(0.0, 0.0, 500.0, 120.0),
            Rect::new(0.0, 0.0, 97.3, 97.3),
        ];
        let images = [(4000, 3000), (3000, 4000), (1, 1), (1920, 1080), (50, 2000)];

        for cell in &cells {
            for &(w, h) in &images {
                let plan = plan_fit(w, h, cell, 300.0).unwrap();

                let touches_w = (plan.width - cell.width).abs() < 1e-3;
                let touches_h = (plan.height - cell.height).abs() < 1e-3;
                assert!(touches_w || touches_h);
                assert!(plan.width <= cell.width + 1e-3);
                assert!(plan.height <= cell.height + 1e-3);

                let aspect = w as f32 / h as f32;
                assert!((plan.width / plan.height - aspect).abs() / aspect < 1e-3);

                assert!(plan.offset_x >= 0.0 && plan.offset_y >= 0.0);
                assert!((plan.offset_x * 2.0 - (cell.width - plan.width)).abs() < 1e-3);
                assert!((plan.offset_y * 2.0 - (cell.height - plan.height)).abs() < 1e-3);

                // Raster keeps the aspect ratio within a pixel
                let expected_h = plan.pixel_width as f32 / aspect;
                let expected_w = plan.pixel_height as f32 * aspect;
                assert!(
                    (plan.pixel_height as f32 - expected_h).abs() <= 1.0
                        || (plan.pixel_width as f32 - expected_w).abs() <= 1.0
                );
            }
        }
    }

    #[test]
    fn test_degenerate_inputs() {
        let cell = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(plan_fit(0, 10, &cell, 300.0).is_none());
        assert!(plan_fit(10, 0, &cell, 300.0).is_none());
        assert!(plan_fit(10, 10, &Rect::new(0.0, 0.0, 0.0, 10.0), 300.0).is_none());
    }
}

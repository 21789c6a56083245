//! Shared constants for grid generation
//!
//! This module centralizes magic numbers and defaults used throughout
//! layout, compositing and rendering.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Points per inch
pub const POINTS_PER_INCH: f32 = 72.0;

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

// =============================================================================
// Layout Defaults
// =============================================================================

/// Margin kept clear on every side of the page (mm)
pub const DEFAULT_MARGIN_MM: f32 = 10.0;

/// Default grid dimensions
pub const DEFAULT_ROWS: usize = 2;
pub const DEFAULT_COLUMNS: usize = 2;

/// Tolerance for deciding whether cells run past the usable area (points)
pub const OVERFLOW_TOLERANCE_PT: f32 = 0.01;

// =============================================================================
// Raster Resolution
// =============================================================================

/// Resolution placed images are resampled to
pub const DEFAULT_DPI: f32 = 300.0;

pub const MIN_DPI: f32 = 36.0;
pub const MAX_DPI: f32 = 1200.0;

// =============================================================================
// Output
// =============================================================================

pub const PDF_VERSION: &str = "1.7";

pub const DEFAULT_TITLE: &str = "Image Grid";

pub const PRODUCER: &str = concat!("photo-grid ", env!("CARGO_PKG_VERSION"));

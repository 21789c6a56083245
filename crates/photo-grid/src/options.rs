use crate::composite::load_cmyk_profile;
use crate::constants::*;
use crate::layout::compute_layout;
use crate::types::*;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Complete grid configuration for one generation run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
    // Page
    pub page_size: PageSize,
    pub orientation: Orientation,
    pub margin_mm: f32,

    // Grid
    pub rows: usize,
    pub columns: usize,
    /// Row index -> height (mm). Rows without an entry get `usable height /
    /// rows`, whatever the overridden rows take up.
    pub row_heights_mm: BTreeMap<usize, f32>,
    /// Column index -> width (mm). Columns without an entry get `usable width /
    /// columns`, whatever the overridden columns take up.
    pub column_widths_mm: BTreeMap<usize, f32>,

    // Grid lines
    pub grid_lines: GridLineStyle,

    // Raster output
    pub dpi: f32,
    pub color_mode: ColorMode,

    // Policies
    pub failure_policy: FailurePolicy,
    pub overflow_policy: OverflowPolicy,

    /// Title written to the document information dictionary
    pub title: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            margin_mm: DEFAULT_MARGIN_MM,
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            row_heights_mm: BTreeMap::new(),
            column_widths_mm: BTreeMap::new(),
            grid_lines: GridLineStyle::default(),
            dpi: DEFAULT_DPI,
            color_mode: ColorMode::Rgb,
            failure_policy: FailurePolicy::Skip,
            overflow_policy: OverflowPolicy::Warn,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl GridConfig {
    /// Load a layout from a JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let config = serde_json::from_slice(&bytes)
            .map_err(|e| GridError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Page dimensions in millimeters with orientation applied
    pub fn page_dimensions_mm(&self) -> (f32, f32) {
        self.page_size.dimensions_with_orientation(self.orientation)
    }

    /// Number of cells on a full page, saturating for grids `validate` rejects
    pub fn cells_per_page(&self) -> usize {
        self.rows.saturating_mul(self.columns)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.columns == 0 {
            return Err(GridError::Config(format!(
                "Grid must have at least one row and one column (got {}x{})",
                self.rows, self.columns
            )));
        }

        if self.rows.checked_mul(self.columns).is_none() {
            return Err(GridError::Config(format!(
                "Grid of {}x{} cells is too large",
                self.rows, self.columns
            )));
        }

        validate_overrides("Row", &self.row_heights_mm, self.rows)?;
        validate_overrides("Column", &self.column_widths_mm, self.columns)?;

        let width = self.grid_lines.width_pt;
        if !width.is_finite() || width <= 0.0 {
            return Err(GridError::Config(format!(
                "Grid line width must be positive (got {})",
                width
            )));
        }

        if !(MIN_DPI..=MAX_DPI).contains(&self.dpi) {
            return Err(GridError::Config(format!(
                "Resolution must be between {} and {} dpi (got {})",
                MIN_DPI, MAX_DPI, self.dpi
            )));
        }

        let (page_w, page_h) = self.page_dimensions_mm();
        if !self.margin_mm.is_finite()
            || self.margin_mm < 0.0
            || self.margin_mm * 2.0 >= page_w.min(page_h)
        {
            return Err(GridError::Config(format!(
                "Margin of {} mm leaves no usable area on {}",
                self.margin_mm,
                self.page_size.name()
            )));
        }

        // Uniform cells must hold at least one pixel at the output resolution
        let usable_w = page_w - 2.0 * self.margin_mm;
        let usable_h = page_h - 2.0 * self.margin_mm;
        let cell_px = |usable_mm: f32, tracks: usize| {
            mm_to_pt(usable_mm) / tracks as f32 / POINTS_PER_INCH * self.dpi
        };
        if cell_px(usable_w, self.columns) < 1.0 || cell_px(usable_h, self.rows) < 1.0 {
            return Err(GridError::Config(format!(
                "Grid of {}x{} cells is too fine: cells would be under one pixel at {} dpi",
                self.rows, self.columns, self.dpi
            )));
        }

        if let ColorMode::Cmyk(CmykConversion::IccProfile { profile, .. }) = &self.color_mode {
            load_cmyk_profile(profile)?;
        }

        if self.overflow_policy == OverflowPolicy::Reject {
            let geometry = compute_layout(self);
            if geometry.overflows() {
                return Err(GridError::Config(
                    "Row heights or column widths exceed the usable page area".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn validate_overrides(kind: &str, overrides: &BTreeMap<usize, f32>, count: usize) -> Result<()> {
    for (&index, &size) in overrides {
        if index >= count {
            return Err(GridError::Config(format!(
                "{} override index {} is out of range (grid has {})",
                kind, index, count
            )));
        }
        if !size.is_finite() || size <= 0.0 {
            return Err(GridError::Config(format!(
                "{} {} size must be positive (got {})",
                kind, index, size
            )));
        }
    }
    Ok(())
}

use crate::layout::{CellSlot, Rect};
use crate::options::GridConfig;
use crate::scratch::ScratchSpace;
use crate::types::{ColorMode, GridError, Result};
use image::imageops::FilterType;
use std::path::PathBuf;

use super::color::{CmykConverter, flatten_alpha};
use super::fit::plan_fit;
use super::format::ImageSource;

/// Resampling filter for placed images.
///
/// Large photos are shrunk into small cells; nearest and bilinear filters
/// alias visibly at those ratios.
pub const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Sample layout of a placed raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Rgb,
    Cmyk,
}

impl PixelLayout {
    pub fn components(self) -> usize {
        match self {
            PixelLayout::Rgb => 3,
            PixelLayout::Cmyk => 4,
        }
    }

    /// PDF colour space name
    pub fn pdf_color_space(self) -> &'static str {
        match self {
            PixelLayout::Rgb => "DeviceRGB",
            PixelLayout::Cmyk => "DeviceCMYK",
        }
    }
}

/// A resampled raster positioned on the page.
///
/// Samples live in the scratch file at `raster` and are removed with the
/// page; the value itself never outlives page rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedImage {
    pub source: PathBuf,
    pub slot: CellSlot,
    /// The cell the image was fitted into
    pub cell: Rect,
    /// Destination rectangle in page points
    pub rect: Rect,
    /// Offset of `rect` from the cell's top-left corner
    pub offset_x: f32,
    pub offset_y: f32,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub layout: PixelLayout,
    /// Scratch file with interleaved 8-bit samples, top row first
    pub raster: PathBuf,
}

impl PlacedImage {
    /// Read the spooled samples back
    pub fn read_samples(&self) -> Result<Vec<u8>> {
        let samples = std::fs::read(&self.raster)?;
        let expected =
            self.pixel_width as usize * self.pixel_height as usize * self.layout.components();
        if samples.len() != expected {
            return Err(GridError::Write(format!(
                "Scratch raster {} holds {} bytes, expected {}",
                self.raster.display(),
                samples.len(),
                expected
            )));
        }
        Ok(samples)
    }
}

/// Produces placement-ready rasters for grid cells
#[derive(Debug)]
pub struct ImageCompositor {
    dpi: f32,
    /// `None` keeps DeviceRGB samples
    cmyk: Option<CmykConverter>,
}

impl ImageCompositor {
    /// Fails only when a CMYK output profile cannot be loaded
    pub fn new(dpi: f32, color_mode: &ColorMode) -> Result<Self> {
        let cmyk = match color_mode {
            ColorMode::Rgb => None,
            ColorMode::Cmyk(conversion) => Some(CmykConverter::new(conversion)?),
        };
        Ok(Self { dpi, cmyk })
    }

    pub fn from_config(config: &GridConfig) -> Result<Self> {
        Self::new(config.dpi, &config.color_mode)
    }

    /// Fit `source` into `cell`.
    ///
    /// The decoded image is dropped before this returns; only the spooled
    /// scratch file remains.
    pub fn fit(
        &self,
        source: &ImageSource,
        cell: &Rect,
        slot: CellSlot,
        scratch: &ScratchSpace,
    ) -> Result<PlacedImage> {
        let decoded = source.open()?;
        let (src_w, src_h) = (decoded.width(), decoded.height());

        let plan = plan_fit(src_w, src_h, cell, self.dpi).ok_or_else(|| GridError::Decode {
            path: source.path().to_path_buf(),
            message: format!("degenerate image dimensions {}x{}", src_w, src_h),
        })?;

        log::debug!(
            "Fitting {} ({}x{} {}) into cell p{} r{} c{} as {}x{} px",
            source.path().display(),
            src_w,
            src_h,
            source.format().name(),
            slot.page,
            slot.row,
            slot.col,
            plan.pixel_width,
            plan.pixel_height
        );

        // Flatten first so transparent edges do not bleed dark into the resample
        let flat = flatten_alpha(decoded);
        let resized = if flat.dimensions() == (plan.pixel_width, plan.pixel_height) {
            flat
        } else {
            image::imageops::resize(&flat, plan.pixel_width, plan.pixel_height, RESAMPLE_FILTER)
        };

        let (layout, samples) = match &self.cmyk {
            None => (PixelLayout::Rgb, resized.into_raw()),
            Some(converter) => (PixelLayout::Cmyk, converter.convert(&resized)),
        };

        let raster = scratch.write_cell(slot, &samples)?;

        Ok(PlacedImage {
            source: source.path().to_path_buf(),
            slot,
            cell: *cell,
            rect: plan.destination(cell),
            offset_x: plan.offset_x,
            offset_y: plan.offset_y,
            pixel_width: plan.pixel_width,
            pixel_height: plan.pixel_height,
            layout,
            raster,
        })
    }
}

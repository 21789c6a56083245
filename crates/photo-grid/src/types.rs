use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Unsupported image format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("Failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Write failure: {0}")]
    Write(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Generation cancelled")]
    Cancelled,
    #[error("No images to place")]
    NoImages,
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl GridError {
    /// The source image this error is about, if any.
    pub fn image_path(&self) -> Option<&Path> {
        match self {
            GridError::UnsupportedFormat { path } | GridError::Decode { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Per-image failures are subject to [`FailurePolicy`]; everything else is fatal.
    pub fn is_image_failure(&self) -> bool {
        self.image_path().is_some()
    }
}

pub type Result<T> = std::result::Result<T, GridError>;

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Portrait: height > width
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Supported output page sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageSize {
    #[default]
    A4,
    A3,
}

impl PageSize {
    /// Get base dimensions (always portrait)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::A3 => (297.0, 420.0),
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::A3 => "A3",
        }
    }
}

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components scaled to 0.0..=1.0 for PDF colour operators
    pub fn unit(self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

/// Grid-line drawing options
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridLineStyle {
    /// Draw lines at cell boundaries
    pub visible: bool,
    pub color: RgbColor,
    /// Stroke width in points
    pub width_pt: f32,
}

impl Default for GridLineStyle {
    fn default() -> Self {
        Self {
            visible: true,
            color: RgbColor::BLACK,
            width_pt: 1.0,
        }
    }
}

/// RGB to CMYK conversion used for print output.
///
/// `GrayComponentReplacement` moves the shared grey component into the black
/// channel: `K = 1 - max(R, G, B)`, `C = (1 - R - K) / (1 - K)` (likewise M
/// and Y), with pure black mapping to `(0, 0, 0, 1)`.
///
/// `Inversion` is the plain complement `C = 1 - R, M = 1 - G, Y = 1 - B,
/// K = 0`. Dark tones print noticeably differently (rich four-ink black with
/// no K), so it is only offered as an alternative.
///
/// `IccProfile` treats the input as sRGB and converts it through a CMYK output
/// profile (Little CMS) with the given rendering intent. The profile must
/// exist and describe a CMYK colour space; [`GridConfig::validate`] checks
/// both.
///
/// [`GridConfig::validate`]: crate::GridConfig::validate
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CmykConversion {
    #[default]
    GrayComponentReplacement,
    Inversion,
    IccProfile {
        profile: PathBuf,
        #[cfg_attr(feature = "serde", serde(default))]
        intent: RenderingIntent,
    },
}

/// ICC rendering intent for profile-based conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RenderingIntent {
    #[default]
    Perceptual,
    RelativeColorimetric,
    Saturation,
    AbsoluteColorimetric,
}

/// Colour model of placed rasters
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorMode {
    /// DeviceRGB, no conversion after alpha flattening
    #[default]
    Rgb,
    /// DeviceCMYK for print workflows
    Cmyk(CmykConversion),
}

/// What happens when a single image cannot be placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailurePolicy {
    /// Leave the cell empty, keep going and report the image at the end
    #[default]
    Skip,
    /// Fail the whole job on the first bad image
    Abort,
}

/// What happens when row/column overrides exceed the usable page area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OverflowPolicy {
    /// Render cells past the page edge unclipped and log a warning
    #[default]
    Warn,
    /// Reject the configuration up front
    Reject,
}

/// An image that was left out of the document
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedImage {
    pub path: PathBuf,
    pub reason: String,
}

/// Successful generation outcome
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSummary {
    pub output_path: PathBuf,
    pub page_count: usize,
    /// Images placed into cells
    pub placed: usize,
    pub skipped: Vec<SkippedImage>,
}

pub type GenerationResult = Result<GenerationSummary>;

/// Statistics about a grid run
#[derive(Debug, Clone, PartialEq)]
pub struct GridStatistics {
    /// Number of input images
    pub images: usize,
    /// rows × columns
    pub cells_per_page: usize,
    /// Output page count
    pub pages: usize,
    /// Occupied cells on the final page
    pub last_page_filled: usize,
    /// Cells left empty on the final page
    pub empty_cells: usize,
}

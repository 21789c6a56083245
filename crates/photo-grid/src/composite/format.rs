//! Supported raster formats and lazily-decoded image sources

use crate::types::{GridError, Result};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::{Path, PathBuf};

/// Closed set of raster formats accepted as input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
    Tiff,
    Bmp,
}

impl RasterFormat {
    pub const ALL: [RasterFormat; 4] = [
        RasterFormat::Png,
        RasterFormat::Jpeg,
        RasterFormat::Tiff,
        RasterFormat::Bmp,
    ];

    /// Format from a file extension (case-insensitive, without the dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(RasterFormat::Png),
            "jpg" | "jpeg" => Some(RasterFormat::Jpeg),
            "tif" | "tiff" => Some(RasterFormat::Tiff),
            "bmp" => Some(RasterFormat::Bmp),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Map a format detected from file content back into the allow-list
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(RasterFormat::Png),
            ImageFormat::Jpeg => Some(RasterFormat::Jpeg),
            ImageFormat::Tiff => Some(RasterFormat::Tiff),
            ImageFormat::Bmp => Some(RasterFormat::Bmp),
            _ => None,
        }
    }

    /// Decoder used for this format
    pub fn image_format(self) -> ImageFormat {
        match self {
            RasterFormat::Png => ImageFormat::Png,
            RasterFormat::Jpeg => ImageFormat::Jpeg,
            RasterFormat::Tiff => ImageFormat::Tiff,
            RasterFormat::Bmp => ImageFormat::Bmp,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RasterFormat::Png => "PNG",
            RasterFormat::Jpeg => "JPEG",
            RasterFormat::Tiff => "TIFF",
            RasterFormat::Bmp => "BMP",
        }
    }
}

/// Whether `path` has an accepted raster extension
pub fn is_supported_path(path: impl AsRef<Path>) -> bool {
    RasterFormat::from_path(path.as_ref()).is_some()
}

/// An input image: path plus format tag. Pixels are only decoded by
/// [`ImageSource::open`] and are owned by the caller of that method.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSource {
    path: PathBuf,
    format: RasterFormat,
}

impl ImageSource {
    /// Fails with `UnsupportedFormat` when the extension is outside the allow-list
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match RasterFormat::from_path(&path) {
            Some(format) => Ok(Self { path, format }),
            None => Err(GridError::UnsupportedFormat { path }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> RasterFormat {
        self.format
    }

    /// Decode the image.
    ///
    /// The content is sniffed as well: a file whose bytes are a format
    /// outside the allow-list is rejected even if its extension is accepted.
    pub fn open(&self) -> Result<DynamicImage> {
        let reader = ImageReader::open(&self.path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| self.decode_error(e))?;

        let reader = match reader.format() {
            Some(detected) => {
                if RasterFormat::from_image_format(detected).is_none() {
                    return Err(GridError::UnsupportedFormat {
                        path: self.path.clone(),
                    });
                }
                reader
            }
            None => {
                let mut reader = reader;
                reader.set_format(self.format.image_format());
                reader
            }
        };

        reader.decode().map_err(|e| self.decode_error(e))
    }

    fn decode_error(&self, err: impl std::fmt::Display) -> GridError {
        GridError::Decode {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}

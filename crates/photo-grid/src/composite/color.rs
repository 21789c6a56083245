//! Colour-space normalization for placed rasters

use crate::types::{CmykConversion, GridError, RenderingIntent, Result};
use image::{DynamicImage, Rgb, RgbImage};
use lcms2::{ColorSpaceSignature, Intent, PixelFormat, Profile, Transform};
use std::fmt;
use std::path::Path;

/// Drop transparency by compositing over opaque white.
///
/// Images without an alpha channel are converted to 8-bit RGB unchanged.
pub fn flatten_alpha(image: DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.into_rgb8();
    }

    let rgba = image.into_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (src, dst) in rgba.pixels().zip(out.pixels_mut()) {
        let [r, g, b, a] = src.0;
        *dst = Rgb([over_white(r, a), over_white(g, a), over_white(b, a)]);
    }
    out
}

/// `c·α + 255·(1-α)` with rounding, in integer arithmetic
fn over_white(channel: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((channel as u32 * a + 255 * (255 - a) + 127) / 255) as u8
}

/// RGB to CMYK conversion prepared once per run.
///
/// Profile-based conversion parses the profile and builds the Little CMS
/// transform up front; formula conversions need no setup.
pub enum CmykConverter {
    GrayComponentReplacement,
    Inversion,
    Icc(Transform<[u8; 3], [u8; 4]>),
}

impl CmykConverter {
    pub fn new(conversion: &CmykConversion) -> Result<Self> {
        match conversion {
            CmykConversion::GrayComponentReplacement => Ok(Self::GrayComponentReplacement),
            CmykConversion::Inversion => Ok(Self::Inversion),
            CmykConversion::IccProfile { profile, intent } => {
                let output = load_cmyk_profile(profile)?;
                let transform = Transform::new(
                    &Profile::new_srgb(),
                    PixelFormat::RGB_8,
                    &output,
                    PixelFormat::CMYK_8,
                    lcms_intent(*intent),
                )
                .map_err(|e| {
                    GridError::Config(format!(
                        "Cannot convert to ICC profile {}: {}",
                        profile.display(),
                        e
                    ))
                })?;
                log::debug!(
                    "CMYK output through {} ({:?})",
                    profile.display(),
                    intent
                );
                Ok(Self::Icc(transform))
            }
        }
    }

    /// Interleaved CMYK samples for an RGB raster
    pub fn convert(&self, rgb: &RgbImage) -> Vec<u8> {
        match self {
            Self::GrayComponentReplacement => map_pixels(rgb, gcr_pixel),
            Self::Inversion => map_pixels(rgb, |[r, g, b]| [255 - r, 255 - g, 255 - b, 0]),
            Self::Icc(transform) => {
                let src: Vec<[u8; 3]> = rgb.pixels().map(|p| p.0).collect();
                let mut dst = vec![[0u8; 4]; src.len()];
                transform.transform_pixels(&src, &mut dst);
                dst.concat()
            }
        }
    }
}

impl fmt::Debug for CmykConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GrayComponentReplacement => f.write_str("GrayComponentReplacement"),
            Self::Inversion => f.write_str("Inversion"),
            Self::Icc(_) => f.write_str("Icc"),
        }
    }
}

/// Open an ICC profile and require a CMYK device colour space
pub(crate) fn load_cmyk_profile(path: &Path) -> Result<Profile> {
    if !path.is_file() {
        return Err(GridError::Config(format!(
            "ICC profile {} does not exist",
            path.display()
        )));
    }
    let profile = Profile::new_file(path).map_err(|e| {
        GridError::Config(format!(
            "Failed to read ICC profile {}: {}",
            path.display(),
            e
        ))
    })?;
    if profile.color_space() != ColorSpaceSignature::CmykData {
        return Err(GridError::Config(format!(
            "ICC profile {} is not a CMYK profile",
            path.display()
        )));
    }
    Ok(profile)
}

fn lcms_intent(intent: RenderingIntent) -> Intent {
    match intent {
        RenderingIntent::Perceptual => Intent::Perceptual,
        RenderingIntent::RelativeColorimetric => Intent::RelativeColorimetric,
        RenderingIntent::Saturation => Intent::Saturation,
        RenderingIntent::AbsoluteColorimetric => Intent::AbsoluteColorimetric,
    }
}

fn map_pixels(rgb: &RgbImage, convert: impl Fn([u8; 3]) -> [u8; 4]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rgb.width() as usize * rgb.height() as usize * 4);
    for pixel in rgb.pixels() {
        out.extend_from_slice(&convert(pixel.0));
    }
    out
}

fn gcr_pixel([r, g, b]: [u8; 3]) -> [u8; 4] {
    let (r, g, b) = (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    let k = 1.0 - r.max(g).max(b);
    if k >= 1.0 {
        return [0, 0, 0, 255];
    }
    let scale = |v: f32| ((1.0 - v - k) / (1.0 - k) * 255.0).round().clamp(0.0, 255.0) as u8;
    [scale(r), scale(g), scale(b), (k * 255.0).round() as u8]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_transparent_pixels_become_white() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([10, 20, 30, 0]));
        img.put_pixel(1, 0, Rgba([10, 20, 30, 255]));

        let flat = flatten_alpha(DynamicImage::ImageRgba8(img));

        assert_eq!(flat.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(flat.get_pixel(1, 0).0, [10, 20, 30]);
    }

    #[test]
    fn test_half_alpha_blends_with_white() {
        let mut img = RgbaImage::new(1, 1);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 128]));

        let flat = flatten_alpha(DynamicImage::ImageRgba8(img));

        // 255 * 127 / 255 = 127
        assert_eq!(flat.get_pixel(0, 0).0, [127, 127, 127]);
    }

    #[test]
    fn test_opaque_image_passes_through() {
        let mut img = RgbImage::new(1, 1);
        img.put_pixel(0, 0, Rgb([1, 2, 3]));
        let flat = flatten_alpha(DynamicImage::ImageRgb8(img));
        assert_eq!(flat.get_pixel(0, 0).0, [1, 2, 3]);
    }

    #[test]
    fn test_gray_component_replacement() {
        assert_eq!(gcr_pixel([255, 0, 0]), [0, 255, 255, 0]);
        assert_eq!(gcr_pixel([0, 0, 0]), [0, 0, 0, 255]);
        assert_eq!(gcr_pixel([255, 255, 255]), [0, 0, 0, 0]);
        // Mid grey is carried entirely by K
        let grey = gcr_pixel([128, 128, 128]);
        assert_eq!(&grey[..3], &[0, 0, 0]);
        assert_eq!(grey[3], 127);
    }

    #[test]
    fn test_inversion_never_uses_black() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([0, 0, 0]));
        img.put_pixel(1, 0, Rgb([255, 0, 128]));
        let converter = CmykConverter::new(&CmykConversion::Inversion).unwrap();
        assert_eq!(converter.convert(&img), vec![255, 255, 255, 0, 0, 255, 127, 0]);
    }

    #[test]
    fn test_cmyk_sample_layout() {
        let img = RgbImage::from_pixel(3, 2, Rgb([255, 255, 255]));
        let converter = CmykConverter::new(&CmykConversion::GrayComponentReplacement).unwrap();
        let samples = converter.convert(&img);
        assert_eq!(samples.len(), 3 * 2 * 4);
        assert!(samples.iter().all(|&s| s == 0));
    }

    fn icc_conversion(profile: &Path) -> CmykConversion {
        CmykConversion::IccProfile {
            profile: profile.to_path_buf(),
            intent: RenderingIntent::RelativeColorimetric,
        }
    }

    #[test]
    fn test_missing_icc_profile_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("coated.icc");
        match CmykConverter::new(&icc_conversion(&missing)) {
            Err(GridError::Config(msg)) => assert!(msg.contains("does not exist")),
            other => panic!("Expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_icc_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.icc");
        std::fs::write(&bogus, b"definitely not a profile").unwrap();
        match CmykConverter::new(&icc_conversion(&bogus)) {
            Err(GridError::Config(msg)) => assert!(msg.contains("Failed to read")),
            other => panic!("Expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_rgb_profile_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let srgb = dir.path().join("srgb.icc");
        std::fs::write(&srgb, Profile::new_srgb().icc().unwrap()).unwrap();
        match CmykConverter::new(&icc_conversion(&srgb)) {
            Err(GridError::Config(msg)) => assert!(msg.contains("not a CMYK profile")),
            other => panic!("Expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_intent_mapping() {
        assert_eq!(lcms_intent(RenderingIntent::default()), Intent::Perceptual);
        assert_eq!(
            lcms_intent(RenderingIntent::AbsoluteColorimetric),
            Intent::AbsoluteColorimetric
        );
        assert_eq!(lcms_intent(RenderingIntent::Saturation), Intent::Saturation);
    }
}

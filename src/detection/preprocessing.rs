use image::{ColorType, DynamicImage, GrayImage, Luma, Rgb, Rgb32FImage, RgbImage};

use crate::error::{DetectionError, Result};
use crate::models::HueRange;

/// Image whose three channels hold hue, saturation and value, each in [0, 1]
/// (hue strictly below 1)
pub type HsvImage = Rgb32FImage;

/// Accept a decoded image only if it is a 3-channel RGB raster
pub fn rgb_from_dynamic(img: &DynamicImage) -> Result<RgbImage> {
    ensure_dimensions(img.width(), img.height())?;
    match img.color() {
        ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => Ok(img.to_rgb8()),
        other => Err(DetectionError::invalid_format(format!(
            "expected 3 color channels, got {} ({:?})",
            other.channel_count(),
            other
        ))),
    }
}

/// Convert an RGB image to HSV
pub fn to_hsv(img: &RgbImage) -> Result<HsvImage> {
    ensure_dimensions(img.width(), img.height())?;
    let mut hsv = HsvImage::new(img.width(), img.height());
    for (dst, src) in hsv.pixels_mut().zip(img.pixels()) {
        *dst = rgb_to_hsv(*src);
    }
    Ok(hsv)
}

fn ensure_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(DetectionError::invalid_format(format!(
            "image has zero size ({}x{})",
            width, height
        )));
    }
    Ok(())
}

/// Hexcone conversion of one pixel. Gray pixels get hue 0.
pub fn rgb_to_hsv(Rgb([r, g, b]): Rgb<u8>) -> Rgb<f32> {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let saturation = if max == 0.0 { 0.0 } else { delta / max };

    let hue = if delta == 0.0 {
        0.0
    } else {
        // Blue wins ties over green, green over red
        let sector = if b == max {
            4.0 + (r - g) / delta
        } else if g == max {
            2.0 + (b - r) / delta
        } else {
            (g - b) / delta
        };
        (sector / 6.0).rem_euclid(1.0)
    };

    Rgb([hue as f32, saturation as f32, max as f32])
}

/// 255 wherever the pixel's hue lies inside `range` (inclusive), else 0.
/// Saturation and value are not consulted.
pub fn hue_mask(hsv: &HsvImage, range: HueRange) -> GrayImage {
    let mut mask = GrayImage::new(hsv.width(), hsv.height());
    for (dst, src) in mask.pixels_mut().zip(hsv.pixels()) {
        if range.contains(src[0]) {
            *dst = Luma([255]);
        }
    }
    mask
}

//! Outputs built on top of detection results: the JSON results file, masked
//! crops per fruit, contour overlays and per-stage debug images.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::{EncodableLayout, GrayImage, ImageBuffer, PixelWithColorType, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::{debug, warn};

use crate::batch::load_rgb;
use crate::detection::{DetectionPipeline, FruitAnalysis};
use crate::error::{DetectionError, Result};
use crate::models::FruitKind;
use crate::store::ResultStore;

/// `{imageName: {apple, banana, orange}}` with 4-space indentation
pub fn to_json_string(store: &ResultStore) -> Result<String> {
    let mut buf = Vec::new();
    write_json_to(store, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write the results file. Returns `Ok(false)` without touching the file
/// system when there is nothing to export.
pub fn write_json(store: &ResultStore, path: &Path) -> Result<bool> {
    if store.is_empty() {
        warn!("No results to export.");
        return Ok(false);
    }

    let io_err = |source| DetectionError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    write_json_to(store, &mut writer).map_err(|e| DetectionError::Export {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    writer.flush().map_err(io_err)?;

    debug!(path = %path.display(), entries = store.len(), "exported results");
    Ok(true)
}

fn write_json_to<W: Write>(store: &ResultStore, writer: W) -> serde_json::Result<()> {
    let mut ser = Serializer::with_formatter(writer, PrettyFormatter::with_indent(b"    "));
    store.serialize(&mut ser)
}

fn save_image<P>(img: &ImageBuffer<P, Vec<P::Subpixel>>, path: &Path) -> Result<()>
where
    P: PixelWithColorType,
    [P::Subpixel]: EncodableLayout,
{
    img.save(path).map_err(|e| DetectionError::Export {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Keep the source pixels where the mask is set, black elsewhere
pub fn masked_image(img: &RgbImage, mask: &GrayImage) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        if mask.get_pixel(x, y)[0] != 0 {
            *img.get_pixel(x, y)
        } else {
            Rgb([0, 0, 0])
        }
    })
}

/// For every image, write one masked crop per fruit as
/// `{stem}_{fruits}_{n}.jpg`, `n` being the 1-based position in `paths`.
/// Images that fail to load are skipped with a warning.
pub fn save_masked_images(
    pipeline: &DetectionPipeline,
    paths: &[PathBuf],
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    if paths.is_empty() {
        warn!("No processed images to save.");
        return Ok(Vec::new());
    }
    std::fs::create_dir_all(out_dir).map_err(|source| DetectionError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    for (i, path) in paths.iter().enumerate() {
        let rgb = match load_rgb(path) {
            Ok(rgb) => rgb,
            Err(err) => {
                warn!(image = %path.display(), "not saving masked images: {}", err);
                continue;
            }
        };
        let detection = pipeline.detect(&rgb)?;
        let stem = file_stem(path);

        for kind in FruitKind::ALL {
            let output = out_dir.join(format!("{}_{}_{}.jpg", stem, kind.plural(), i + 1));
            save_image(&masked_image(&rgb, detection.masks.get(kind)), &output)?;
            written.push(output);
        }
    }

    Ok(written)
}

/// The source image lightened by half the mask, with the fruit's contours
/// outlined in its overlay color
pub fn render_overlay(img: &RgbImage, analysis: &FruitAnalysis) -> RgbImage {
    let mut canvas = RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let tint = analysis.mask.get_pixel(x, y)[0] / 2;
        let Rgb(px) = *img.get_pixel(x, y);
        Rgb(px.map(|c| c.saturating_add(tint)))
    });

    let color = Rgb(analysis.kind.overlay_color());
    for contour in &analysis.contours {
        for segment in contour.points.windows(2) {
            draw_line_segment_mut(
                &mut canvas,
                (segment[0].x, segment[0].y),
                (segment[1].x, segment[1].y),
                color,
            );
        }
    }
    canvas
}

/// Prepare a debug output directory, which must be empty or not exist yet
pub fn prepare_debug_dir(dir: &Path) -> Result<()> {
    let io_err = |source| DetectionError::Io {
        path: dir.to_path_buf(),
        source,
    };
    if dir.exists() {
        let mut entries = std::fs::read_dir(dir).map_err(io_err)?;
        if entries.next().is_some() {
            return Err(DetectionError::Export {
                path: dir.to_path_buf(),
                reason: "debug directory is not empty".to_string(),
            });
        }
    } else {
        std::fs::create_dir_all(dir).map_err(io_err)?;
    }
    Ok(())
}

/// Save the raw mask, cleaned mask and overlay of every fruit pass under
/// `dir/{stem}/`
pub fn write_debug_outputs(
    pipeline: &DetectionPipeline,
    img: &RgbImage,
    image_path: &Path,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let image_dir = dir.join(file_stem(image_path));
    std::fs::create_dir_all(&image_dir).map_err(|source| DetectionError::Io {
        path: image_dir.clone(),
        source,
    })?;

    let mut written = Vec::new();
    for analysis in pipeline.analyze(img)? {
        let fruit = analysis.kind.name();

        let mask_path = image_dir.join(format!("01_{fruit}_mask.png"));
        save_image(&analysis.mask, &mask_path)?;
        let cleaned_path = image_dir.join(format!("02_{fruit}_cleaned.png"));
        save_image(&analysis.cleaned, &cleaned_path)?;
        let overlay_path = image_dir.join(format!("03_{fruit}_overlay.png"));
        save_image(&render_overlay(img, &analysis), &overlay_path)?;

        debug!(
            image = %image_path.display(),
            fruit,
            contours = analysis.contours.len(),
            "saved debug images"
        );
        written.extend([mask_path, cleaned_path, overlay_path]);
    }
    Ok(written)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::region_labelling::{Connectivity, connected_components};

/// Binarize a mask with Otsu's threshold and drop 4-connected components
/// smaller than `min_size` pixels.
///
/// A uniform mask (including an all-zero one) has no usable threshold: every
/// pixel sits on the threshold itself and none exceeds it, so the result is
/// an all-zero mask.
pub fn clean_mask(mask: &GrayImage, min_size: u32) -> GrayImage {
    let (width, height) = mask.dimensions();
    if is_uniform(mask) {
        return GrayImage::new(width, height);
    }

    let level = otsu_level(mask);
    let mut binary = GrayImage::new(width, height);
    for (dst, src) in binary.pixels_mut().zip(mask.pixels()) {
        if src[0] > level {
            *dst = Luma([255]);
        }
    }

    remove_small_objects(&binary, min_size)
}

fn is_uniform(mask: &GrayImage) -> bool {
    match mask.pixels().next() {
        Some(first) => mask.pixels().all(|p| p == first),
        None => true,
    }
}

/// Keep only the 4-connected foreground components with at least `min_size`
/// pixels
pub fn remove_small_objects(binary: &GrayImage, min_size: u32) -> GrayImage {
    let labeled = connected_components(binary, Connectivity::Four, Luma([0u8]));

    let max_label = labeled.pixels().map(|p| p[0]).max().unwrap_or(0) as usize;
    let mut sizes = vec![0u32; max_label + 1];
    for label in labeled.pixels() {
        sizes[label[0] as usize] += 1;
    }

    let mut cleaned = GrayImage::new(binary.width(), binary.height());
    for (dst, label) in cleaned.pixels_mut().zip(labeled.pixels()) {
        let label = label[0] as usize;
        if label != 0 && sizes[label] >= min_size {
            *dst = Luma([255]);
        }
    }
    cleaned
}

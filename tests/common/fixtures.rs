#![allow(dead_code)]

use fruitcount::FruitCounts;
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

/// Hue 0.0, inside the apple band only
pub const APPLE_RED: Rgb<u8> = Rgb([255, 0, 0]);
/// Hue ~0.080, inside the orange band only
pub const ORANGE: Rgb<u8> = Rgb([255, 122, 0]);
/// Hue ~0.130, inside the banana band only
pub const BANANA_YELLOW: Rgb<u8> = Rgb([255, 199, 0]);
/// Hue 0.1, where the orange and banana bands overlap
pub const AMBER: Rgb<u8> = Rgb([255, 153, 0]);
/// Hue ~0.608, outside every fruit band
pub const BACKGROUND_BLUE: Rgb<u8> = Rgb([30, 90, 200]);

/// Solid background canvas
pub fn canvas(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, BACKGROUND_BLUE)
}

pub fn draw_disk(img: &mut RgbImage, center: (i32, i32), radius: i32, color: Rgb<u8>) {
    draw_filled_circle_mut(img, center, radius, color);
}

pub fn draw_rect(img: &mut RgbImage, x: i32, y: i32, width: u32, height: u32, color: Rgb<u8>) {
    draw_filled_rect_mut(img, Rect::at(x, y).of_size(width, height), color);
}

/// 200x200 canvas with one radius-60 disk in the middle
pub fn single_disk_image(color: Rgb<u8>) -> RgbImage {
    let mut img = canvas(200, 200);
    draw_disk(&mut img, (100, 100), 60, color);
    img
}

/// 400x200 canvas with two disjoint radius-60 disks
pub fn two_disk_image(color: Rgb<u8>) -> RgbImage {
    let mut img = canvas(400, 200);
    draw_disk(&mut img, (100, 100), 60, color);
    draw_disk(&mut img, (300, 100), 60, color);
    img
}

/// Save an image as PNG under `dir` and return its path
pub fn write_png(dir: &Path, name: &str, img: &RgbImage) -> PathBuf {
    let path = dir.join(name);
    img.save_with_format(&path, image::ImageFormat::Png)
        .expect("Failed to save test image");
    path
}

/// Save a single-channel PNG, which the detector must reject
pub fn write_gray_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    GrayImage::new(32, 32)
        .save_with_format(&path, image::ImageFormat::Png)
        .expect("Failed to save test image");
    path
}

pub fn set_pixels(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] == 255).count()
}

pub fn counts(apple: u32, banana: u32, orange: u32) -> FruitCounts {
    FruitCounts {
        apple,
        banana,
        orange,
    }
}

use std::fmt;

use image::GrayImage;
use imageproc::point::Point;
use serde::{Deserialize, Serialize};

/// The fruit categories the detector knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FruitKind {
    Apple,
    Banana,
    Orange,
}

impl FruitKind {
    pub const ALL: [FruitKind; 3] = [FruitKind::Apple, FruitKind::Banana, FruitKind::Orange];

    pub fn name(&self) -> &'static str {
        match self {
            FruitKind::Apple => "apple",
            FruitKind::Banana => "banana",
            FruitKind::Orange => "orange",
        }
    }

    /// Plural form used in output file names ("apples", ...)
    pub fn plural(&self) -> &'static str {
        match self {
            FruitKind::Apple => "apples",
            FruitKind::Banana => "bananas",
            FruitKind::Orange => "oranges",
        }
    }

    /// Color used to outline this fruit's contours in overlays
    pub fn overlay_color(&self) -> [u8; 3] {
        match self {
            FruitKind::Orange => [255, 0, 0],
            FruitKind::Apple => [0, 255, 0],
            FruitKind::Banana => [0, 0, 255],
        }
    }
}

impl fmt::Display for FruitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Closed hue interval `[lo, hi]`, both ends in [0, 1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct HueRange {
    pub lo: f32,
    pub hi: f32,
}

impl HueRange {
    pub const fn new(lo: f32, hi: f32) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, hue: f32) -> bool {
        hue >= self.lo && hue <= self.hi
    }
}

impl From<[f32; 2]> for HueRange {
    fn from([lo, hi]: [f32; 2]) -> Self {
        Self { lo, hi }
    }
}

impl From<HueRange> for [f32; 2] {
    fn from(range: HueRange) -> Self {
        [range.lo, range.hi]
    }
}

/// Per-image fruit counts. Every kind is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FruitCounts {
    pub apple: u32,
    pub banana: u32,
    pub orange: u32,
}

impl FruitCounts {
    pub fn get(&self, kind: FruitKind) -> u32 {
        match kind {
            FruitKind::Apple => self.apple,
            FruitKind::Banana => self.banana,
            FruitKind::Orange => self.orange,
        }
    }

    pub fn set(&mut self, kind: FruitKind, count: u32) {
        match kind {
            FruitKind::Apple => self.apple = count,
            FruitKind::Banana => self.banana = count,
            FruitKind::Orange => self.orange = count,
        }
    }
}

/// The three cleaned masks produced by one detection (0 or 255 per pixel)
#[derive(Debug, Clone, PartialEq)]
pub struct FruitMasks {
    pub orange: GrayImage,
    pub apple: GrayImage,
    pub banana: GrayImage,
}

impl FruitMasks {
    pub fn get(&self, kind: FruitKind) -> &GrayImage {
        match kind {
            FruitKind::Apple => &self.apple,
            FruitKind::Banana => &self.banana,
            FruitKind::Orange => &self.orange,
        }
    }
}

/// Output of [`crate::DetectionPipeline::detect`]
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub counts: FruitCounts,
    pub masks: FruitMasks,
}

/// Ordered boundary points of one region, as traced by marching squares.
/// Closed contours repeat their first point at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Point<f32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<f32>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.points.len() > 2 && self.points.first() == self.points.last()
    }

    /// Length of the polyline through all points
    pub fn perimeter(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| {
                let dx = (w[1].x - w[0].x) as f64;
                let dy = (w[1].y - w[0].y) as f64;
                (dx * dx + dy * dy).sqrt()
            })
            .sum()
    }

    /// Area of a disk with the same perimeter: P² / 4π
    pub fn isoperimetric_area(&self) -> f64 {
        let p = self.perimeter();
        p * p / (4.0 * std::f64::consts::PI)
    }

    /// Shoelace area; open contours are implicitly closed
    pub fn polygon_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: f64 = (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64
            })
            .sum();
        twice.abs() / 2.0
    }
}

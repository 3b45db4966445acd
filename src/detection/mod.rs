pub mod cleaning;
pub mod contours;
pub mod counting;
pub mod preprocessing;

use image::{DynamicImage, GrayImage, RgbImage};
use tracing::debug;

use crate::config::DetectionConfig;
use crate::error::Result;
use crate::models::{Contour, Detection, FruitCounts, FruitKind, FruitMasks};
pub use preprocessing::HsvImage;

/// Intermediate products of one fruit's pass over an image
#[derive(Debug, Clone)]
pub struct FruitAnalysis {
    pub kind: FruitKind,
    /// Raw hue-band mask (0 or 255)
    pub mask: GrayImage,
    /// Mask after thresholding and small-object removal
    pub cleaned: GrayImage,
    pub contours: Vec<Contour>,
    pub count: u32,
}

/// Main detection pipeline orchestrator.
///
/// Holds only configuration; `detect` is a pure function of the image and
/// that configuration, so one pipeline can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct DetectionPipeline {
    config: DetectionConfig,
}

impl DetectionPipeline {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Count apples, bananas and oranges in an RGB image
    pub fn detect(&self, img: &RgbImage) -> Result<Detection> {
        let hsv = preprocessing::to_hsv(img)?;

        let mut counts = FruitCounts::default();
        let [apple, banana, orange] = FruitKind::ALL.map(|kind| {
            let analysis = self.detect_fruit(&hsv, kind);
            counts.set(kind, analysis.count);
            analysis.cleaned
        });

        Ok(Detection {
            counts,
            masks: FruitMasks {
                orange,
                apple,
                banana,
            },
        })
    }

    /// Same as [`detect`](Self::detect) for a decoded image of unknown layout
    pub fn detect_dynamic(&self, img: &DynamicImage) -> Result<Detection> {
        let rgb = preprocessing::rgb_from_dynamic(img)?;
        self.detect(&rgb)
    }

    /// Run mask building, cleaning, contour tracing and counting for one fruit
    pub fn detect_fruit(&self, hsv: &HsvImage, kind: FruitKind) -> FruitAnalysis {
        let params = self.config.params(kind);

        let mask = preprocessing::hue_mask(hsv, params.hue_range);
        let cleaned = cleaning::clean_mask(&mask, self.config.min_object_size);
        let contours = contours::find_contours(&cleaned);
        let count = counting::count_fruit_contours(
            &contours,
            params.area_threshold,
            self.config.area_method,
        );

        debug!(
            fruit = %kind,
            contours = contours.len(),
            count,
            "fruit pass complete"
        );

        FruitAnalysis {
            kind,
            mask,
            cleaned,
            contours,
            count,
        }
    }

    /// All three fruit passes with their intermediates, for overlays and
    /// debug output
    pub fn analyze(&self, img: &RgbImage) -> Result<Vec<FruitAnalysis>> {
        let hsv = preprocessing::to_hsv(img)?;
        Ok(FruitKind::ALL
            .iter()
            .map(|&kind| self.detect_fruit(&hsv, kind))
            .collect())
    }
}

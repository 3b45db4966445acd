use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DetectionError, Result};
use crate::models::{FruitKind, HueRange};

/// How a contour's enclosed area is estimated before comparing it with the
/// fruit's area threshold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaMethod {
    /// Disk with the same perimeter, P² / 4π
    #[default]
    Isoperimetric,
    /// Shoelace area of the traced polygon
    Polygon,
}

/// Per-fruit segmentation and counting parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FruitParams {
    pub hue_range: HueRange,
    /// Minimum estimated area, in squared pixels, for a contour to count
    pub area_threshold: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    pub apple: FruitParams,
    pub banana: FruitParams,
    pub orange: FruitParams,
    /// Connected components smaller than this are dropped while cleaning
    pub min_object_size: u32,
    pub area_method: AreaMethod,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            apple: FruitParams {
                hue_range: HueRange::new(0.00, 0.05),
                area_threshold: 7000.0,
            },
            banana: FruitParams {
                hue_range: HueRange::new(0.09, 0.15),
                area_threshold: 8000.0,
            },
            orange: FruitParams {
                hue_range: HueRange::new(0.06, 0.12),
                area_threshold: 8000.0,
            },
            min_object_size: 100,
            area_method: AreaMethod::Isoperimetric,
        }
    }
}

impl DetectionConfig {
    pub fn params(&self, kind: FruitKind) -> &FruitParams {
        match kind {
            FruitKind::Apple => &self.apple,
            FruitKind::Banana => &self.banana,
            FruitKind::Orange => &self.orange,
        }
    }

    pub fn params_mut(&mut self, kind: FruitKind) -> &mut FruitParams {
        match kind {
            FruitKind::Apple => &mut self.apple,
            FruitKind::Banana => &mut self.banana,
            FruitKind::Orange => &mut self.orange,
        }
    }

    /// Load defaults and apply the overrides found in a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DetectionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let overrides: ConfigOverrides = serde_json::from_str(text)
            .map_err(|e| DetectionError::InvalidConfig(e.to_string()))?;
        Self::default().with_overrides(overrides)
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self> {
        for (kind, range) in overrides.hue_range {
            self.params_mut(kind).hue_range = range;
        }
        for (kind, threshold) in overrides.area_threshold {
            self.params_mut(kind).area_threshold = threshold;
        }
        if let Some(size) = overrides.min_object_size {
            self.min_object_size = size;
        }
        if let Some(method) = overrides.area_method {
            self.area_method = method;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        for kind in FruitKind::ALL {
            let params = self.params(kind);
            let HueRange { lo, hi } = params.hue_range;
            if !(0.0..1.0).contains(&lo) || !(0.0..1.0).contains(&hi) {
                return Err(DetectionError::InvalidConfig(format!(
                    "{kind} hue range [{lo}, {hi}] must lie within [0, 1)"
                )));
            }
            if lo > hi {
                return Err(DetectionError::InvalidConfig(format!(
                    "{kind} hue range [{lo}, {hi}] is reversed"
                )));
            }
            if !params.area_threshold.is_finite() || params.area_threshold < 0.0 {
                return Err(DetectionError::InvalidConfig(format!(
                    "{kind} area threshold {} must be a non-negative number",
                    params.area_threshold
                )));
            }
        }
        if self.min_object_size == 0 {
            return Err(DetectionError::InvalidConfig(
                "minObjectSize must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial configuration as read from a JSON file. Anything left out keeps
/// its default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(default)]
    pub hue_range: BTreeMap<FruitKind, HueRange>,
    #[serde(default)]
    pub area_threshold: BTreeMap<FruitKind, f64>,
    pub min_object_size: Option<u32>,
    pub area_method: Option<AreaMethod>,
}

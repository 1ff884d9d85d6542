//! Recognizer parameters
//!
//! Every constant the pipeline depends on lives here so tests and
//! re-calibrated deployments can override it. The defaults reproduce the
//! geometry and thresholds the shipped reference tables were built with.
//!
//! All parameter structs deserialize with `#[serde(default)]`, so a JSON
//! file only needs to name the fields it changes:
//!
//! ```
//! use capsolve_recog::SolverParams;
//!
//! let params = SolverParams::from_json_str(r#"{ "classify": { "min_gap": 8.0 } }"#).unwrap();
//! assert_eq!(params.classify.min_gap, 8.0);
//! assert_eq!(params.classify.max_distance, 100.0);
//! assert_eq!(params.code_length, 6);
//! ```

use crate::features::FEATURE_COUNT;
use crate::{RecogError, RecogResult};
use capsolve_core::Box;
use capsolve_core::pix::{LUMA709_BLUE_WEIGHT, LUMA709_GREEN_WEIGHT, LUMA709_RED_WEIGHT};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for [`crate::preprocess::clean`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessParams {
    /// Glyph band cut out of the difference image (default: 75,24 130x35)
    pub crop: Box,

    /// Contrast gain applied to `baseline - image` (default: 10.0)
    pub gain: f32,

    /// Samples below this become background, others ink (default: 50)
    pub threshold: u8,

    /// Red, green and blue weights for color to gray conversion
    /// (default: BT.709 luma)
    pub gray_weights: [f32; 3],
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            crop: Box::new_unchecked(75, 24, 130, 35),
            gain: 10.0,
            threshold: 50,
            gray_weights: [LUMA709_RED_WEIGHT, LUMA709_GREEN_WEIGHT, LUMA709_BLUE_WEIGHT],
        }
    }
}

impl PreprocessParams {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the glyph band
    pub fn with_crop(mut self, crop: Box) -> Self {
        self.crop = crop;
        self
    }

    /// Set the contrast gain
    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    /// Set the binarization threshold
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the gray conversion weights
    pub fn with_gray_weights(mut self, weights: [f32; 3]) -> Self {
        self.gray_weights = weights;
        self
    }

    /// Validate options
    pub fn validate(&self) -> RecogResult<()> {
        let c = &self.crop;
        if c.x < 0 || c.y < 0 || c.is_empty() {
            return Err(RecogError::InvalidParameter(format!(
                "crop must have a non-negative origin and non-zero size, got {:?}",
                c
            )));
        }
        if c.x.checked_add(c.w).is_none() || c.y.checked_add(c.h).is_none() {
            return Err(RecogError::InvalidParameter(format!(
                "crop extends past the largest image coordinate, got {:?}",
                c
            )));
        }
        if !self.gain.is_finite() || self.gain < 0.0 {
            return Err(RecogError::InvalidParameter(format!(
                "gain must be finite and >= 0.0, got {}",
                self.gain
            )));
        }
        if self.threshold == 0 {
            return Err(RecogError::InvalidParameter(
                "threshold must be between 1 and 255".to_string(),
            ));
        }
        if self
            .gray_weights
            .iter()
            .any(|w| !w.is_finite() || *w < 0.0)
            || self.gray_weights.iter().sum::<f32>() <= 0.0
        {
            return Err(RecogError::InvalidParameter(format!(
                "gray weights must be >= 0.0 with a positive sum, got {:?}",
                self.gray_weights
            )));
        }
        Ok(())
    }
}

/// Options for [`crate::features::extract`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureParams {
    /// Every region sum is divided by this constant (default: 256.0)
    ///
    /// This is a fixed scale, not a pixel count; reference tables are only
    /// comparable with features computed using the same divisor.
    pub divisor: f64,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self { divisor: 256.0 }
    }
}

impl FeatureParams {
    /// Set the region sum divisor
    pub fn with_divisor(mut self, divisor: f64) -> Self {
        self.divisor = divisor;
        self
    }

    /// Validate options
    pub fn validate(&self) -> RecogResult<()> {
        if !self.divisor.is_finite() || self.divisor <= 0.0 {
            return Err(RecogError::InvalidParameter(format!(
                "divisor must be finite and > 0.0, got {}",
                self.divisor
            )));
        }
        Ok(())
    }
}

/// Options for the nearest-neighbor classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyParams {
    /// Per-feature weights of the L1 distance (default: 1,2,2,2,4,3,3,3,3)
    pub weights: [f64; FEATURE_COUNT],

    /// A best match farther than this is ambiguous (default: 100.0)
    pub max_distance: f64,

    /// Best and runner-up closer than this are ambiguous (default: 5.0)
    pub min_gap: f64,
}

impl Default for ClassifyParams {
    fn default() -> Self {
        Self {
            weights: [1.0, 2.0, 2.0, 2.0, 4.0, 3.0, 3.0, 3.0, 3.0],
            max_distance: 100.0,
            min_gap: 5.0,
        }
    }
}

impl ClassifyParams {
    /// Set the distance weights
    pub fn with_weights(mut self, weights: [f64; FEATURE_COUNT]) -> Self {
        self.weights = weights;
        self
    }

    /// Set the absolute distance limit
    pub fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Set the minimum best/runner-up gap
    pub fn with_min_gap(mut self, min_gap: f64) -> Self {
        self.min_gap = min_gap;
        self
    }

    /// Validate options
    pub fn validate(&self) -> RecogResult<()> {
        if self.weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(RecogError::InvalidParameter(format!(
                "weights must be finite and >= 0.0, got {:?}",
                self.weights
            )));
        }
        if self.max_distance.is_nan() || self.max_distance < 0.0 {
            return Err(RecogError::InvalidParameter(format!(
                "max_distance must be >= 0.0, got {}",
                self.max_distance
            )));
        }
        if !self.min_gap.is_finite() || self.min_gap < 0.0 {
            return Err(RecogError::InvalidParameter(format!(
                "min_gap must be finite and >= 0.0, got {}",
                self.min_gap
            )));
        }
        Ok(())
    }
}

/// Complete solver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    pub preprocess: PreprocessParams,
    pub features: FeatureParams,
    pub classify: ClassifyParams,

    /// Number of glyphs a complete code has (default: 6)
    pub code_length: usize,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            preprocess: PreprocessParams::default(),
            features: FeatureParams::default(),
            classify: ClassifyParams::default(),
            code_length: 6,
        }
    }
}

impl SolverParams {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the preprocessing options
    pub fn with_preprocess(mut self, preprocess: PreprocessParams) -> Self {
        self.preprocess = preprocess;
        self
    }

    /// Set the feature options
    pub fn with_features(mut self, features: FeatureParams) -> Self {
        self.features = features;
        self
    }

    /// Set the classifier options
    pub fn with_classify(mut self, classify: ClassifyParams) -> Self {
        self.classify = classify;
        self
    }

    /// Set the expected code length
    pub fn with_code_length(mut self, code_length: usize) -> Self {
        self.code_length = code_length;
        self
    }

    /// Validate all nested options
    pub fn validate(&self) -> RecogResult<()> {
        self.preprocess.validate()?;
        self.features.validate()?;
        self.classify.validate()?;
        if self.code_length == 0 {
            return Err(RecogError::InvalidParameter(
                "code_length must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate parameters from JSON text.
    ///
    /// Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> RecogResult<Self> {
        let params: SolverParams = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Read and validate parameters from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> RecogResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .map_err(|e| RecogError::resource(format!("config {}", path.display()), e))?;
        Self::from_json_str(&data)
            .map_err(|e| RecogError::resource(format!("config {}", path.display()), e))
    }
}

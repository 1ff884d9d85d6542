//! Glyph feature extraction
//!
//! Each glyph is reduced to nine numbers. Apart from the width, every
//! feature is the sum of ink samples (0 or 255) over a region of the glyph
//! divided by a fixed constant ([`FeatureParams::divisor`]). The divisor is
//! a scale, not a pixel count, so narrow and wide glyphs are not
//! normalized against each other.
//!
//! For a glyph `n` columns wide and `h` rows tall the regions are:
//!
//! | Feature        | Columns            | Rows                  |
//! |----------------|--------------------|-----------------------|
//! | overall        | all                | all                   |
//! | vertical half  | `0..=n/2`          | all                   |
//! | top half       | all                | `0..t`, `t = ceil(h/2 + 1)` |
//! | bottom half    | all                | `t..h`                |
//! | width          | `n` itself         |                       |
//! | quadrants      | split at `n/2`     | split at `h/2`        |
//!
//! Quadrants are all 0 for glyphs narrower than two columns.

use crate::RecogResult;
use crate::params::FeatureParams;
use crate::segment::GlyphBitmap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Number of features per glyph
pub const FEATURE_COUNT: usize = 9;

/// Position of each feature in a [`FeatureVector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Overall = 0,
    VerticalHalf = 1,
    TopHalf = 2,
    BottomHalf = 3,
    Width = 4,
    TopLeft = 5,
    TopRight = 6,
    BottomLeft = 7,
    BottomRight = 8,
}

impl Feature {
    /// All features in vector order
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Overall,
        Feature::VerticalHalf,
        Feature::TopHalf,
        Feature::BottomHalf,
        Feature::Width,
        Feature::TopLeft,
        Feature::TopRight,
        Feature::BottomLeft,
        Feature::BottomRight,
    ];

    /// Short name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            Feature::Overall => "overall",
            Feature::VerticalHalf => "vertical_half",
            Feature::TopHalf => "top_half",
            Feature::BottomHalf => "bottom_half",
            Feature::Width => "width",
            Feature::TopLeft => "top_left",
            Feature::TopRight => "top_right",
            Feature::BottomLeft => "bottom_left",
            Feature::BottomRight => "bottom_right",
        }
    }
}

/// The nine-number descriptor of one glyph
///
/// Serializes as a plain JSON array, which is also the value format of
/// reference table files.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Create a vector from its nine values
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        FeatureVector(values)
    }

    /// Build a vector from a slice, which must hold exactly nine values.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        let values: [f64; FEATURE_COUNT] = values.try_into().ok()?;
        Some(FeatureVector(values))
    }

    /// The values in feature order
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    /// True if every value is finite
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl Index<Feature> for FeatureVector {
    type Output = f64;

    fn index(&self, feature: Feature) -> &f64 {
        &self.0[feature as usize]
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.3}", v)?;
        }
        write!(f, "]")
    }
}

/// Compute the feature vector of a glyph.
pub fn extract(glyph: &GlyphBitmap, params: &FeatureParams) -> RecogResult<FeatureVector> {
    params.validate()?;

    let n = glyph.width();
    let h = glyph.height();
    let avg = |x: u32, y: u32, w: u32, rows: u32| -> RecogResult<f64> {
        Ok(glyph.region_sum(x, y, w, rows)? as f64 / params.divisor)
    };

    let top_rows = ((h + 1) / 2 + 1).min(h);
    let mid_x = n / 2;
    let mid_y = h / 2;

    let mut v = [0.0; FEATURE_COUNT];
    v[Feature::Overall as usize] = avg(0, 0, n, h)?;
    v[Feature::VerticalHalf as usize] = avg(0, 0, (n / 2 + 1).min(n), h)?;
    v[Feature::TopHalf as usize] = avg(0, 0, n, top_rows)?;
    v[Feature::BottomHalf as usize] = avg(0, top_rows, n, h - top_rows)?;
    v[Feature::Width as usize] = n as f64;

    if n >= 2 {
        v[Feature::TopLeft as usize] = avg(0, 0, mid_x, mid_y)?;
        v[Feature::TopRight as usize] = avg(mid_x, 0, n - mid_x, mid_y)?;
        v[Feature::BottomLeft as usize] = avg(0, mid_y, mid_x, h - mid_y)?;
        v[Feature::BottomRight as usize] = avg(mid_x, mid_y, n - mid_x, h - mid_y)?;
    }

    Ok(FeatureVector(v))
}

/// Extract features of every glyph, preserving order.
pub fn extract_all(glyphs: &[GlyphBitmap], params: &FeatureParams) -> RecogResult<Vec<FeatureVector>> {
    glyphs.iter().map(|g| extract(g, params)).collect()
}

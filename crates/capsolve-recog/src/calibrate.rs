//! Reference table calibration
//!
//! Builds a [`ReferenceTable`] from images whose code is known. Every
//! sample is run through the same clean/segment/extract pipeline as
//! [`crate::Solver`]; samples that segment into exactly `code_length`
//! glyphs contribute glyph `k` to character `k` of their label. The table
//! entry of a character is the element-wise mean of its contributions.
//!
//! Means are computed from running sums and counts ([`CharAccumulator`]),
//! so partial results built from separate batches can be merged without
//! loss. Feature extraction runs in parallel but contributions are always
//! added in sample order, which makes the output bit-for-bit reproducible.

use crate::features::{FEATURE_COUNT, FeatureVector};
use crate::params::SolverParams;
use crate::preprocess::{check_contains_band, to_gray};
use crate::solver::evaluate;
use crate::table::ReferenceTable;
use crate::{RecogError, RecogResult};
use capsolve_core::Pix;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// An image with its known code
#[derive(Debug, Clone)]
pub struct LabeledSample {
    pub label: String,
    pub image: Pix,
}

impl LabeledSample {
    pub fn new(label: impl Into<String>, image: Pix) -> Self {
        Self {
            label: label.into(),
            image,
        }
    }
}

/// Running sum of the feature vectors seen for one character
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CharAccumulator {
    pub sum: [f64; FEATURE_COUNT],
    pub count: usize,
}

impl CharAccumulator {
    /// Add one observation
    pub fn add(&mut self, features: &FeatureVector) {
        for (s, v) in self.sum.iter_mut().zip(features.values()) {
            *s += v;
        }
        self.count += 1;
    }

    /// Add another accumulator's sums and counts
    pub fn merge(&mut self, other: &CharAccumulator) {
        for (s, v) in self.sum.iter_mut().zip(&other.sum) {
            *s += v;
        }
        self.count += other.count;
    }

    /// Element-wise mean, `None` before any observation
    pub fn mean(&self) -> Option<FeatureVector> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some(FeatureVector::new(self.sum.map(|s| s / n)))
    }
}

/// Per-character accumulators plus sample bookkeeping
#[derive(Debug, Clone, Default)]
pub struct Calibrator {
    chars: BTreeMap<char, CharAccumulator>,
    used: usize,
    skipped: usize,
}

impl Calibrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the glyph features of one sample.
    ///
    /// The sample is used only if it has exactly `code_length` glyphs and
    /// its label has at least `code_length` characters; extra label
    /// characters are ignored. Returns whether the sample was used.
    pub fn add_sample(&mut self, label: &str, features: &[FeatureVector], code_length: usize) -> bool {
        if features.len() != code_length {
            warn!(
                "skipping sample {:?}: {} glyphs, expected {}",
                label,
                features.len(),
                code_length
            );
            self.skipped += 1;
            return false;
        }
        let chars: Vec<char> = label.chars().take(code_length).collect();
        if chars.len() < code_length {
            warn!(
                "skipping sample {:?}: label shorter than {} characters",
                label, code_length
            );
            self.skipped += 1;
            return false;
        }

        for (ch, f) in chars.into_iter().zip(features) {
            self.chars.entry(ch).or_default().add(f);
        }
        self.used += 1;
        true
    }

    /// Count a sample that could not be processed at all
    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    /// Fold another calibrator into this one
    pub fn merge(&mut self, other: &Calibrator) {
        for (ch, acc) in &other.chars {
            self.chars.entry(*ch).or_default().merge(acc);
        }
        self.used += other.used;
        self.skipped += other.skipped;
    }

    /// Accumulator of one character
    pub fn get(&self, ch: char) -> Option<&CharAccumulator> {
        self.chars.get(&ch)
    }

    /// Number of samples used
    pub fn used(&self) -> usize {
        self.used
    }

    /// Number of samples skipped
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Compute the mean table.
    ///
    /// # Errors
    /// [`RecogError::InvalidTable`] if no sample was used.
    pub fn finish(&self, name: impl Into<String>) -> RecogResult<CalibrationReport> {
        let mut table = ReferenceTable::new(name);
        for (&ch, acc) in &self.chars {
            if let Some(mean) = acc.mean() {
                table.insert(ch, mean);
            }
        }
        if table.is_empty() {
            return Err(RecogError::InvalidTable(format!(
                "{}: no usable calibration samples ({} skipped)",
                table.name(),
                self.skipped
            )));
        }
        info!(
            "calibrated {} table: {} characters from {} samples ({} skipped)",
            table.name(),
            table.len(),
            self.used,
            self.skipped
        );
        Ok(CalibrationReport {
            table,
            used: self.used,
            skipped: self.skipped,
        })
    }
}

/// Result of a calibration run
#[derive(Debug, Clone)]
pub struct CalibrationReport {
    pub table: ReferenceTable,
    /// Samples that contributed to the table
    pub used: usize,
    /// Samples rejected for glyph count, label or load failures
    pub skipped: usize,
}

fn prepare_baseline(baseline: &Pix, params: &SolverParams) -> RecogResult<Pix> {
    params.validate()?;
    let baseline = to_gray(baseline, &params.preprocess)?;
    check_contains_band(&baseline, &params.preprocess)?;
    Ok(baseline)
}

/// Accumulate samples without finishing the table.
///
/// Use this with [`Calibrator::merge`] to combine several corpora.
pub fn accumulate(samples: &[LabeledSample], baseline: &Pix, params: &SolverParams) -> RecogResult<Calibrator> {
    let baseline = prepare_baseline(baseline, params)?;

    let features: Vec<RecogResult<Vec<FeatureVector>>> = samples
        .par_iter()
        .map(|s| evaluate(&s.image, &baseline, params))
        .collect();

    let mut calibrator = Calibrator::new();
    for (sample, result) in samples.iter().zip(features) {
        match result {
            Ok(f) => {
                calibrator.add_sample(&sample.label, &f, params.code_length);
            }
            Err(e) => {
                warn!("skipping sample {:?}: {}", sample.label, e);
                calibrator.skip();
            }
        }
    }
    Ok(calibrator)
}

/// Build a reference table from labeled images.
pub fn calibrate(
    samples: &[LabeledSample],
    baseline: &Pix,
    params: &SolverParams,
    name: &str,
) -> RecogResult<CalibrationReport> {
    accumulate(samples, baseline, params)?.finish(name)
}

/// Build a reference table from a directory of labeled images.
///
/// Each file's stem is its label (`A1B2C3.png` is labeled `A1B2C3`).
/// Files are processed in name order; files that cannot be decoded are
/// skipped with a warning.
pub fn calibrate_dir<P: AsRef<Path>>(
    dir: P,
    baseline: &Pix,
    params: &SolverParams,
    name: &str,
) -> RecogResult<CalibrationReport> {
    let dir = dir.as_ref();
    let baseline = prepare_baseline(baseline, params)?;

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| RecogError::resource(format!("corpus {}", dir.display()), e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    paths.sort();
    debug!("calibrating from {} files in {}", paths.len(), dir.display());

    let results: Vec<(String, RecogResult<Vec<FeatureVector>>)> = paths
        .par_iter()
        .map(|path| {
            let label = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let features = capsolve_io::read_image(path)
                .map_err(|source| RecogError::Decode {
                    path: path.clone(),
                    source,
                })
                .and_then(|image| evaluate(&image, &baseline, params));
            (label, features)
        })
        .collect();

    let mut calibrator = Calibrator::new();
    for (label, result) in results {
        match result {
            Ok(f) => {
                calibrator.add_sample(&label, &f, params.code_length);
            }
            Err(e) => {
                warn!("skipping {:?}: {}", label, e);
                calibrator.skip();
            }
        }
    }
    calibrator.finish(name)
}

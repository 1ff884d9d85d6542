//! End-to-end code reading
//!
//! [`Solver`] owns everything that stays fixed between calls (the gray
//! baseline, the reference tables, the parameters) and runs the full
//! pipeline on each image:
//!
//! ```text
//! image -> clean -> segment -> extract -> classify_sequence -> SolveReport
//! ```
//!
//! A solver holds no per-call state, so one instance can serve any number
//! of threads at once.
//!
//! # Example
//!
//! ```no_run
//! use capsolve_recog::{Solver, SolverParams};
//!
//! let solver = Solver::from_files(
//!     "assets/empty.png",
//!     &[("bold", "data/bold.json"), ("slim", "data/slim.json")],
//!     SolverParams::default(),
//! )
//! .unwrap();
//! let report = solver.solve_file("captcha.png").unwrap();
//! println!("{} (via {} table)", report.result, report.table);
//! ```

use crate::classify::{SolveReport, classify_sequence};
use crate::features::{FeatureVector, extract_all};
use crate::params::SolverParams;
use crate::preprocess::{check_contains_band, clean, to_gray};
use crate::segment::segment;
use crate::table::{ReferenceTable, ReferenceTables};
use crate::{RecogError, RecogResult};
use capsolve_core::Pix;
use log::debug;
use std::path::Path;

/// Run clean, segment and extract on one image.
///
/// This is the feature half of the pipeline shared by [`Solver`] and
/// calibration.
pub fn evaluate(image: &Pix, baseline: &Pix, params: &SolverParams) -> RecogResult<Vec<FeatureVector>> {
    let band = clean(image, baseline, &params.preprocess)?;
    let glyphs = segment(&band)?;
    extract_all(&glyphs, &params.features)
}

/// Reads codes from images
#[derive(Debug, Clone)]
pub struct Solver {
    baseline: Pix,
    tables: ReferenceTables,
    params: SolverParams,
}

impl Solver {
    /// Create a solver from already loaded resources.
    ///
    /// # Errors
    /// - [`RecogError::InvalidParameter`] if `params` do not validate
    /// - [`RecogError::ImageTooSmall`] if the baseline cannot hold the band
    /// - [`RecogError::Resource`] if there is no table or a table is empty
    pub fn new(baseline: Pix, tables: ReferenceTables, params: SolverParams) -> RecogResult<Self> {
        params.validate()?;

        if tables.is_empty() {
            return Err(RecogError::Resource {
                what: "reference tables".to_string(),
                message: "at least one table is required".to_string(),
            });
        }
        if let Some(empty) = tables.iter().find(|t| t.is_empty()) {
            return Err(RecogError::Resource {
                what: format!("{} table", empty.name()),
                message: "table has no entries".to_string(),
            });
        }

        let baseline = to_gray(&baseline, &params.preprocess)?;
        check_contains_band(&baseline, &params.preprocess)?;

        Ok(Self {
            baseline,
            tables,
            params,
        })
    }

    /// Load the baseline image and the named tables from disk.
    ///
    /// Tables are tried in the order given. Every failure to load a
    /// resource is reported as [`RecogError::Resource`].
    pub fn from_files<B, P>(baseline: B, tables: &[(&str, P)], params: SolverParams) -> RecogResult<Self>
    where
        B: AsRef<Path>,
        P: AsRef<Path>,
    {
        let baseline_path = baseline.as_ref();
        let baseline = capsolve_io::read_image(baseline_path).map_err(|e| {
            RecogError::resource(format!("baseline image {}", baseline_path.display()), e)
        })?;

        let mut loaded = ReferenceTables::new();
        for (name, path) in tables {
            let table = ReferenceTable::from_json_file(*name, path).map_err(|e| match e {
                RecogError::InvalidTable(msg) => {
                    RecogError::resource(format!("{} table {}", name, path.as_ref().display()), msg)
                }
                other => other,
            })?;
            loaded.push(table);
        }

        Self::new(baseline, loaded, params)
    }

    /// The gray baseline image
    pub fn baseline(&self) -> &Pix {
        &self.baseline
    }

    /// Tables in retry order
    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    /// Active parameters
    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    /// Cleaned binary glyph band of an image
    pub fn clean(&self, image: &Pix) -> RecogResult<Pix> {
        clean(image, &self.baseline, &self.params.preprocess)
    }

    /// Feature vectors of every glyph in an image, left to right
    pub fn evaluate(&self, image: &Pix) -> RecogResult<Vec<FeatureVector>> {
        evaluate(image, &self.baseline, &self.params)
    }

    /// Read the code in a decoded image.
    pub fn solve_pix(&self, image: &Pix) -> RecogResult<SolveReport> {
        let features = self.evaluate(image)?;
        let report = classify_sequence(
            &features,
            &self.tables,
            &self.params.classify,
            self.params.code_length,
        )?;
        debug!(
            "solved {:?} via {} table after {} attempt(s)",
            report.result, report.table, report.attempts
        );
        Ok(report)
    }

    /// Read the code in an image file.
    ///
    /// # Errors
    /// [`RecogError::Decode`] if the file cannot be read or decoded.
    pub fn solve_file<P: AsRef<Path>>(&self, path: P) -> RecogResult<SolveReport> {
        let path = path.as_ref();
        let image = capsolve_io::read_image(path).map_err(|source| RecogError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        self.solve_pix(&image)
    }

    /// Read the code in an encoded image held in memory.
    ///
    /// # Errors
    /// [`RecogError::Decode`] if the bytes cannot be decoded.
    pub fn solve_bytes(&self, data: &[u8]) -> RecogResult<SolveReport> {
        let image = capsolve_io::read_image_mem(data).map_err(|source| RecogError::Decode {
            path: "<memory>".into(),
            source,
        })?;
        self.solve_pix(&image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_COUNT;
    use capsolve_core::{PixMut, PixelDepth};

    fn blank(w: u32, h: u32) -> Pix {
        let mut pix = PixMut::new(w, h, PixelDepth::Bit8).unwrap();
        pix.set_all_gray(200).unwrap();
        pix.into()
    }

    fn one_entry_tables() -> ReferenceTables {
        ReferenceTables::new()
            .with_table(ReferenceTable::new("bold").with_entry('a', FeatureVector::new([0.0; FEATURE_COUNT])))
    }

    #[test]
    fn test_new_validates_resources() {
        let params = SolverParams::default();
        assert!(matches!(
            Solver::new(blank(250, 80), ReferenceTables::new(), params.clone()),
            Err(RecogError::Resource { .. })
        ));
        let with_empty = one_entry_tables().with_table(ReferenceTable::new("slim"));
        assert!(matches!(
            Solver::new(blank(250, 80), with_empty, params.clone()),
            Err(RecogError::Resource { .. })
        ));
        assert!(matches!(
            Solver::new(blank(100, 50), one_entry_tables(), params.clone()),
            Err(RecogError::ImageTooSmall { .. })
        ));
        assert!(matches!(
            Solver::new(blank(250, 80), one_entry_tables(), params.with_code_length(0)),
            Err(RecogError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_blank_image_has_no_glyphs() {
        let solver = Solver::new(blank(250, 80), one_entry_tables(), SolverParams::default()).unwrap();
        assert!(solver.evaluate(&blank(250, 80)).unwrap().is_empty());
        let report = solver.solve_pix(&blank(250, 80)).unwrap();
        assert_eq!(report.result.kind(), crate::ResultKind::InvalidLength);
        assert_eq!(report.result.text(), "");
        assert_eq!(report.glyphs, 0);
    }

    #[test]
    fn test_decode_errors() {
        let solver = Solver::new(blank(250, 80), one_entry_tables(), SolverParams::default()).unwrap();
        assert!(matches!(
            solver.solve_bytes(b"definitely not an image"),
            Err(RecogError::Decode { .. })
        ));
        assert!(matches!(
            solver.solve_file("/nonexistent/captcha.png"),
            Err(RecogError::Decode { .. })
        ));
    }

    #[test]
    fn test_from_files_missing_resources() {
        let missing = Solver::from_files(
            "/nonexistent/empty.png",
            &[("bold", "/nonexistent/bold.json")],
            SolverParams::default(),
        );
        assert!(matches!(missing, Err(RecogError::Resource { .. })));
    }

    #[test]
    fn test_solver_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Solver>();
    }
}

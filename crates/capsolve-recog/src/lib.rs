//! capsolve-recog - Reading fixed-layout six-character codes
//!
//! Recognizes the code rendered in a noisy, fixed-layout image with
//! hand-built glyph statistics instead of a trained model:
//!
//! - **Preprocessing**: subtract a blank baseline, amplify, binarize, crop
//! - **Segmentation**: split the glyph band at empty columns
//! - **Features**: nine region statistics per glyph
//! - **Classification**: weighted nearest neighbor with a confidence gate,
//!   retried per image over an ordered list of font-variant tables
//! - **Calibration**: build the reference tables from labeled images
//!
//! # Quick Start
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
//!
//! let report = solver.solve_file("captcha.png").unwrap();
//! if report.result.is_success() {
//!     println!("code: {}", report.result.text());
//! }
//! ```
//!
//! # Modules
//!
//! - [`preprocess`]: background removal and binarization
//! - [`segment`]: glyph segmentation
//! - [`features`]: feature extraction
//! - [`table`]: reference tables and their JSON format
//! - [`classify`]: distance, confidence gate and table fallback
//! - [`calibrate`]: reference table construction
//! - [`solver`]: the end-to-end pipeline

pub mod calibrate;
pub mod classify;
mod error;
pub mod features;
pub mod params;
pub mod preprocess;
pub mod segment;
pub mod solver;
pub mod table;

pub use error::{RecogError, RecogResult};

// Re-export commonly used types
pub use calibrate::{CalibrationReport, Calibrator, LabeledSample, calibrate, calibrate_dir};
pub use classify::{GlyphMatch, Match, ResultKind, SolveReport, SolveResult};
pub use features::{FEATURE_COUNT, Feature, FeatureVector};
pub use params::{ClassifyParams, FeatureParams, PreprocessParams, SolverParams};
pub use segment::GlyphBitmap;
pub use solver::Solver;
pub use table::{ReferenceTable, ReferenceTables};

// Re-export core for convenience
pub use capsolve_core;

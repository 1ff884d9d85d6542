//! capsolve - Reading six-character codes from noisy images
//!
//! Recognizes the code drawn in a fixed-layout image by subtracting a
//! blank background, cutting the glyph band into characters and matching
//! simple per-glyph statistics against calibrated reference tables. No
//! trained model is involved.
//!
//! # Overview
//!
//! - Image container and pixel operations ([`Pix`], [`PixMut`])
//! - Image I/O (PNG, JPEG, PGM/PPM) in [`io`]
//! - Segmentation, features, classification and calibration in [`recog`]
//!
//! # Example
//!
//! ```
//! use capsolve::recog::{ReferenceTable, ReferenceTables, Solver, SolverParams};
//! use capsolve::{Pix, PixelDepth};
//!
//! let baseline = Pix::new(250, 80, PixelDepth::Bit8).unwrap();
//! let table = ReferenceTable::from_json_str("bold", r#"{"A": [0,0,0,0,1,0,0,0,0]}"#).unwrap();
//! let solver = Solver::new(baseline, ReferenceTables::new().with_table(table), SolverParams::default()).unwrap();
//!
//! // nothing differs from the baseline, so there are no glyphs
//! let report = solver.solve_pix(solver.baseline()).unwrap();
//! assert!(!report.result.is_success());
//! ```

// Re-export core types (primary data structures used everywhere)
pub use capsolve_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use capsolve_io as io;
pub use capsolve_recog as recog;

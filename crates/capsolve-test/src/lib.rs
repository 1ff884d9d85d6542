//! capsolve-test - Regression test framework for capsolve
//!
//! Provides [`RegParams`], which collects the outcome of many comparisons
//! in one test and reports all failures at the end, and [`synth`], which
//! draws the images the recognizer is tested on. No binary test assets are
//! checked in; every image is generated.
//!
//! # Usage
//!
//! ```
//! use capsolve_test::RegParams;
//!
//! let mut rp = RegParams::new("segment");
//! rp.compare_values(6.0, 6.0, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: set to "display" to also write intermediate images to
//!   `tests/regout` for inspection

mod error;
mod params;
pub mod synth;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // capsolve-test is at crates/capsolve-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}

/// Create a fresh scratch directory for one test.
///
/// The directory lives under the system temp dir and is emptied first, so
/// tests that write corpora or tables do not see each other's files.
pub fn scratch_dir(name: &str) -> TestResult<std::path::PathBuf> {
    let dir = std::env::temp_dir().join(format!("capsolve_{}_{}", name, std::process::id()));
    if dir.exists() {
        std::fs::remove_dir_all(&dir)?;
    }
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

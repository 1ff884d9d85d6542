//! Error types for capsolve-recog

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while configuring or running the recognizer
///
/// Ambiguous glyphs and wrong glyph counts are not errors; they are
/// reported through [`crate::SolveResult`].
#[derive(Debug, Error)]
pub enum RecogError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] capsolve_core::Error),

    /// The source image could not be read or decoded
    #[error("failed to decode image '{}': {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: capsolve_io::IoError,
    },

    /// A resource the solver needs at startup is missing or unusable
    #[error("failed to load {what}: {message}")]
    Resource { what: String, message: String },

    /// Reference table data is malformed
    #[error("invalid reference table: {0}")]
    InvalidTable(String),

    /// Image does not contain the configured crop band
    #[error(
        "image too small: minimum size is {min_width}x{min_height}, got {actual_width}x{actual_height}"
    )]
    ImageTooSmall {
        min_width: u32,
        min_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// Source image and baseline differ in size
    #[error("image size {actual_width}x{actual_height} does not match baseline {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// Invalid parameter provided
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RecogError {
    pub(crate) fn resource(what: impl Into<String>, err: impl std::fmt::Display) -> Self {
        RecogError::Resource {
            what: what.into(),
            message: err.to_string(),
        }
    }
}

/// Result type for recognition operations
pub type RecogResult<T> = Result<T, RecogError>;

//! Error types for i2f-io

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Fatal conditions of a conversion run.
///
/// Non-fatal findings (unknown configuration keys, set names absent from
/// the mesh, mid-file dimensionality changes) are not errors; they are
/// logged and the run continues.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("format error at line {line}: {message}")]
    Format { line: usize, message: String },

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

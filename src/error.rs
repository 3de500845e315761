//! Error types for encoding, model loading and prediction.

use std::path::PathBuf;
use thiserror::Error;

/// Raised while turning a `RawOrderInput` into a `FeatureVector`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    /// Categorical value outside the field's fixed option set
    #[error("unknown {field} category: {value:?}")]
    UnknownCategory { field: &'static str, value: String },

    /// Numeric field outside the range the input widgets allow
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

/// Raised by `load_model`. A failed load ends the session.
#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("model artifact not found at {0}")]
    Missing(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupted model artifact {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("model schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),

    #[error("warm-up forward failed: {0}")]
    Warmup(#[from] PredictionError),
}

/// Raised by `predict`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("feature length mismatch: got {got}, expected {expected}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model returned a non-finite estimate: {0}")]
    NonFinite(f64),
}

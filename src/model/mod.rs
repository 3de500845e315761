//! Model loading and the `predict` contract.
//!
//! The artifact is opaque: anything that maps 37 floats to one float can sit
//! behind `Regressor`. The handle is built once at startup and only read
//! afterwards.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{ModelLoadError, PredictionError};
use crate::schema::{self, FEATURE_LEN};
use crate::types::{FeatureVector, PredictionResult};

pub mod forest;
#[cfg(feature = "torch")]
pub mod torch;

pub use forest::ForestModel;

/// Black-box regression backend.
pub trait Regressor: Send + Sync {
    /// Input width the backend was trained on.
    fn in_dim(&self) -> usize;

    fn forward(&self, x: &[f32]) -> Result<f64, PredictionError>;
}

/// Sidecar written next to the artifact by the training job.
#[derive(Deserialize)]
struct MetaJson {
    feat_list: Vec<String>,
    in_dim: Option<usize>,
    schema_version: Option<u32>,
}

/// A loaded model. Immutable once built.
pub struct ModelHandle {
    backend: Box<dyn Regressor>,
    source: PathBuf,
}

impl ModelHandle {
    /// Wrap an already constructed backend.
    pub fn new(backend: Box<dyn Regressor>, source: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            source: source.into(),
        }
    }

    pub fn in_dim(&self) -> usize {
        self.backend.in_dim()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("source", &self.source)
            .field("in_dim", &self.in_dim())
            .finish()
    }
}

fn read_meta(meta_path: &Path) -> Result<MetaJson, ModelLoadError> {
    if !meta_path.exists() {
        return Err(ModelLoadError::Missing(meta_path.to_path_buf()));
    }
    let txt = std::fs::read_to_string(meta_path).map_err(|source| ModelLoadError::Io {
        path: meta_path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&txt).map_err(|e| ModelLoadError::Corrupt {
        path: meta_path.to_path_buf(),
        reason: format!("failed to parse meta.json: {}", e),
    })
}

fn open_backend(path: &Path) -> Result<Box<dyn Regressor>, ModelLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "json" => Ok(Box::new(ForestModel::load(path)?)),
        #[cfg(feature = "torch")]
        "pt" | "ts" => Ok(Box::new(torch::TorchModel::load(path, FEATURE_LEN)?)),
        #[cfg(not(feature = "torch"))]
        "pt" | "ts" => Err(ModelLoadError::UnsupportedFormat(
            "TorchScript models need the `torch` feature".into(),
        )),
        other => Err(ModelLoadError::UnsupportedFormat(format!(
            "unrecognised model extension {:?}",
            other
        ))),
    }
}

/// Load the model artifact at `path`, checking it against the feature schema.
///
/// `meta_path`, when given, names a `meta.json` whose `feat_list` must equal
/// `schema::feature_names()` exactly.
pub fn load_model(path: &Path, meta_path: Option<&Path>) -> Result<ModelHandle, ModelLoadError> {
    if !path.exists() {
        return Err(ModelLoadError::Missing(path.to_path_buf()));
    }

    if let Some(meta_path) = meta_path {
        let meta = read_meta(meta_path)?;
        schema::check_feature_list(&meta.feat_list, meta.schema_version)?;
        if let Some(in_dim) = meta.in_dim {
            if in_dim != FEATURE_LEN {
                return Err(ModelLoadError::SchemaMismatch(format!(
                    "meta.in_dim is {}, expected {}",
                    in_dim, FEATURE_LEN
                )));
            }
        }
    }

    let backend = open_backend(path)?;
    if backend.in_dim() != FEATURE_LEN {
        return Err(ModelLoadError::SchemaMismatch(format!(
            "model expects {} inputs, encoder produces {}",
            backend.in_dim(),
            FEATURE_LEN
        )));
    }

    // Warm-up so a broken artifact fails here rather than on the first request
    backend.forward(&[0.0; FEATURE_LEN])?;

    tracing::info!(path = %path.display(), in_dim = FEATURE_LEN, "model loaded");
    Ok(ModelHandle::new(backend, path))
}

/// Run one feature vector through the model.
pub fn predict(handle: &ModelHandle, vector: &FeatureVector) -> Result<PredictionResult, PredictionError> {
    let expected = handle.in_dim();
    if vector.len() != expected {
        return Err(PredictionError::ShapeMismatch {
            expected,
            got: vector.len(),
        });
    }

    let y = handle.backend.forward(vector.as_slice())?;
    if !y.is_finite() {
        return Err(PredictionError::NonFinite(y));
    }
    if y < 0.0 {
        tracing::warn!(estimate = y, "model returned a negative estimate; clamping to 0");
        return Ok(PredictionResult(0.0));
    }
    Ok(PredictionResult(y))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(f64);

    impl Regressor for Constant {
        fn in_dim(&self) -> usize {
            FEATURE_LEN
        }
        fn forward(&self, _x: &[f32]) -> Result<f64, PredictionError> {
            Ok(self.0)
        }
    }

    fn zeros() -> FeatureVector {
        FeatureVector(vec![0.0; FEATURE_LEN])
    }

    #[test]
    fn predict_passes_through_estimate() {
        let h = ModelHandle::new(Box::new(Constant(37.5)), "const");
        assert_eq!(predict(&h, &zeros()).unwrap().minutes(), 37.5);
    }

    #[test]
    fn predict_clamps_negative_and_rejects_nan() {
        let h = ModelHandle::new(Box::new(Constant(-3.0)), "const");
        assert_eq!(predict(&h, &zeros()).unwrap().minutes(), 0.0);

        let h = ModelHandle::new(Box::new(Constant(f64::NAN)), "const");
        assert!(matches!(predict(&h, &zeros()), Err(PredictionError::NonFinite(_))));
    }

    #[test]
    fn predict_checks_width_before_calling_backend() {
        let h = ModelHandle::new(Box::new(Constant(1.0)), "const");
        let short = FeatureVector(vec![0.0; 36]);
        assert_eq!(
            predict(&h, &short),
            Err(PredictionError::ShapeMismatch { expected: 37, got: 36 })
        );
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.pkl");
        std::fs::write(&path, b"\x80\x04").unwrap();
        assert!(matches!(
            load_model(&path, None),
            Err(ModelLoadError::UnsupportedFormat(_))
        ));
    }
}

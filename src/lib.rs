//! Delivery-time estimation service.
//!
//! Order attributes come in as a `RawOrderInput`, the encoder turns them into
//! the 37-column vector the trained regressor expects, and `predict` runs it
//! through the model loaded once at startup.

pub mod config;
pub mod eda;
pub mod encoder;
pub mod error;
pub mod model;
pub mod schema;
pub mod server;
pub mod types;

pub use encoder::{build_feature_vector, derive_temporal_parts, one_hot_encode};
pub use error::{EncodeError, ModelLoadError, PredictionError};
pub use model::{load_model, predict, ModelHandle, Regressor};
pub use types::{FeatureVector, PredictionResult, RawOrderInput, TemporalParts};

//! HTTP surface: menu, option sets, prediction and the EDA charts.

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::{path::PathBuf, sync::Arc};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::eda::{self, EdaSection, EDA_SECTIONS};
use crate::encoder::build_feature_vector;
use crate::model::{load_model, predict, ModelHandle};
use crate::schema;
use crate::types::RawOrderInput;

pub const PAGE_TITLE: &str = "Amazon Delivery Time Predictor";
pub const MENU: [&str; 2] = ["Delivery Time Prediction", "EDA"];

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ModelHandle>,
    pub assets_dir: Arc<PathBuf>,
    pub log_predictions: bool,
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, e: impl std::fmt::Display) -> ApiError {
    (status, Json(json!({ "error": e.to_string() })))
}

#[derive(Serialize)]
pub struct PredictResponse {
    pub minutes: f64,
    pub message: String,
}

#[derive(Serialize)]
struct EdaEntry {
    #[serde(flatten)]
    section: EdaSection,
    url: String,
}

/// Summary logged per request when `log_predictions` is on.
struct FeatureVectorStats {
    nonzero: usize,
    mean: f32,
    std: f32,
}

impl FeatureVectorStats {
    fn of(v: &[f32]) -> Self {
        let nonzero = v.iter().filter(|x| **x != 0.0).count();
        let mean = if v.is_empty() { 0.0 } else { v.iter().sum::<f32>() / (v.len() as f32) };
        let std = if v.len() < 2 {
            0.0
        } else {
            (v.iter().map(|x| (x - mean) * (x - mean)).sum::<f32>() / (v.len() as f32)).sqrt()
        };
        Self { nonzero, mean, std }
    }
}

async fn index() -> Json<Value> {
    Json(json!({
        "title": PAGE_TITLE,
        "menu": MENU,
        "default_index": 0,
    }))
}

async fn options() -> Json<Value> {
    Json(json!({
        "weather": schema::WEATHER_OPTIONS,
        "traffic": schema::TRAFFIC_OPTIONS,
        "vehicle": schema::VEHICLE_OPTIONS,
        "area": schema::AREA_OPTIONS,
        "category": schema::CATEGORY_OPTIONS,
        "distance_km": { "min": 0.1, "step": 0.1 },
        "agent_age": { "min": 18, "step": 1 },
        "agent_rating": { "min": 0.0, "max": 5.0, "step": 0.1 },
        "schema_version": schema::SCHEMA_VERSION,
    }))
}

async fn predict_handler(
    State(state): State<AppState>,
    payload: Result<Json<RawOrderInput>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    // bad dates and times surface here, before the encoder sees them
    let Json(raw) = payload.map_err(|rejection| api_error(rejection.status(), rejection.body_text()))?;
    let vector =
        build_feature_vector(&raw).map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e))?;

    if state.log_predictions {
        let stats = FeatureVectorStats::of(vector.as_slice());
        let names = schema::feature_names();
        let sample: Vec<String> = names
            .iter()
            .zip(vector.as_slice())
            .take(6)
            .map(|(name, x)| format!("{}={:.3}", name, x))
            .collect();
        tracing::info!(
            "recv in_dim={} nonzero={} mean={:.3} std={:.3} sample=[{}]",
            vector.len(),
            stats.nonzero,
            stats.mean,
            stats.std,
            sample.join(", ")
        );
    }

    let result = predict(&state.model, &vector).map_err(|e| {
        tracing::error!("prediction failed: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e)
    })?;

    Ok(Json(PredictResponse {
        minutes: result.minutes(),
        message: result.to_string(),
    }))
}

async fn eda_index() -> Json<Vec<EdaEntry>> {
    Json(
        EDA_SECTIONS
            .iter()
            .map(|s| EdaEntry {
                section: *s,
                url: format!("/eda/{}", s.file),
            })
            .collect(),
    )
}

async fn eda_image(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    let section = eda::find(&file)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("no chart named {}", file)))?;

    let path = state.assets_dir.join(section.file);
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        tracing::warn!("failed to read {}: {}", path.display(), e);
        api_error(StatusCode::NOT_FOUND, format!("chart {} unavailable", file))
    })?;

    Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/options", get(options))
        .route("/predict", post(predict_handler))
        .route("/eda", get(eda_index))
        .route("/eda/:file", get(eda_image))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Load the model, then serve until shutdown.
///
/// A model that fails to load returns before any socket is bound.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let model = load_model(&cfg.model_path, cfg.meta_path.as_deref())
        .context("Error loading model. Please check the file integrity.")?;

    let state = AppState {
        model: Arc::new(model),
        assets_dir: Arc::new(cfg.assets_dir.clone()),
        log_predictions: cfg.log_predictions,
    };

    let addr = cfg.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

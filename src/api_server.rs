// Axum API Server Module
//
// Purpose: REST API in front of the crop recommender
// Endpoints: POST /predict, GET /health, GET /api/crops, GET /api/crops/:name

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::catalogue;
use crate::model::{CropModel, ModelArtifact};
use crate::recommender::{PredictionRequest, PredictionResponse, RecommendError, Recommender};

// ============================================================================
// Application State
// ============================================================================

/// Cache key for a prediction request (floats compared by bit pattern)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    features: [u64; 7],
    season: String,
}

impl From<&PredictionRequest> for RequestKey {
    fn from(req: &PredictionRequest) -> Self {
        RequestKey {
            features: [
                req.n.to_bits(),
                req.p.to_bits(),
                req.k.to_bits(),
                req.ph.to_bits(),
                req.annual_temp.to_bits(),
                req.annual_humidity.to_bits(),
                req.annual_rainfall.to_bits(),
            ],
            season: req.season.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub recommender: Recommender,
    /// Predictions are pure, so responses can be reused for repeated inputs
    pub cache: Cache<RequestKey, PredictionResponse>,
}

impl AppState {
    pub fn new(model: Arc<dyn CropModel>, cache_capacity: u64, cache_ttl: Duration) -> Self {
        tracing::info!(
            "Initializing Moka cache ({} entries, {:?} TTL)...",
            cache_capacity,
            cache_ttl
        );
        let cache = Cache::builder()
            .max_capacity(cache_capacity)
            .time_to_live(cache_ttl)
            .build();

        Self {
            recommender: Recommender::new(model),
            cache,
        }
    }

    /// Load the model artifact once and build shared state around it
    pub fn from_model_path(
        model_path: &str,
        cache_capacity: u64,
        cache_ttl: Duration,
    ) -> anyhow::Result<Self> {
        tracing::info!("Loading crop model from {}...", model_path);
        let model = ModelArtifact::load(std::path::Path::new(model_path))?;

        Ok(Self::new(Arc::new(model), cache_capacity, cache_ttl))
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Recommendation
        .route("/predict", post(predict))

        // Crop catalogue
        .route("/api/crops", get(list_crops))
        .route("/api/crops/:name", get(get_crop))

        // Middleware (applied in reverse order)
        .layer(CorsLayer::permissive()) // Any origin, method and header
        .layer(TraceLayer::new_for_http()) // Request logging
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let model = state.recommender.model();
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "model": {
            "kind": model.kind(),
            "classes": model.labels().len(),
        }
    }))
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResponse>, AppError> {
    let Json(request) = payload?;
    let key = RequestKey::from(&request);

    if let Some(cached) = state.cache.get(&key).await {
        tracing::debug!("Cache hit for prediction ({})", request.season);
        return Ok(Json(cached));
    }

    tracing::info!("Predicting crops for season {:?}", request.season);

    // CPU-bound work: run in blocking thread pool
    let recommender = state.recommender.clone();
    let response = tokio::task::spawn_blocking(move || recommender.recommend(&request))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))??;

    state.cache.insert(key, response.clone()).await;

    Ok(Json(response))
}

async fn list_crops() -> Json<serde_json::Value> {
    let data = catalogue::all_profiles();
    Json(serde_json::json!({
        "rows": data.len(),
        "data": data,
    }))
}

async fn get_crop(Path(name): Path<String>) -> Result<Json<catalogue::CropProfile>, AppError> {
    catalogue::profile(&name)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Crop {} not found", name)))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    /// Body could not be read as a `PredictionRequest`
    BadRequest(JsonRejection),
    /// Model output disagrees with its label list
    ModelContract(String),
    Internal(String),
    NotFound(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection)
    }
}

impl From<RecommendError> for AppError {
    fn from(err: RecommendError) -> Self {
        match err {
            RecommendError::ModelContract(e) => AppError::ModelContract(e.to_string()),
            RecommendError::Model(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, kind, message) = match self {
            AppError::BadRequest(rejection) => {
                (rejection.status(), "bad_request", rejection.body_text())
            }
            AppError::ModelContract(msg) => {
                tracing::error!("Model contract violation: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "model_contract", msg)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
            "kind": kind,
        }));

        (status, body).into_response()
    }
}

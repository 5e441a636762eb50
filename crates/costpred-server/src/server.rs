//! JSON API over a pre-trained [`CostPredictor`].
//!
//! The predictor is built once before the listener starts and is never
//! mutated afterwards, so handlers share it through an `Arc` without locks.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use costpred_pipeline::{CostPredictor, InputBounds, PipelineError};
use costpred_schemas::{
    CategoryMappings, ClampPolicy, FeatureRequest, ModelSummary, Prediction,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Shared application state, wrapped in `Arc` for cheap cloning across
/// axum handlers.
#[derive(Debug)]
pub struct AppState {
    pub predictor: CostPredictor,
}

/// Body of `/api/model`: the fitted model plus the request rules a client
/// needs to build a valid form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    #[serde(flatten)]
    pub summary: ModelSummary,
    /// Accepted range of each numeric request field.
    pub bounds: InputBounds,
    /// How negative predictions are reported.
    pub clamp: ClampPolicy,
}

impl ModelResponse {
    fn from_predictor(predictor: &CostPredictor) -> Self {
        Self {
            summary: predictor.summary(),
            bounds: *predictor.bounds(),
            clamp: predictor.clamp_policy(),
        }
    }
}

/// Body returned with every non-2xx response from `/api/predict`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A prediction failure mapped onto an HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let status = if err.is_rejected_input() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            error!(%err, "prediction failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Builds the axum router with all API routes.
///
/// ```text
/// GET  /api/model       -> ModelResponse
/// GET  /api/categories  -> CategoryMappings
/// POST /api/predict     FeatureRequest -> Prediction | 422 ErrorBody
/// ```
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/model", get(model_handler))
        .route("/api/categories", get(categories_handler))
        .route("/api/predict", post(predict_handler))
        .with_state(state)
}

/// Returns the fitted coefficients, category mappings, fit statistics,
/// input bounds and clamp policy.
async fn model_handler(
    State(state): State<Arc<AppState>>,
) -> Json<ModelResponse> {
    Json(ModelResponse::from_predictor(&state.predictor))
}

/// Returns the label-to-code mappings so clients can offer valid choices.
async fn categories_handler(
    State(state): State<Arc<AppState>>,
) -> Json<CategoryMappings> {
    Json(state.predictor.mappings().clone())
}

/// Predicts the cost of one activity.
///
/// Out-of-range numbers and unknown labels yield 422 with an [`ErrorBody`]
/// naming the offending field or label.
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FeatureRequest>,
) -> Result<Json<Prediction>, ApiError> {
    match state.predictor.predict(&req) {
        Ok(prediction) => {
            debug!(
                value = prediction.value,
                raw = prediction.raw,
                clamped = prediction.was_clamped(),
                "prediction served"
            );
            Ok(Json(prediction))
        }
        Err(err) => {
            debug!(%err, "prediction rejected");
            Err(err.into())
        }
    }
}

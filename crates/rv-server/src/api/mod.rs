mod analyze;
mod export;
pub(crate) mod import;
mod widget;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex as TokioMutex;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use rv_analysis::{AnalysisEngine, AnalysisError, Fetcher};
use rv_core::AppConfig;
use rv_gentext::{GenTextClient, GenTextError};
use rv_places::PlacesError;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

pub use analyze::run_analysis;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engine: Arc<AnalysisEngine>,
    pub fetcher: Arc<Fetcher>,
    pub gentext: Arc<GenTextClient>,
    pub locks: KeyLocks,
}

/// Per-place-key serialization: concurrent analyses of the same place run one
/// at a time so a stale key is refreshed once, not N times.
#[derive(Clone, Default)]
pub struct KeyLocks {
    inner: Arc<TokioMutex<HashMap<String, Arc<TokioMutex<()>>>>>,
}

impl KeyLocks {
    pub(crate) async fn acquire(&self, key: &str) -> tokio::sync::OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            Arc::clone(map.entry(key.to_owned()).or_default())
        };
        lock.lock_owned().await
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    cache: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "parse_failure" => StatusCode::UNPROCESSABLE_ENTITY,
            "provider_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            "provider_denied" | "provider_blocked" | "provider_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Maps a pipeline failure to a stable error code plus the variant's own
/// user-facing message.
pub(super) fn map_analysis_error(request_id: String, error: &AnalysisError) -> ApiError {
    let code = match error {
        AnalysisError::Places(e) => match e {
            PlacesError::NotFound { .. } => "not_found",
            PlacesError::MissingApiKey => "config_error",
            PlacesError::AccessDenied => "provider_denied",
            PlacesError::Blocked => "provider_blocked",
            PlacesError::ConnectTimeout | PlacesError::Connect(_) | PlacesError::Timeout => {
                "provider_unavailable"
            }
            PlacesError::Deserialize { .. } => "parse_failure",
            PlacesError::Api(_) | PlacesError::Http(_) => "provider_error",
        },
        AnalysisError::GenText(e) => match e {
            GenTextError::MissingApiKey => "config_error",
            GenTextError::Connect(_) | GenTextError::Timeout => "provider_unavailable",
            GenTextError::Deserialize { .. } => "parse_failure",
            GenTextError::Api(_) | GenTextError::Http(_) => "provider_error",
        },
        AnalysisError::Store(_) => "internal_error",
    };

    if code == "internal_error" || code == "config_error" {
        tracing::error!(error = %error, "analysis pipeline failed");
    } else {
        tracing::warn!(error = %error, code, "analysis request failed");
    }

    ApiError::new(request_id, code, error.to_string())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/analyze", post(analyze::analyze))
        .route("/api/v1/import", post(import::import_reviews))
        .route("/api/v1/export/static", get(export::export_static))
        .route("/api/v1/export/embed", get(export::export_embed))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/widget", get(widget::widget));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match state.engine.keys() {
        Ok(_) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    cache: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: bundle store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        cache: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

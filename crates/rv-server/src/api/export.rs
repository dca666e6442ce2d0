//! Export endpoints: embed snippets generated from cached bundles only.
//!
//! Exports never trigger a fetch. A place that has not been analyzed yet has
//! nothing to export and gets a 404.

use axum::{extract::Query, extract::State, response::IntoResponse, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use rv_core::PlaceBundle;
use rv_export::{live_iframe, static_snapshot};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub place_id: String,
}

#[derive(Debug, Serialize)]
pub struct ExportData {
    pub place_id: String,
    /// Ready-to-paste markup. Carries no credential and no tier marker.
    pub html: String,
}

fn cached_bundle(state: &AppState, req_id: &str, place_id: &str) -> Result<PlaceBundle, ApiError> {
    state
        .engine
        .cached(place_id)
        .map_err(|e| super::map_analysis_error(req_id.to_owned(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.to_owned(),
                "not_found",
                format!("no cached analysis for place '{place_id}'; run an analysis first"),
            )
        })
}

pub async fn export_static(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, ApiError> {
    let bundle = cached_bundle(&state, &req_id.0, &params.place_id)?;
    let html = static_snapshot(&bundle.profile, &bundle.stats, Utc::now());

    Ok(Json(ApiResponse {
        data: ExportData {
            place_id: params.place_id,
            html,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub async fn export_embed(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, ApiError> {
    let bundle = cached_bundle(&state, &req_id.0, &params.place_id)?;
    let html = live_iframe(&state.config.public_base_url, &bundle.profile);

    Ok(Json(ApiResponse {
        data: ExportData {
            place_id: params.place_id,
            html,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

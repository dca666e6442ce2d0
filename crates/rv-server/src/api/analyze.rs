//! The analyze operation: resolve, fetch, refresh, respond.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use rv_analysis::AnalysisError;
use rv_core::{PlaceBundle, Tier};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Free-text business query or a provider place identifier.
    pub query: String,
    /// Requested access tier; effective tier may be downgraded.
    pub tier: Option<Tier>,
    /// Access credential required for the elevated tier. Never persisted and
    /// never present in anything exported.
    pub credential: Option<String>,
    /// Overrides the tier-derived audit default.
    pub audit: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeData {
    pub place_id: String,
    #[serde(flatten)]
    pub bundle: PlaceBundle,
}

/// Resolves the effective tier: elevated access requires a non-empty
/// credential, otherwise the request quietly falls back to standard.
fn effective_tier(requested: Option<Tier>, credential: Option<&str>) -> Tier {
    match requested.unwrap_or(Tier::Standard) {
        Tier::Elevated if credential.is_some_and(|c| !c.trim().is_empty()) => Tier::Elevated,
        Tier::Elevated => {
            tracing::info!("elevated tier requested without credential, using standard");
            Tier::Standard
        }
        Tier::Standard => Tier::Standard,
    }
}

/// Runs the full analysis pipeline for one query.
///
/// A fresh cached bundle short-circuits before any provider call. Otherwise
/// the place is fetched at the effective tier and merged through the refresh
/// policy. Work on the same place key is serialized.
///
/// # Errors
///
/// Propagates resolution, fetch, summarize, and store failures.
pub async fn run_analysis(
    state: &AppState,
    query: &str,
    tier: Tier,
    audit: bool,
) -> Result<(String, PlaceBundle), AnalysisError> {
    let place_id = state.fetcher.resolve_place_id(query).await?;

    let _guard = state.locks.acquire(&place_id).await;

    let now = Utc::now();
    if let Some(bundle) = state.engine.cached_if_fresh(&place_id, now)? {
        tracing::debug!(place_id, "serving fresh cached bundle");
        return Ok((place_id, bundle));
    }

    let snapshot = state.fetcher.snapshot(&place_id, tier).await?;
    let bundle = state
        .engine
        .refresh(&place_id, snapshot, audit, state.gentext.as_ref(), now)
        .await?;
    Ok((place_id, bundle))
}

pub async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.query.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "query must not be empty",
        ));
    }

    let tier = effective_tier(request.tier, request.credential.as_deref());
    // Standard-tier lookups default to audit framing; elevated data is rich
    // enough for strict extraction.
    let audit = request.audit.unwrap_or(tier == Tier::Standard);

    let (place_id, bundle) = run_analysis(&state, &request.query, tier, audit)
        .await
        .map_err(|e| super::map_analysis_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: AnalyzeData { place_id, bundle },
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elevated_without_credential_falls_back_to_standard() {
        assert_eq!(effective_tier(Some(Tier::Elevated), None), Tier::Standard);
        assert_eq!(effective_tier(Some(Tier::Elevated), Some("  ")), Tier::Standard);
    }

    #[test]
    fn elevated_with_credential_is_honored() {
        assert_eq!(
            effective_tier(Some(Tier::Elevated), Some("tok-123")),
            Tier::Elevated
        );
    }

    #[test]
    fn missing_tier_defaults_to_standard() {
        assert_eq!(effective_tier(None, Some("tok-123")), Tier::Standard);
    }
}

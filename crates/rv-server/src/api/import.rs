//! Manual review import: free text in, analyzed bundle out.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use chrono::Utc;
use serde::Deserialize;

use rv_analysis::{round_to_one_decimal, AnalysisError, PlaceSnapshot};
use rv_core::{BusinessProfile, ReviewRecord};

use super::analyze::AnalyzeData;
use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

/// Cache key for manually imported data. There is one import slot; a new
/// import replaces the profile wholesale.
pub(crate) const IMPORT_KEY: &str = "manual-import";

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    /// Pasted review text, any formatting.
    pub raw_text: String,
}

fn import_profile() -> BusinessProfile {
    BusinessProfile {
        name: "Imported Business Data".to_owned(),
        url: "#".to_owned(),
        logo_url: "https://ui-avatars.com/api/?name=RV".to_owned(),
        description: "Manually imported review data.".to_owned(),
        address: None,
        phone: None,
        price_range: None,
        place_id: Some(IMPORT_KEY.to_owned()),
        categories: Vec::new(),
    }
}

fn mean_rating(reviews: &[ReviewRecord]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    round_to_one_decimal(f64::from(sum) / reviews.len() as f64)
}

pub async fn import_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<ImportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.raw_text.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "raw_text must not be empty",
        ));
    }

    let reviews = state
        .gentext
        .parse_raw_reviews(&request.raw_text)
        .await
        .map_err(|e| super::map_analysis_error(req_id.0.clone(), &AnalysisError::GenText(e)))?;

    let total = u32::try_from(reviews.len()).unwrap_or(u32::MAX);
    let snapshot = PlaceSnapshot {
        profile: import_profile(),
        average_rating: mean_rating(&reviews),
        total_review_count: total,
        reviews,
    };

    let _guard = state.locks.acquire(IMPORT_KEY).await;
    let bundle = state
        .engine
        .refresh(IMPORT_KEY, snapshot, false, state.gentext.as_ref(), Utc::now())
        .await
        .map_err(|e| super::map_analysis_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: AnalyzeData {
            place_id: IMPORT_KEY.to_owned(),
            bundle,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

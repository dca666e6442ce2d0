//! The hosted widget page that live-iframe embeds point at.
//!
//! The widget is public. Embed snippets never carry a credential, so the
//! common path runs at the standard tier in audit framing; a caller who
//! supplies one by hand gets the elevated fetch. Errors render inside the
//! page rather than breaking the host site's layout.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use chrono::Utc;
use serde::Deserialize;

use rv_core::Tier;
use rv_export::static_snapshot;

use super::{run_analysis, AppState};

#[derive(Debug, Deserialize)]
pub struct WidgetParams {
    pub place_id: Option<String>,
    pub credential: Option<String>,
}

fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>Review Velocity</title>\n</head>\n\
         <body style=\"margin:0;background:transparent;font-family:sans-serif;padding:16px;\">\n\
         {body}\n</body>\n</html>\n"
    )
}

fn error_box(message: &str) -> String {
    format!(
        "<div style=\"color:#ef4444;font-weight:bold;font-size:14px;background:white;\
         padding:16px;border-radius:8px;box-shadow:0 2px 8px rgba(0,0,0,0.08);\">{message}</div>"
    )
}

pub async fn widget(
    State(state): State<AppState>,
    Query(params): Query<WidgetParams>,
) -> impl IntoResponse {
    let Some(place_id) = params.place_id.filter(|p| !p.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Html(page(&error_box("Missing place_id parameter."))),
        );
    };

    let tier = match params.credential.as_deref() {
        Some(c) if !c.trim().is_empty() => Tier::Elevated,
        _ => Tier::Standard,
    };
    let audit = tier == Tier::Standard;

    match run_analysis(&state, &place_id, tier, audit).await {
        Ok((_, bundle)) => {
            let card = static_snapshot(&bundle.profile, &bundle.stats, Utc::now());
            (StatusCode::OK, Html(page(&card)))
        }
        Err(e) => {
            tracing::warn!(place_id, error = %e, "widget render failed");
            (StatusCode::OK, Html(page(&error_box("Failed to load business data."))))
        }
    }
}

//! HTTP client for the generative-text REST API.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use rv_core::{ReviewRecord, ReviewSource, TextSummary};

use crate::error::GenTextError;
use crate::prompt::{augment_prompt, parse_prompt, summarize_prompt, SAMPLE_CAP};
use crate::Summarize;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Literal overview used when the provider yields no usable content.
const FALLBACK_OVERVIEW: &str = "Analysis unavailable.";

/// Client for the generative-text provider.
pub struct GenTextClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

/// Structured summary as emitted by the model against the output schema.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryPayload {
    #[serde(default)]
    identified_services: Vec<String>,
    #[serde(default)]
    positive_attributes: Vec<String>,
    #[serde(default)]
    narrative_overview: String,
}

/// One generated review as emitted by the model.
#[derive(Debug, Deserialize)]
struct GeneratedReview {
    author: Option<String>,
    rating: Option<u8>,
    text: String,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenTextClient {
    /// Creates a new client pointed at the production provider.
    ///
    /// # Errors
    ///
    /// Returns [`GenTextError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: Option<&str>,
        model: &str,
        request_timeout_secs: u64,
    ) -> Result<Self, GenTextError> {
        Self::with_base_url(api_key, model, request_timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GenTextError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: Option<&str>,
        model: &str,
        request_timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GenTextError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs))
            .connect_timeout(Duration::from_secs(8))
            .user_agent("review-velocity/0.1 (reputation-widget)")
            .build()
            .map_err(GenTextError::Http)?;

        Ok(Self {
            client,
            api_key: api_key.map(ToOwned::to_owned),
            base_url: base_url.trim_end_matches('/').to_owned(),
            model: model.to_owned(),
        })
    }

    /// Sends one generation request and returns the first candidate text, or
    /// `None` when the provider produced no usable content.
    async fn generate(
        &self,
        prompt: String,
        response_schema: serde_json::Value,
    ) -> Result<Option<String>, GenTextError> {
        let key = self.api_key.as_deref().ok_or(GenTextError::MissingApiKey)?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema,
            }
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(GenTextError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GenTextError::Api(format!(
                "{status}: {}",
                detail.chars().take(200).collect::<String>()
            )));
        }

        let envelope: GenerateResponse =
            response
                .json()
                .await
                .map_err(|e| GenTextError::Api(format!("unreadable response envelope: {e}")))?;

        Ok(envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.trim().is_empty()))
    }

    /// Produces the structured summary for a review batch.
    ///
    /// The sample is capped to the 50 most recent reviews. Unusable provider
    /// output degrades to empty lists plus a literal fallback overview.
    ///
    /// # Errors
    ///
    /// Propagates transport/provider failures and [`GenTextError::Deserialize`]
    /// when generated content does not match the schema.
    pub async fn summarize(
        &self,
        reviews: &[ReviewRecord],
        total_count: u32,
        average_rating: f64,
        audit: bool,
    ) -> Result<TextSummary, GenTextError> {
        let sample = &reviews[..reviews.len().min(SAMPLE_CAP)];
        let prompt = summarize_prompt(sample, total_count, average_rating, audit);

        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "identifiedServices": { "type": "ARRAY", "items": { "type": "STRING" } },
                "positiveAttributes": { "type": "ARRAY", "items": { "type": "STRING" } },
                "narrativeOverview": { "type": "STRING" }
            },
            "required": ["identifiedServices", "positiveAttributes", "narrativeOverview"]
        });

        match self.generate(prompt, schema).await? {
            Some(text) => summary_from_text(&text),
            None => {
                tracing::warn!("summarizer returned no content; using fallback overview");
                Ok(empty_summary())
            }
        }
    }

    /// Synthesizes a plausible earlier review history from a small real
    /// sample, tagged [`ReviewSource::Synthesized`].
    ///
    /// # Errors
    ///
    /// Propagates provider failures; callers are expected to treat any error
    /// as "no augmentation available".
    pub async fn augment(
        &self,
        sample: &[ReviewRecord],
        business_name: &str,
    ) -> Result<Vec<ReviewRecord>, GenTextError> {
        let prompt = augment_prompt(sample, business_name);
        let schema = review_array_schema();

        match self.generate(prompt, schema).await? {
            Some(text) => reviews_from_text(&text, ReviewSource::Synthesized, "syn", Utc::now()),
            None => Ok(Vec::new()),
        }
    }

    /// Structures pasted free-text reviews into records for manual import.
    ///
    /// # Errors
    ///
    /// Returns [`GenTextError::Deserialize`] when the text could not be
    /// structured, surfaced to users as a parse failure.
    pub async fn parse_raw_reviews(
        &self,
        raw_text: &str,
    ) -> Result<Vec<ReviewRecord>, GenTextError> {
        let now = Utc::now();
        let prompt = parse_prompt(raw_text, now);
        let schema = review_array_schema();

        match self.generate(prompt, schema).await? {
            Some(text) => reviews_from_text(&text, ReviewSource::Primary, "import", now),
            None => Err(GenTextError::Deserialize {
                context: "raw review import".to_owned(),
                source: serde_json::from_str::<()>("").unwrap_err(),
            }),
        }
    }
}

impl Summarize for GenTextClient {
    fn summarize(
        &self,
        reviews: &[ReviewRecord],
        total_count: u32,
        average_rating: f64,
        audit: bool,
    ) -> impl std::future::Future<Output = Result<TextSummary, GenTextError>> + Send {
        GenTextClient::summarize(self, reviews, total_count, average_rating, audit)
    }
}

fn review_array_schema() -> serde_json::Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "author": { "type": "STRING" },
                "rating": { "type": "INTEGER" },
                "text": { "type": "STRING" },
                "date": { "type": "STRING" }
            },
            "required": ["text"]
        }
    })
}

fn empty_summary() -> TextSummary {
    TextSummary {
        identified_services: Vec::new(),
        positive_attributes: Vec::new(),
        narrative_overview: FALLBACK_OVERVIEW.to_owned(),
    }
}

fn summary_from_text(text: &str) -> Result<TextSummary, GenTextError> {
    let payload: SummaryPayload =
        serde_json::from_str(text).map_err(|e| GenTextError::Deserialize {
            context: "summary payload".to_owned(),
            source: e,
        })?;
    Ok(TextSummary {
        identified_services: payload.identified_services,
        positive_attributes: payload.positive_attributes,
        narrative_overview: if payload.narrative_overview.trim().is_empty() {
            FALLBACK_OVERVIEW.to_owned()
        } else {
            payload.narrative_overview
        },
    })
}

/// Parses a generated review array into domain records.
///
/// Dates are accepted as RFC 3339 or plain `YYYY-MM-DD`; records with an
/// unparseable or missing date fall back to `now` so the 30-day window never
/// sees garbage.
fn reviews_from_text(
    text: &str,
    source: ReviewSource,
    id_prefix: &str,
    now: DateTime<Utc>,
) -> Result<Vec<ReviewRecord>, GenTextError> {
    let generated: Vec<GeneratedReview> =
        serde_json::from_str(text).map_err(|e| GenTextError::Deserialize {
            context: "generated review array".to_owned(),
            source: e,
        })?;

    Ok(generated
        .into_iter()
        .enumerate()
        .map(|(idx, r)| ReviewRecord {
            id: format!("{id_prefix}-{idx}"),
            author: r.author.unwrap_or_else(|| "Customer".to_owned()),
            rating: r.rating.unwrap_or(5).clamp(1, 5),
            text: r.text,
            published_at: r.date.as_deref().map_or(now, |d| parse_review_date(d, now)),
            source,
        })
        .collect())
}

fn parse_review_date(raw: &str, fallback: DateTime<Utc>) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return dt.and_utc();
        }
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn summary_from_text_parses_schema_output() {
        let text = r#"{
            "identifiedServices": ["crown fitting", "cleaning"],
            "positiveAttributes": ["gentle"],
            "narrativeOverview": "Recent customer feedback highlights gentle care."
        }"#;
        let summary = summary_from_text(text).expect("parse");
        assert_eq!(summary.identified_services.len(), 2);
        assert_eq!(summary.positive_attributes, vec!["gentle"]);
        assert!(summary.narrative_overview.starts_with("Recent"));
    }

    #[test]
    fn summary_from_text_blank_overview_uses_fallback() {
        let text = r#"{ "identifiedServices": [], "positiveAttributes": [], "narrativeOverview": "  " }"#;
        let summary = summary_from_text(text).expect("parse");
        assert_eq!(summary.narrative_overview, FALLBACK_OVERVIEW);
    }

    #[test]
    fn summary_from_text_rejects_malformed_json() {
        let err = summary_from_text("not json").unwrap_err();
        assert!(matches!(err, GenTextError::Deserialize { .. }));
    }

    #[test]
    fn reviews_from_text_fills_defaults_and_tags_source() {
        let text = r#"[
            { "author": "Mia", "rating": 4, "text": "Solid work.", "date": "2026-06-15" },
            { "text": "Would return." }
        ]"#;
        let reviews =
            reviews_from_text(text, ReviewSource::Synthesized, "syn", now()).expect("parse");
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].id, "syn-0");
        assert_eq!(reviews[0].published_at.format("%Y-%m-%d").to_string(), "2026-06-15");
        assert_eq!(reviews[1].author, "Customer");
        assert_eq!(reviews[1].rating, 5);
        assert_eq!(reviews[1].published_at, now());
        assert!(reviews.iter().all(|r| r.source == ReviewSource::Synthesized));
    }

    #[test]
    fn review_date_accepts_rfc3339() {
        let parsed = parse_review_date("2026-05-01T08:30:00Z", now());
        assert_eq!(parsed.format("%Y-%m-%d %H:%M").to_string(), "2026-05-01 08:30");
    }

    #[test]
    fn review_date_falls_back_on_garbage() {
        assert_eq!(parse_review_date("a month ago", now()), now());
    }

    #[test]
    fn rating_is_clamped_into_band() {
        let text = r#"[ { "text": "ok", "rating": 9 } ]"#;
        let reviews = reviews_from_text(text, ReviewSource::Primary, "import", now()).unwrap();
        assert_eq!(reviews[0].rating, 5);
    }
}

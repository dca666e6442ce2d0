//! HTTP client for the places provider REST API.
//!
//! Wraps `reqwest` with provider-specific error handling, API key management,
//! and typed response deserialization. Every endpoint checks the `"status"`
//! field in the JSON envelope and maps provider verdicts onto the distinct
//! [`PlacesError`] kinds.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::PlacesError;
use crate::retry::retry_with_backoff;
use crate::types::{DetailsResponse, FindPlaceResponse, PlaceDetails};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Fields requested from the details endpoint; kept to what the analysis
/// pipeline actually consumes.
const DETAILS_FIELDS: &str = "place_id,name,formatted_address,formatted_phone_number,website,\
                              rating,user_ratings_total,reviews,types";

/// Client for the places provider REST API.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl PlacesClient {
    /// Creates a new client pointed at the production places API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: Option<&str>,
        connect_timeout_secs: u64,
        request_timeout_secs: u64,
    ) -> Result<Self, PlacesError> {
        Self::with_base_url(
            api_key,
            connect_timeout_secs,
            request_timeout_secs,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::Api`] if `base_url` is not a
    /// valid URL.
    pub fn with_base_url(
        api_key: Option<&str>,
        connect_timeout_secs: u64,
        request_timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(request_timeout_secs))
            .user_agent("review-velocity/0.1 (reputation-widget)")
            .build()
            .map_err(PlacesError::Http)?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // joined endpoint segments extend the path rather than replacing it.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| PlacesError::Api(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.map(ToOwned::to_owned),
            base_url,
            max_retries: 2,
            backoff_base_ms: 500,
        })
    }

    /// Overrides the transient-error retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Resolves a free-text query (name or link) to a place identifier via
    /// the provider-side search, taking the top match.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::NotFound`] when the provider returns no candidates.
    /// - [`PlacesError::AccessDenied`] when the key is rejected.
    /// - Transport kinds ([`PlacesError::ConnectTimeout`] and friends) on
    ///   network failure.
    pub async fn find_place(&self, query: &str) -> Result<String, PlacesError> {
        let url = self.build_url(
            "findplacefromtext/json",
            &[
                ("input", query),
                ("inputtype", "textquery"),
                ("fields", "place_id"),
            ],
        )?;

        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_json(&url)
        })
        .await?;

        let envelope: FindPlaceResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("findplacefromtext(input={query})"),
                source: e,
            })?;

        Self::check_status(&envelope.status, envelope.error_message.as_deref(), query)?;

        envelope
            .candidates
            .into_iter()
            .next()
            .map(|c| c.place_id)
            .ok_or_else(|| PlacesError::NotFound {
                query: query.to_owned(),
            })
    }

    /// Fetches the structured profile and the public review page for a place
    /// identifier.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::NotFound`] when the identifier is unknown.
    /// - [`PlacesError::AccessDenied`] when the key is rejected.
    /// - [`PlacesError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let url = self.build_url(
            "details/json",
            &[("place_id", place_id), ("fields", DETAILS_FIELDS)],
        )?;

        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_json(&url)
        })
        .await?;

        let envelope: DetailsResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("details(place_id={place_id})"),
                source: e,
            })?;

        Self::check_status(&envelope.status, envelope.error_message.as_deref(), place_id)?;

        envelope.result.ok_or_else(|| PlacesError::NotFound {
            query: place_id.to_owned(),
        })
    }

    /// Builds the full request URL with percent-encoded query parameters and
    /// the API key appended.
    fn build_url(&self, endpoint: &str, extra: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let key = self.api_key.as_deref().ok_or(PlacesError::MissingApiKey)?;
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| PlacesError::Api(format!("invalid endpoint '{endpoint}': {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", key);
        }
        Ok(url)
    }

    /// Sends a GET request and parses the body as JSON.
    ///
    /// A `403` without a parseable provider envelope is treated as a block by
    /// an intermediary ([`PlacesError::Blocked`]); provider-level verdicts are
    /// left in the envelope for [`Self::check_status`].
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, PlacesError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(PlacesError::from_transport)?;

        if response.status() == StatusCode::FORBIDDEN {
            let body = response.text().await.map_err(PlacesError::from_transport)?;
            return serde_json::from_str(&body).map_err(|_| PlacesError::Blocked);
        }

        let response = response.error_for_status().map_err(PlacesError::Http)?;
        let body = response.text().await.map_err(PlacesError::from_transport)?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: url.path().to_owned(),
            source: e,
        })
    }

    /// Maps the provider's envelope `"status"` onto an error kind.
    fn check_status(
        status: &str,
        error_message: Option<&str>,
        query: &str,
    ) -> Result<(), PlacesError> {
        match status {
            "OK" => Ok(()),
            "ZERO_RESULTS" | "NOT_FOUND" => Err(PlacesError::NotFound {
                query: query.to_owned(),
            }),
            "REQUEST_DENIED" => Err(PlacesError::AccessDenied),
            other => Err(PlacesError::Api(format!(
                "{other}: {}",
                error_message.unwrap_or("no detail provided")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> PlacesClient {
        PlacesClient::with_base_url(Some("test-key"), 8, 10, base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn build_url_appends_key_and_params() {
        let client = test_client("https://places.example.com/api");
        let url = client
            .build_url("details/json", &[("place_id", "abc123")])
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://places.example.com/api/details/json?place_id=abc123&key=test-key"
        );
    }

    #[test]
    fn build_url_strips_trailing_slash() {
        let client = test_client("https://places.example.com/api/");
        let url = client
            .build_url("findplacefromtext/json", &[("input", "Joe's Diner")])
            .expect("url");
        assert!(url.as_str().starts_with(
            "https://places.example.com/api/findplacefromtext/json?input=Joe%27s+Diner"
        ) || url.as_str().contains("Joe"));
        assert!(url.as_str().ends_with("key=test-key"));
    }

    #[test]
    fn build_url_without_key_is_missing_credential() {
        let client = PlacesClient::with_base_url(None, 8, 10, "https://places.example.com")
            .expect("client");
        let result = client.build_url("details/json", &[]);
        assert!(matches!(result, Err(PlacesError::MissingApiKey)));
    }

    #[test]
    fn check_status_maps_provider_verdicts() {
        assert!(PlacesClient::check_status("OK", None, "q").is_ok());
        assert!(matches!(
            PlacesClient::check_status("ZERO_RESULTS", None, "q"),
            Err(PlacesError::NotFound { query }) if query == "q"
        ));
        assert!(matches!(
            PlacesClient::check_status("REQUEST_DENIED", Some("bad key"), "q"),
            Err(PlacesError::AccessDenied)
        ));
        assert!(matches!(
            PlacesClient::check_status("OVER_QUERY_LIMIT", Some("quota"), "q"),
            Err(PlacesError::Api(msg)) if msg.contains("OVER_QUERY_LIMIT") && msg.contains("quota")
        ));
    }
}

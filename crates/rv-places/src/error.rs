use thiserror::Error;

/// Errors returned by the places provider client.
///
/// Each variant maps to a distinct user-facing message; callers match on the
/// kind rather than parsing strings.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// No provider API key is configured.
    #[error("places API key is not configured")]
    MissingApiKey,

    /// Could not establish a connection within the connect timeout.
    #[error("timed out connecting to the places provider")]
    ConnectTimeout,

    /// Connection-level failure (DNS, TLS, refused).
    #[error("failed to reach the places provider: {0}")]
    Connect(String),

    /// The request was sent but did not complete within the request timeout.
    #[error("places request timed out")]
    Timeout,

    /// No place matched the query.
    #[error("no place matched '{query}'")]
    NotFound { query: String },

    /// The provider rejected the configured credential.
    #[error("places provider rejected the request credential")]
    AccessDenied,

    /// The request was rejected before reaching the provider (proxy/WAF
    /// style block); surfaced with an actionable transport hint.
    #[error("request was blocked in transit; switching transport may be required")]
    Blocked,

    /// Provider-reported error status not covered by a more specific kind.
    #[error("places provider error: {0}")]
    Api(String),

    /// Other HTTP-level failure from the underlying client.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PlacesError {
    /// Classify a transport-level `reqwest` failure into the matching kind.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() && err.is_timeout() {
            PlacesError::ConnectTimeout
        } else if err.is_connect() {
            PlacesError::Connect(err.to_string())
        } else if err.is_timeout() {
            PlacesError::Timeout
        } else {
            PlacesError::Http(err)
        }
    }
}

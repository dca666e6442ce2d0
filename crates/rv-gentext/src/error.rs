use thiserror::Error;

/// Errors returned by the generative-text client.
#[derive(Debug, Error)]
pub enum GenTextError {
    /// No provider API key is configured.
    #[error("text-generation API key is not configured")]
    MissingApiKey,

    /// Connection-level failure (DNS, TLS, refused).
    #[error("failed to reach the text-generation provider: {0}")]
    Connect(String),

    /// The request did not complete within the configured timeout.
    #[error("text-generation request timed out")]
    Timeout,

    /// The provider returned a non-success status.
    #[error("text-generation provider error: {0}")]
    Api(String),

    /// Other HTTP-level failure from the underlying client.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Generated content could not be structured into the expected shape.
    #[error("could not structure generated content for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl GenTextError {
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenTextError::Timeout
        } else if err.is_connect() {
            GenTextError::Connect(err.to_string())
        } else {
            GenTextError::Http(err)
        }
    }
}

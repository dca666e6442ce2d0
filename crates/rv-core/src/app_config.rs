use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Public origin of this deployment, used when generating embed snippets.
    pub public_base_url: String,
    /// Directory holding one serialized bundle per place key.
    pub cache_dir: PathBuf,
    /// Optional cron expression for the background refresh job.
    pub refresh_cron: Option<String>,

    pub places_base_url: String,
    pub places_api_key: Option<String>,
    pub places_connect_timeout_secs: u64,
    pub places_request_timeout_secs: u64,
    pub places_max_retries: u32,
    pub places_retry_backoff_base_ms: u64,

    pub gentext_base_url: String,
    pub gentext_api_key: Option<String>,
    pub gentext_model: String,
    pub gentext_request_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("public_base_url", &self.public_base_url)
            .field("cache_dir", &self.cache_dir)
            .field("refresh_cron", &self.refresh_cron)
            .field("places_base_url", &self.places_base_url)
            .field(
                "places_api_key",
                &self.places_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "places_connect_timeout_secs",
                &self.places_connect_timeout_secs,
            )
            .field(
                "places_request_timeout_secs",
                &self.places_request_timeout_secs,
            )
            .field("places_max_retries", &self.places_max_retries)
            .field(
                "places_retry_backoff_base_ms",
                &self.places_retry_backoff_base_ms,
            )
            .field("gentext_base_url", &self.gentext_base_url)
            .field(
                "gentext_api_key",
                &self.gentext_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("gentext_model", &self.gentext_model)
            .field(
                "gentext_request_timeout_secs",
                &self.gentext_request_timeout_secs,
            )
            .finish()
    }
}

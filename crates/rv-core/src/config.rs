use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a configured value is invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a configured value is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The parsing/validation logic is decoupled from the actual environment so it
/// can be tested with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("RV_ENV", "development"));
    let bind_addr = parse_addr("RV_BIND_ADDR", "0.0.0.0:8080")?;
    let log_level = or_default("RV_LOG_LEVEL", "info");
    let public_base_url = or_default("RV_PUBLIC_URL", "http://localhost:8080");
    let cache_dir = PathBuf::from(or_default("RV_CACHE_DIR", "./cache"));
    let refresh_cron = lookup("RV_REFRESH_CRON").ok();

    let places_base_url = or_default(
        "RV_PLACES_BASE_URL",
        "https://maps.googleapis.com/maps/api/place",
    );
    // Missing keys are not a startup error: the clients surface a distinct
    // error kind when a call is attempted without one.
    let places_api_key = lookup("PLACES_API_KEY").ok();
    let places_connect_timeout_secs = parse_u64("RV_PLACES_CONNECT_TIMEOUT_SECS", "8")?;
    let places_request_timeout_secs = parse_u64("RV_PLACES_REQUEST_TIMEOUT_SECS", "10")?;
    let places_max_retries = parse_u32("RV_PLACES_MAX_RETRIES", "2")?;
    let places_retry_backoff_base_ms = parse_u64("RV_PLACES_RETRY_BACKOFF_BASE_MS", "500")?;

    let gentext_base_url = or_default(
        "RV_GENTEXT_BASE_URL",
        "https://generativelanguage.googleapis.com",
    );
    let gentext_api_key = lookup("GENTEXT_API_KEY").ok();
    let gentext_model = or_default("RV_GENTEXT_MODEL", "gemini-2.5-flash");
    let gentext_request_timeout_secs = parse_u64("RV_GENTEXT_REQUEST_TIMEOUT_SECS", "30")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        public_base_url,
        cache_dir,
        refresh_cron,
        places_base_url,
        places_api_key,
        places_connect_timeout_secs,
        places_request_timeout_secs,
        places_max_retries,
        places_retry_backoff_base_ms,
        gentext_base_url,
        gentext_api_key,
        gentext_model,
        gentext_request_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

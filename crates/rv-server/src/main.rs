mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use rv_analysis::{AnalysisEngine, Fetcher, JsonFileStore};
use rv_gentext::GenTextClient;
use rv_places::PlacesClient;

use crate::{
    api::{build_app, default_rate_limit_state, AppState, KeyLocks},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(rv_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = Arc::new(JsonFileStore::open(&config.cache_dir)?);
    let engine = Arc::new(AnalysisEngine::new(store));

    let places = PlacesClient::with_base_url(
        config.places_api_key.as_deref(),
        config.places_connect_timeout_secs,
        config.places_request_timeout_secs,
        &config.places_base_url,
    )?
    .with_retry_policy(config.places_max_retries, config.places_retry_backoff_base_ms);
    let gentext = Arc::new(GenTextClient::with_base_url(
        config.gentext_api_key.as_deref(),
        &config.gentext_model,
        config.gentext_request_timeout_secs,
        &config.gentext_base_url,
    )?);
    let fetcher = Arc::new(Fetcher::new(places, Arc::clone(&gentext)));

    let _scheduler = scheduler::build_scheduler(
        Arc::clone(&engine),
        Arc::clone(&fetcher),
        Arc::clone(&gentext),
        config.refresh_cron.as_deref(),
    )
    .await?;

    let auth = AuthState::from_env(matches!(config.env, rv_core::Environment::Development))?;
    let app = build_app(
        AppState {
            config: Arc::clone(&config),
            engine,
            fetcher,
            gentext,
            locks: KeyLocks::default(),
        },
        auth,
        default_rate_limit_state(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "rv-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}

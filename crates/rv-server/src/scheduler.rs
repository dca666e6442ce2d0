//! Background refresh of cached bundles.
//!
//! When `RV_REFRESH_CRON` is configured, every cached place is swept on that
//! schedule: fresh bundles are left alone, stale ones are re-fetched at the
//! standard tier with audit mode off so scheduled refreshes never inflate
//! text analysis.

use std::sync::Arc;

use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use rv_analysis::{AnalysisEngine, Fetcher};
use rv_core::Tier;
use rv_gentext::GenTextClient;

use crate::api::import::IMPORT_KEY;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, the
/// refresh job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    engine: Arc<AnalysisEngine>,
    fetcher: Arc<Fetcher>,
    gentext: Arc<GenTextClient>,
    refresh_cron: Option<&str>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    if let Some(cron) = refresh_cron {
        register_refresh_job(&scheduler, cron, engine, fetcher, gentext).await?;
    } else {
        tracing::info!("RV_REFRESH_CRON not set; background refresh disabled");
    }

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_refresh_job(
    scheduler: &JobScheduler,
    cron: &str,
    engine: Arc<AnalysisEngine>,
    fetcher: Arc<Fetcher>,
    gentext: Arc<GenTextClient>,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let engine = Arc::clone(&engine);
        let fetcher = Arc::clone(&fetcher);
        let gentext = Arc::clone(&gentext);

        Box::pin(async move {
            tracing::info!("scheduler: starting cached-bundle refresh sweep");
            run_refresh_sweep(&engine, &fetcher, &gentext).await;
            tracing::info!("scheduler: cached-bundle refresh sweep complete");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Refreshes every stale cached place. Per-place failures are logged and the
/// sweep moves on; one broken place must not starve the rest.
async fn run_refresh_sweep(engine: &AnalysisEngine, fetcher: &Fetcher, gentext: &GenTextClient) {
    let keys = match engine.keys() {
        Ok(keys) => keys,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to list cached bundles");
            return;
        }
    };

    for key in keys {
        // Imported data has no provider source to re-fetch from.
        if key == IMPORT_KEY {
            continue;
        }

        let now = Utc::now();
        match engine.cached_if_fresh(&key, now) {
            Ok(Some(_)) => continue,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(key, error = %e, "scheduler: failed to read cached bundle");
                continue;
            }
        }

        let snapshot = match fetcher.snapshot(&key, Tier::Standard).await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(key, error = %e, "scheduler: fetch failed, keeping stale bundle");
                continue;
            }
        };

        match engine.refresh(&key, snapshot, false, gentext, now).await {
            Ok(bundle) => tracing::info!(
                key,
                reviews_last_30_days = bundle.stats.reviews_last_30_days,
                "scheduler: refreshed bundle"
            ),
            Err(e) => {
                tracing::warn!(key, error = %e, "scheduler: refresh failed, keeping stale bundle");
            }
        }
    }
}

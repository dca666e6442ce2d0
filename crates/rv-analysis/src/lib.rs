//! Analysis engine: the two-clock refresh policy, the bundle store, and the
//! fetch pipeline that feeds them.
//!
//! Numeric stats (counts, average, velocity) are cheap and recompute on every
//! stale pass; text analysis is expensive and refreshes on its own weekly
//! clock. A bundle younger than a day short-circuits everything.

mod engine;
mod fetcher;
mod policy;
mod store;

use thiserror::Error;

pub use engine::{AnalysisEngine, PlaceSnapshot};
pub use fetcher::{looks_like_place_id, Fetcher};
pub use policy::{
    plan_refresh, reviews_in_last_30_days, round_to_one_decimal, trend_for, RefreshPlan,
    LARGE_SAMPLE_THRESHOLD, MIN_IDENTIFIED_SERVICES, NUMERIC_TTL_HOURS, TEXT_TTL_DAYS,
};
pub use store::{BundleStore, JsonFileStore, MemoryStore, StoreError};

/// Errors surfaced by the analysis pipeline.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Places(#[from] rv_places::PlacesError),

    #[error(transparent)]
    GenText(#[from] rv_gentext::GenTextError),
}

//! Ties the refresh policy to the store and the summarizer.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rv_core::{BusinessProfile, PlaceBundle, ReviewRecord, StatsBundle, TextSummary};
use rv_gentext::Summarize;

use crate::policy::{
    plan_refresh, reviews_in_last_30_days, round_to_one_decimal, trend_for, RefreshPlan,
    NUMERIC_TTL_HOURS,
};
use crate::store::BundleStore;
use crate::AnalysisError;

/// What a fetch pass produced for one place: the profile, the review sample,
/// and the provider's lifetime aggregates (which are NOT derivable from the
/// sample).
#[derive(Debug, Clone)]
pub struct PlaceSnapshot {
    pub profile: BusinessProfile,
    pub reviews: Vec<ReviewRecord>,
    pub total_review_count: u32,
    pub average_rating: f64,
}

/// Applies the refresh policy against a bundle store.
pub struct AnalysisEngine {
    store: Arc<dyn BundleStore>,
}

impl AnalysisEngine {
    #[must_use]
    pub fn new(store: Arc<dyn BundleStore>) -> Self {
        Self { store }
    }

    /// Returns the cached bundle regardless of age.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn cached(&self, key: &str) -> Result<Option<PlaceBundle>, AnalysisError> {
        Ok(self.store.get(key)?)
    }

    /// Returns the cached bundle only while its numeric clock is fresh.
    ///
    /// Callers consult this before fetching: a hit means no provider traffic
    /// at all and the bundle comes back exactly as stored.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn cached_if_fresh(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PlaceBundle>, AnalysisError> {
        Ok(self.store.get(key)?.filter(|bundle| {
            now - bundle.stats.numeric_refreshed_at < Duration::hours(NUMERIC_TTL_HOURS)
        }))
    }

    /// Every key with a cached bundle, for the background refresh sweep.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn keys(&self) -> Result<Vec<String>, AnalysisError> {
        Ok(self.store.keys()?)
    }

    /// Merges a freshly fetched snapshot into the cache.
    ///
    /// Numeric stats always recompute from the snapshot. Text regenerates
    /// only when the policy says so; otherwise the previous text fields and
    /// their clock carry over unchanged. Nothing is persisted if the
    /// summarizer fails, so the cache never holds a half-refreshed bundle.
    ///
    /// # Errors
    ///
    /// Propagates store and summarizer failures.
    pub async fn refresh<S: Summarize>(
        &self,
        key: &str,
        snapshot: PlaceSnapshot,
        audit: bool,
        summarizer: &S,
        now: DateTime<Utc>,
    ) -> Result<PlaceBundle, AnalysisError> {
        let previous = self.store.get(key)?;
        let plan = plan_refresh(
            previous.as_ref().map(|b| &b.stats),
            now,
            snapshot.reviews.len(),
            audit,
        );

        let regenerate_text = match (plan, &previous) {
            (RefreshPlan::FullSkip, Some(prev)) => {
                tracing::debug!(key, "numeric stats still fresh, returning cached bundle");
                return Ok(prev.clone());
            }
            (RefreshPlan::FullSkip, None) | (RefreshPlan::Refresh { .. }, None) => true,
            (RefreshPlan::Refresh { text }, Some(_)) => text,
        };

        let reviews_last_30_days = reviews_in_last_30_days(&snapshot.reviews, now);

        let (summary, text_refreshed_at) = if regenerate_text {
            tracing::info!(key, audit, "regenerating text analysis");
            let summary = summarizer
                .summarize(
                    &snapshot.reviews,
                    snapshot.total_review_count,
                    snapshot.average_rating,
                    audit,
                )
                .await?;
            (summary, now)
        } else {
            // Checked above: text carry-over only happens with a previous bundle.
            let prev = previous.as_ref().map(|b| &b.stats);
            match prev {
                Some(stats) => (
                    TextSummary {
                        identified_services: stats.identified_services.clone(),
                        positive_attributes: stats.positive_attributes.clone(),
                        narrative_overview: stats.narrative_overview.clone(),
                    },
                    stats.text_refreshed_at,
                ),
                None => (
                    TextSummary {
                        identified_services: Vec::new(),
                        positive_attributes: Vec::new(),
                        narrative_overview: "Analysis pending...".to_owned(),
                    },
                    DateTime::<Utc>::UNIX_EPOCH,
                ),
            }
        };

        let stats = StatsBundle {
            total_review_count: snapshot.total_review_count,
            average_score: round_to_one_decimal(snapshot.average_rating),
            reviews_last_30_days,
            velocity_trend: trend_for(reviews_last_30_days),
            identified_services: summary.identified_services,
            positive_attributes: summary.positive_attributes,
            narrative_overview: summary.narrative_overview,
            numeric_refreshed_at: now,
            text_refreshed_at,
        };

        let bundle = PlaceBundle {
            profile: snapshot.profile,
            reviews: snapshot.reviews,
            stats,
        };
        self.store.put(key, &bundle)?;
        Ok(bundle)
    }
}

//! The refresh policy: pure decisions over a previous stats block and the
//! current clock. Everything here is synchronous and deterministic so the
//! cache behavior can be tested without any network.

use chrono::{DateTime, Duration, Utc};
use rv_core::{ReviewRecord, StatsBundle, VelocityTrend};

/// Numeric stats younger than this short-circuit the whole refresh.
pub const NUMERIC_TTL_HOURS: i64 = 24;

/// Text analysis younger than this is carried over instead of regenerated.
pub const TEXT_TTL_DAYS: i64 = 7;

/// A review sample larger than this signals a richer data source than the
/// provider's public handful (e.g. a manual import or elevated access).
pub const LARGE_SAMPLE_THRESHOLD: usize = 10;

/// With a large sample, fewer identified services than this means the
/// previous text analysis ran against thin data and is worth redoing early.
pub const MIN_IDENTIFIED_SERVICES: usize = 3;

/// What a refresh pass should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPlan {
    /// Numeric stats are fresh: return the cached bundle untouched.
    FullSkip,
    /// Recompute numeric stats; regenerate text only if `text` is set.
    Refresh { text: bool },
}

/// Decides what to refresh.
///
/// The numeric clock gates everything: within [`NUMERIC_TTL_HOURS`] of the
/// last numeric refresh nothing runs, audit mode included. Past that, numeric
/// stats always recompute, and text regenerates when any of these hold:
/// there is no previous analysis, the text clock passed [`TEXT_TTL_DAYS`],
/// the sample outgrew the previous analysis (more than
/// [`LARGE_SAMPLE_THRESHOLD`] reviews but fewer than
/// [`MIN_IDENTIFIED_SERVICES`] services on record), or audit mode is on.
#[must_use]
pub fn plan_refresh(
    previous: Option<&StatsBundle>,
    now: DateTime<Utc>,
    review_count: usize,
    audit: bool,
) -> RefreshPlan {
    if let Some(prev) = previous {
        if now - prev.numeric_refreshed_at < Duration::hours(NUMERIC_TTL_HOURS) {
            return RefreshPlan::FullSkip;
        }
    }

    let text = match previous {
        None => true,
        Some(prev) => {
            let text_stale = now - prev.text_refreshed_at >= Duration::days(TEXT_TTL_DAYS);
            let sample_outgrown = review_count > LARGE_SAMPLE_THRESHOLD
                && prev.identified_services.len() < MIN_IDENTIFIED_SERVICES;
            text_stale || sample_outgrown || audit
        }
    };

    RefreshPlan::Refresh { text }
}

/// Counts reviews published within the trailing 30 days, inclusive of the
/// window edge.
#[must_use]
pub fn reviews_in_last_30_days(reviews: &[ReviewRecord], now: DateTime<Utc>) -> u32 {
    let window_start = now - Duration::days(30);
    u32::try_from(
        reviews
            .iter()
            .filter(|r| r.published_at >= window_start)
            .count(),
    )
    .unwrap_or(u32::MAX)
}

/// Rounds to one decimal place, half away from zero (4.666 becomes 4.7).
#[must_use]
pub fn round_to_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Any review in the trailing window reads as upward momentum; none reads as
/// stable. `Down` is reserved and never produced here.
#[must_use]
pub fn trend_for(reviews_last_30_days: u32) -> VelocityTrend {
    if reviews_last_30_days > 0 {
        VelocityTrend::Up
    } else {
        VelocityTrend::Stable
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a review came from.
///
/// `Synthesized` marks reviews generated by the augmentation step; they are
/// never mixed back into provider data without this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSource {
    /// Fetched from the places provider.
    Primary,
    /// Submitted directly by the business.
    Direct,
    Other,
    /// Generated from a real sample by the augmentation step.
    Synthesized,
}

/// Access tier controlling review sample size and augmentation eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Public review sample only.
    Standard,
    /// Credentialed access; eligible for review augmentation.
    Elevated,
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Tier::Standard),
            "elevated" => Ok(Tier::Elevated),
            other => Err(format!("unknown tier '{other}' (expected standard|elevated)")),
        }
    }
}

/// One user review. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: String,
    pub author: String,
    /// 1–5 stars.
    pub rating: u8,
    pub text: String,
    pub published_at: DateTime<Utc>,
    pub source: ReviewSource,
}

/// Descriptive metadata for one place.
///
/// Produced by the fetcher; manual imports replace the whole value rather
/// than mutating individual fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub name: String,
    pub url: String,
    pub logo_url: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Direction of recent review volume.
///
/// `Down` is declared for completeness but the current refresh policy never
/// produces it: volume is `Up` whenever any review landed in the trailing
/// 30 days, otherwise `Stable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityTrend {
    Up,
    Down,
    Stable,
}

/// Output of one text-summarization call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSummary {
    pub identified_services: Vec<String>,
    pub positive_attributes: Vec<String>,
    pub narrative_overview: String,
}

/// The cached analysis result for one place key.
///
/// A bundle is a value: each refresh produces a wholly new bundle merging
/// freshly computed fields with carried-over ones. The two timestamps are
/// independent clocks (numeric fields refresh daily, text fields weekly)
/// and neither ordering between them is guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsBundle {
    /// Lifetime count reported by the provider, not the length of the
    /// locally held review list.
    pub total_review_count: u32,
    /// Average rating in [1, 5], rounded to one decimal place.
    pub average_score: f64,
    pub reviews_last_30_days: u32,
    pub velocity_trend: VelocityTrend,
    pub identified_services: Vec<String>,
    pub positive_attributes: Vec<String>,
    pub narrative_overview: String,
    /// Last time the numeric/velocity fields were recomputed.
    pub numeric_refreshed_at: DateTime<Utc>,
    /// Last time the text-analysis fields were recomputed.
    pub text_refreshed_at: DateTime<Utc>,
}

/// Everything cached under one place key: the profile, the review sample the
/// last refresh worked from, and the computed stats.
///
/// A fresh cache hit returns this value untouched, so exports keep working
/// against data up to a day old without any provider traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceBundle {
    pub profile: BusinessProfile,
    pub reviews: Vec<ReviewRecord>,
    pub stats: StatsBundle,
}

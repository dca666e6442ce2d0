//! Fetch pipeline: query resolution, provider fetch, and tier-gated
//! augmentation, producing the snapshot the engine merges into the cache.

use std::sync::Arc;

use rv_core::Tier;
use rv_gentext::GenTextClient;
use rv_places::{profile_from_details, reviews_from_details, PlacesClient};

use crate::engine::PlaceSnapshot;
use crate::AnalysisError;

/// Provider place identifiers start with this prefix.
const PLACE_ID_PREFIX: &str = "ChIJ";

/// Resolves queries against the places provider and assembles snapshots.
pub struct Fetcher {
    places: PlacesClient,
    gentext: Arc<GenTextClient>,
}

impl Fetcher {
    #[must_use]
    pub fn new(places: PlacesClient, gentext: Arc<GenTextClient>) -> Self {
        Self { places, gentext }
    }

    /// Resolves a free-text query or place identifier to the identifier.
    ///
    /// # Errors
    ///
    /// Propagates provider failures, including `NotFound` when a text query
    /// matches nothing.
    pub async fn resolve_place_id(&self, query: &str) -> Result<String, AnalysisError> {
        if looks_like_place_id(query) {
            return Ok(query.to_owned());
        }
        Ok(self.places.find_place(query).await?)
    }

    /// Fetches the profile and review sample for a place.
    ///
    /// Elevated tier asks the text provider to synthesize an extended review
    /// history from the public sample; that step is best-effort and any
    /// failure leaves the public sample as-is.
    ///
    /// # Errors
    ///
    /// Propagates provider failures from the details fetch.
    pub async fn snapshot(&self, place_id: &str, tier: Tier) -> Result<PlaceSnapshot, AnalysisError> {
        let details = self.places.place_details(place_id).await?;
        let profile = profile_from_details(&details);
        let mut reviews = reviews_from_details(&details);

        if tier == Tier::Elevated && !reviews.is_empty() {
            match self.gentext.augment(&reviews, &profile.name).await {
                Ok(extended) => {
                    tracing::info!(
                        place_id,
                        synthesized = extended.len(),
                        "extended review history from public sample"
                    );
                    reviews.extend(extended);
                }
                Err(e) => {
                    tracing::warn!(place_id, error = %e, "review augmentation failed, keeping public sample");
                }
            }
        }

        let total_review_count = details.user_ratings_total.unwrap_or(0);
        let average_rating = details.rating.unwrap_or(0.0);

        Ok(PlaceSnapshot {
            profile,
            reviews,
            total_review_count,
            average_rating,
        })
    }
}

/// Heuristic for whether a query is already a provider place identifier
/// rather than a business name to search for.
#[must_use]
pub fn looks_like_place_id(query: &str) -> bool {
    query.starts_with(PLACE_ID_PREFIX)
        && query.len() > PLACE_ID_PREFIX.len()
        && !query.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_ids_are_recognized() {
        assert!(looks_like_place_id("ChIJN1t_tDeuEmsRUsoyG83frY4"));
        assert!(!looks_like_place_id("ChIJ"));
        assert!(!looks_like_place_id("Harbor Dental Oakland"));
        assert!(!looks_like_place_id("ChIJ with spaces"));
    }
}

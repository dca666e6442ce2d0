//! Mapping from provider wire types to the core domain model.

use chrono::{DateTime, Utc};
use rv_core::{BusinessProfile, ReviewRecord, ReviewSource};

use crate::types::PlaceDetails;

/// Builds a [`BusinessProfile`] from the provider details payload.
///
/// Places without a website fall back to the provider's canonical place page;
/// the logo is a generated avatar keyed on the business name.
#[must_use]
pub fn profile_from_details(details: &PlaceDetails) -> BusinessProfile {
    let url = details.website.clone().unwrap_or_else(|| {
        format!(
            "https://www.google.com/maps/place/?q=place_id:{}",
            details.place_id
        )
    });
    let address = details.formatted_address.clone();
    let description = match &address {
        Some(addr) => format!("{} is a local business located in {addr}.", details.name),
        None => format!("{} is a local business.", details.name),
    };

    BusinessProfile {
        name: details.name.clone(),
        url,
        logo_url: format!(
            "https://ui-avatars.com/api/?name={}&background=random",
            details.name.replace(' ', "+")
        ),
        description,
        address,
        phone: details.formatted_phone_number.clone(),
        price_range: None,
        place_id: Some(details.place_id.clone()),
        categories: details.types.clone(),
    }
}

/// Converts the provider review page into domain records tagged `Primary`.
///
/// Reviews carrying an unrepresentable timestamp are dropped with a warning
/// rather than poisoning the 30-day window computation.
#[must_use]
pub fn reviews_from_details(details: &PlaceDetails) -> Vec<ReviewRecord> {
    details
        .reviews
        .iter()
        .enumerate()
        .filter_map(|(idx, r)| {
            let Some(published_at) = DateTime::<Utc>::from_timestamp(r.time, 0) else {
                tracing::warn!(
                    place_id = %details.place_id,
                    time = r.time,
                    "dropping review with unrepresentable timestamp"
                );
                return None;
            };
            Some(ReviewRecord {
                id: format!("p-{idx}-{}", uuid::Uuid::new_v4()),
                author: r.author_name.clone(),
                rating: r.rating,
                text: r.text.clone(),
                published_at,
                source: ReviewSource::Primary,
            })
        })
        .collect()
}

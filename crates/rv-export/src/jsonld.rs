//! Schema.org `LocalBusiness` structured data.
//!
//! The narrative overview is appended to the profile description so crawlers
//! and answer engines pick up the latest sentiment summary, and the 30-day
//! review count rides along as an `InteractionCounter` for agents that look
//! at velocity rather than lifetime totals.

use rv_core::{BusinessProfile, StatsBundle};
use serde_json::{json, Value};

/// Builds the `LocalBusiness` JSON-LD object for a place.
///
/// Rating fields are strings per schema.org convention; the interaction count
/// stays numeric.
#[must_use]
pub fn local_business_jsonld(profile: &BusinessProfile, stats: &StatsBundle) -> Value {
    let description = format!("{} {}", profile.description, stats.narrative_overview);

    let mut doc = json!({
        "@context": "https://schema.org",
        "@type": "LocalBusiness",
        "name": profile.name,
        "image": profile.logo_url,
        "url": profile.url,
        "description": description,
        "priceRange": profile.price_range.as_deref().unwrap_or("$$"),
        "aggregateRating": {
            "@type": "AggregateRating",
            "ratingValue": stats.average_score.to_string(),
            "reviewCount": stats.total_review_count.to_string(),
            "bestRating": "5",
            "worstRating": "1"
        },
        "interactionStatistic": {
            "@type": "InteractionCounter",
            "interactionType": "https://schema.org/WriteAction",
            "userInteractionCount": stats.reviews_last_30_days,
            "description": "Reviews in the last 30 days"
        }
    });

    if let Some(phone) = &profile.phone {
        doc["telephone"] = json!(phone);
    }
    if let Some(address) = &profile.address {
        doc["address"] = json!({
            "@type": "PostalAddress",
            "streetAddress": address
        });
    }

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rv_core::VelocityTrend;

    fn profile() -> BusinessProfile {
        BusinessProfile {
            name: "Harbor Dental".into(),
            url: "https://harbordental.example".into(),
            logo_url: "https://ui-avatars.com/api/?name=Harbor+Dental".into(),
            description: "Harbor Dental is a local business located in 1 Pier Rd.".into(),
            address: Some("1 Pier Rd".into()),
            phone: Some("+1 555 0100".into()),
            price_range: None,
            place_id: Some("ChIJabc123".into()),
            categories: vec!["dentist".into()],
        }
    }

    fn stats() -> StatsBundle {
        StatsBundle {
            total_review_count: 412,
            average_score: 4.7,
            reviews_last_30_days: 3,
            velocity_trend: VelocityTrend::Up,
            identified_services: vec!["cleaning".into()],
            positive_attributes: vec!["gentle".into()],
            narrative_overview: "Recent customer feedback highlights gentle care.".into(),
            numeric_refreshed_at: Utc.with_ymd_and_hms(2026, 8, 20, 8, 0, 0).single().unwrap(),
            text_refreshed_at: Utc.with_ymd_and_hms(2026, 8, 17, 8, 0, 0).single().unwrap(),
        }
    }

    #[test]
    fn overview_is_appended_to_the_description() {
        let doc = local_business_jsonld(&profile(), &stats());
        let desc = doc["description"].as_str().unwrap();
        assert!(desc.starts_with("Harbor Dental is a local business"));
        assert!(desc.ends_with("gentle care."));
    }

    #[test]
    fn rating_fields_are_strings_and_velocity_is_numeric() {
        let doc = local_business_jsonld(&profile(), &stats());
        assert_eq!(doc["aggregateRating"]["ratingValue"], "4.7");
        assert_eq!(doc["aggregateRating"]["reviewCount"], "412");
        assert_eq!(doc["aggregateRating"]["bestRating"], "5");
        assert_eq!(doc["interactionStatistic"]["userInteractionCount"], 3);
    }

    #[test]
    fn optional_fields_are_omitted_when_absent() {
        let mut p = profile();
        p.phone = None;
        p.address = None;
        let doc = local_business_jsonld(&p, &stats());
        assert!(doc.get("telephone").is_none());
        assert!(doc.get("address").is_none());
        assert_eq!(doc["priceRange"], "$$");
    }
}

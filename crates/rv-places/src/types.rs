//! Wire types for the places provider JSON envelopes.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct FindPlaceResponse {
    pub status: String,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub place_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailsResponse {
    pub status: String,
    pub result: Option<PlaceDetails>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Structured place profile as returned by the details endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceDetails {
    pub place_id: String,
    pub name: String,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    /// Provider returns at most its default page of most-recent reviews
    /// (commonly 5).
    #[serde(default)]
    pub reviews: Vec<WireReview>,
    #[serde(default)]
    pub types: Vec<String>,
}

/// One review as delivered by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct WireReview {
    pub author_name: String,
    pub rating: u8,
    pub text: String,
    /// Unix timestamp (seconds).
    pub time: i64,
}

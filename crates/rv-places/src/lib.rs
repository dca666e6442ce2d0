//! HTTP client for the places provider.
//!
//! Resolves a free-text query to a place identifier, fetches the structured
//! profile plus the public review page for a place, and maps provider status
//! codes onto distinct error kinds so callers can render specific messages.

mod client;
mod error;
mod normalize;
mod retry;
mod types;

pub use client::PlacesClient;
pub use error::PlacesError;
pub use normalize::{profile_from_details, reviews_from_details};
pub use types::{PlaceDetails, WireReview};

//! HTTP client for the generative-text provider.
//!
//! Turns a batch of reviews into a structured summary (strict JSON output
//! schema), synthesizes plausible historical reviews from a small real sample
//! (augmentation), and structures pasted free-text reviews for manual import.

mod client;
mod error;
mod prompt;

use std::future::Future;

use rv_core::{ReviewRecord, TextSummary};

pub use client::GenTextClient;
pub use error::GenTextError;

/// Seam between the analysis engine and the text summarizer, so the cache
/// policy can be exercised against a deterministic fake.
pub trait Summarize: Send + Sync {
    /// Produce the three text-analysis fields from a review batch.
    ///
    /// Implementations must degrade gracefully: unusable provider output
    /// yields empty lists and a fallback overview rather than an error.
    fn summarize(
        &self,
        reviews: &[ReviewRecord],
        total_count: u32,
        average_rating: f64,
        audit: bool,
    ) -> impl Future<Output = Result<TextSummary, GenTextError>> + Send;
}

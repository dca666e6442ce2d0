//! Prompt construction for the three generation tasks.
//!
//! The summarize prompt has two modes: standard mode extracts strictly from
//! the supplied sample with framing calibrated to sample size; audit mode is
//! used for prospective/demo contexts where only a small public sample
//! exists and instructs confident, promotional inference beyond it.

use chrono::{DateTime, Utc};
use rv_core::ReviewRecord;

/// Reviews beyond this count are dropped from the prompt (most recent first).
pub(crate) const SAMPLE_CAP: usize = 50;

/// Raw import text beyond this many characters is truncated.
pub(crate) const IMPORT_CHAR_CAP: usize = 10_000;

fn review_context(sample: &[ReviewRecord]) -> String {
    sample
        .iter()
        .map(|r| {
            format!(
                "[{}] {} Stars: {}",
                r.published_at.format("%Y-%m-%d"),
                r.rating,
                r.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn standard_instruction() -> &'static str {
    "1. Identify specific services/products mentioned.\n\
     2. Extract positive attributes.\n\
     3. Write a concise overview.\n\
        - Focus on the quality and recency of the feedback.\n\
        - If the input sample contains roughly 25 or more reviews, open with \
          \"Based on a deep analysis of N recent reviews...\".\n\
        - If the sample is small (around 5 reviews), open with \
          \"Recent customer feedback highlights...\".\n\
        - Be professional and marketing-forward."
}

fn audit_instruction() -> &'static str {
    "AUDIT MODE ENABLED\n\
     The user is auditing this business. The provided reviews are only the most \
     recent public sample.\n\
     1. Infer likely services based on the business category and the limited text.\n\
     2. Write a high-energy, comprehensive overview that demonstrates what their \
        reputation looks like.\n\
     3. Use phrases like \"Consistently high-rated...\" and \"Customers frequently \
        praise...\".\n\
     4. Fill gaps with industry-standard positive traits for this business type."
}

/// Builds the summarize prompt. `reviews` must already be capped to
/// [`SAMPLE_CAP`] by the caller.
pub(crate) fn summarize_prompt(
    reviews: &[ReviewRecord],
    total_count: u32,
    average_rating: f64,
    audit: bool,
) -> String {
    let instruction = if audit {
        audit_instruction()
    } else {
        standard_instruction()
    };

    format!(
        "You are an expert sentiment analysis model.\n\n\
         BUSINESS CONTEXT:\n\
         Total Lifetime Reviews: {total_count}\n\
         Average Rating: {average_rating}\n\
         Recent Sample Reviews ({}):\n{}\n\n\
         INSTRUCTIONS:\n{instruction}\n\n\
         OUTPUT JSON:",
        reviews.len(),
        review_context(reviews)
    )
}

/// Builds the augmentation prompt: synthesize a plausible earlier review
/// history from the supplied real sample.
pub(crate) fn augment_prompt(sample: &[ReviewRecord], business_name: &str) -> String {
    let context = sample
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "I have {} real reviews for {business_name}. Simulate the previous 20 reviews.\n\
         Generate 20 realistic short reviews consistent with the examples.\n\
         REAL EXAMPLES:\n{context}\n\
         OUTPUT a JSON ARRAY of objects: {{ author, rating, text, date (ISO 8601) }}",
        sample.len()
    )
}

/// Builds the raw-import prompt: structure pasted review text into records.
/// The current instant anchors relative dates ("a month ago").
pub(crate) fn parse_prompt(raw_text: &str, now: DateTime<Utc>) -> String {
    let truncated: String = raw_text.chars().take(IMPORT_CHAR_CAP).collect();
    format!(
        "Clean this pasted review text into JSON. Current date: {}.\n\
         Extract a JSON ARRAY of objects: {{ author, rating (1-5), text, date (ISO 8601) }}.\n\
         Text:\n{truncated}",
        now.to_rfc3339()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rv_core::ReviewSource;

    fn review(text: &str) -> ReviewRecord {
        ReviewRecord {
            id: "r1".into(),
            author: "Pat".into(),
            rating: 5,
            text: text.into(),
            published_at: Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).single().unwrap(),
            source: ReviewSource::Primary,
        }
    }

    #[test]
    fn standard_prompt_demands_strict_extraction() {
        let prompt = summarize_prompt(&[review("great haircut")], 120, 4.6, false);
        assert!(prompt.contains("Total Lifetime Reviews: 120"));
        assert!(prompt.contains("[2026-07-01] 5 Stars: great haircut"));
        assert!(prompt.contains("Recent customer feedback highlights"));
        assert!(!prompt.contains("AUDIT MODE"));
    }

    #[test]
    fn audit_prompt_instructs_inference() {
        let prompt = summarize_prompt(&[review("great haircut")], 120, 4.6, true);
        assert!(prompt.contains("AUDIT MODE ENABLED"));
        assert!(prompt.contains("Infer likely services"));
        assert!(!prompt.contains("deep analysis"));
    }

    #[test]
    fn parse_prompt_truncates_long_input() {
        let raw = "x".repeat(IMPORT_CHAR_CAP + 500);
        let now = Utc.with_ymd_and_hms(2026, 8, 23, 0, 0, 0).single().unwrap();
        let prompt = parse_prompt(&raw, now);
        let x_count = prompt.chars().filter(|c| *c == 'x').count();
        assert_eq!(x_count, IMPORT_CHAR_CAP);
    }

    #[test]
    fn augment_prompt_includes_sample_texts() {
        let prompt = augment_prompt(&[review("quick and tidy")], "Harbor Dental");
        assert!(prompt.contains("Harbor Dental"));
        assert!(prompt.contains("quick and tidy"));
    }
}

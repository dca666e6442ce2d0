//! Embed generation: the live iframe snippet, the zero-cost static HTML
//! snapshot, and the schema.org structured data both carry.
//!
//! Everything produced here is meant to be pasted into third-party pages, so
//! nothing in this crate may ever emit a credential or any marker of the
//! access tier the data was fetched under.

mod embed;
mod jsonld;
mod static_html;

pub use embed::live_iframe;
pub use jsonld::local_business_jsonld;
pub use static_html::static_snapshot;

/// Minimal HTML escaping for text interpolated into generated markup.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape_html(r#"<b>"Bob & Sons'"</b>"#),
            "&lt;b&gt;&quot;Bob &amp; Sons&#39;&quot;&lt;/b&gt;"
        );
    }
}

//! The live-iframe embed snippet.

use rv_core::BusinessProfile;

use crate::escape_html;

/// Builds the copy-paste iframe snippet pointing at the hosted widget.
///
/// The widget URL carries only the place identifier. Credentials and tier
/// markers are deliberately left out so the snippet is safe to publish on
/// any third-party page.
#[must_use]
pub fn live_iframe(public_base_url: &str, profile: &BusinessProfile) -> String {
    let base = public_base_url.trim_end_matches('/');
    let place_id_param = profile
        .place_id
        .as_deref()
        .map(|id| format!("?place_id={id}"))
        .unwrap_or_default();
    let widget_url = format!("{base}/widget{place_id_param}");
    let title = escape_html(&profile.name);

    format!(
        "<!-- ReviewVelocity Live Widget -->\n\
         <iframe\n\
         \u{20} src=\"{widget_url}\"\n\
         \u{20} width=\"100%\"\n\
         \u{20} height=\"600\"\n\
         \u{20} style=\"border:none; overflow:hidden; max-width: 600px; margin: 0 auto; display: block; border-radius: 16px;\"\n\
         \u{20} title=\"Live Business Intelligence for {title}\"\n\
         \u{20} loading=\"lazy\"\n\
         ></iframe>\n\
         <!-- End Widget -->\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> BusinessProfile {
        BusinessProfile {
            name: "Bob & Sons".into(),
            url: "https://bobandsons.example".into(),
            logo_url: "https://ui-avatars.com/api/?name=Bob+%26+Sons".into(),
            description: "Bob & Sons is a local business.".into(),
            address: None,
            phone: None,
            price_range: None,
            place_id: Some("ChIJabc123".into()),
            categories: Vec::new(),
        }
    }

    #[test]
    fn iframe_points_at_the_widget_with_only_the_place_id() {
        let snippet = live_iframe("https://rv.example/", &profile());
        assert!(snippet.contains("src=\"https://rv.example/widget?place_id=ChIJabc123\""));
        assert!(!snippet.contains("credential"));
        assert!(!snippet.contains("token"));
        assert!(!snippet.contains("elevated"));
    }

    #[test]
    fn iframe_title_escapes_the_business_name() {
        let snippet = live_iframe("https://rv.example", &profile());
        assert!(snippet.contains("Bob &amp; Sons"));
    }

    #[test]
    fn missing_place_id_yields_a_bare_widget_url() {
        let mut p = profile();
        p.place_id = None;
        let snippet = live_iframe("https://rv.example", &p);
        assert!(snippet.contains("src=\"https://rv.example/widget\""));
    }
}

//! The static snapshot embed: a self-contained HTML card plus JSON-LD,
//! rendered once from cached data so host pages pay no runtime cost.

use chrono::{DateTime, Utc};
use rv_core::{BusinessProfile, StatsBundle, VelocityTrend};

use crate::escape_html;
use crate::jsonld::local_business_jsonld;

/// Renders the static HTML snapshot for a place.
///
/// The card shows the one-decimal average, lifetime count, 30-day count with
/// a trend badge, up to five identified services, the narrative overview,
/// and up to three positive attributes, followed by the `LocalBusiness`
/// JSON-LD in a script tag. All interpolated text is HTML-escaped.
#[must_use]
pub fn static_snapshot(
    profile: &BusinessProfile,
    stats: &StatsBundle,
    generated_at: DateTime<Utc>,
) -> String {
    let name = escape_html(&profile.name);
    let overview = escape_html(&stats.narrative_overview);
    let formatted_date = generated_at.format("%b %-d, %H:%M UTC");

    let trend_badge = if stats.velocity_trend == VelocityTrend::Up {
        r#"<div style="margin-top: 8px; font-size: 10px; background: #eff6ff; color: #2563eb; padding: 2px 8px; border-radius: 4px; font-weight: bold;">Trending Up &#8599;</div>"#
    } else {
        r#"<div style="margin-top: 8px; font-size: 10px; background: #f1f5f9; color: #64748b; padding: 2px 8px; border-radius: 4px; font-weight: bold;">Stable Volume</div>"#
    };

    let services = stats
        .identified_services
        .iter()
        .take(5)
        .map(|s| {
            format!(
                r#"<span style="padding: 4px 8px; background: white; border: 1px solid #e2e8f0; border-radius: 4px; font-size: 11px; font-weight: bold; color: #475569; text-transform: capitalize;">{}</span>"#,
                escape_html(s)
            )
        })
        .collect::<Vec<_>>()
        .join("\n            ");

    let attributes = stats
        .positive_attributes
        .iter()
        .take(3)
        .map(|a| {
            format!(
                r#"<span style="font-size: 10px; color: #15803d; background: #f0fdf4; padding: 2px 8px; border-radius: 99px; border: 1px solid #dcfce7; text-transform: capitalize;">&#10003; {}</span>"#,
                escape_html(a)
            )
        })
        .collect::<Vec<_>>()
        .join("\n            ");

    let jsonld = local_business_jsonld(profile, stats).to_string();

    format!(
        r#"<!-- ReviewVelocity Static Snapshot (Generated: {formatted_date}) -->
<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto; background: white; border-radius: 16px; overflow: hidden; box-shadow: 0 4px 20px rgba(0,0,0,0.08); border: 1px solid #e2e8f0;">
  <div style="background: linear-gradient(to right, #312e81, #1e3a8a); padding: 16px; color: white;">
    <div style="font-size: 11px; font-weight: bold; letter-spacing: 0.5px; color: #bfdbfe; margin-bottom: 4px;">Live Business Intelligence</div>
    <h1 style="font-size: 18px; font-weight: bold; margin: 0; overflow: hidden; text-overflow: ellipsis; white-space: nowrap;">{name}</h1>
  </div>
  <div style="padding: 20px;">
    <div style="display: flex; justify-content: space-between; border-bottom: 1px solid #f1f5f9; padding-bottom: 16px; margin-bottom: 16px;">
      <div>
        <div style="display: flex; align-items: baseline; gap: 4px;">
          <span style="font-size: 36px; font-weight: 800; color: #0f172a;">{average}</span>
          <span style="font-size: 18px; font-weight: 500; color: #94a3b8;">/ 5</span>
        </div>
        <div style="color: #facc15; font-size: 14px;">&#9733;&#9733;&#9733;&#9733;&#9733;</div>
        <div style="font-size: 11px; font-weight: bold; color: #64748b; margin-top: 4px; letter-spacing: 0.5px;">Verified Reviews ({total})</div>
      </div>
      <div style="text-align: right;">
        <div style="font-size: 24px; font-weight: bold; color: #1e293b;">+{last30}</div>
        <div style="font-size: 10px; background: #dcfce7; color: #15803d; padding: 2px 8px; border-radius: 999px; font-weight: bold; display: inline-block;">Last 30 Days</div>
        {trend_badge}
      </div>
    </div>
    <div style="background: #f8fafc; border-radius: 12px; padding: 16px; display: flex; gap: 16px;">
      <div style="flex: 1; border-right: 1px solid #f1f5f9; padding-right: 8px;">
        <h3 style="font-size: 10px; font-weight: bold; color: #94a3b8; margin: 0 0 8px 0;">Identified Services</h3>
        <div style="display: flex; flex-direction: column; gap: 4px;">
            {services}
        </div>
      </div>
      <div style="flex: 2;">
        <h3 style="font-size: 10px; font-weight: bold; color: #60a5fa; margin: 0 0 8px 0;">Summary</h3>
        <div style="background: white; border: 1px solid #dbeafe; border-radius: 8px; padding: 12px;">
            <p style="font-size: 12px; color: #334155; line-height: 1.5; margin: 0; font-style: italic;">"{overview}"</p>
        </div>
        <div style="margin-top: 8px; display: flex; flex-wrap: wrap; gap: 4px;">
            {attributes}
        </div>
      </div>
    </div>
  </div>
  <div style="background: #0f172a; color: white; padding: 10px 16px; display: flex; justify-content: space-between; align-items: center; font-size: 9px;">
    <div style="display: flex; align-items: center; gap: 8px;">
      <strong style="font-size: 10px; letter-spacing: 0.5px;">Review Velocity&trade;</strong>
      <span style="color: white; border-left: 1px solid #334155; padding-left: 8px; font-weight: bold;">Updated: {formatted_date}</span>
    </div>
    <span style="background: #1e293b; color: #cbd5e1; padding: 2px 6px; border-radius: 4px;">Schema.org Ready</span>
  </div>
</div>
<script type="application/ld+json">
{jsonld}
</script>
"#,
        average = stats.average_score,
        total = stats.total_review_count,
        last30 = stats.reviews_last_30_days,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn profile() -> BusinessProfile {
        BusinessProfile {
            name: "Harbor <Dental>".into(),
            url: "https://harbordental.example".into(),
            logo_url: "https://ui-avatars.com/api/?name=Harbor+Dental".into(),
            description: "Harbor Dental is a local business.".into(),
            address: Some("1 Pier Rd".into()),
            phone: None,
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
            identified_services: vec![
                "cleaning".into(),
                "whitening".into(),
                "crowns".into(),
                "implants".into(),
                "braces".into(),
                "x-rays".into(),
            ],
            positive_attributes: vec![
                "gentle".into(),
                "punctual".into(),
                "clear pricing".into(),
                "friendly".into(),
            ],
            narrative_overview: "Recent customer feedback highlights gentle care.".into(),
            numeric_refreshed_at: Utc.with_ymd_and_hms(2026, 8, 20, 8, 0, 0).single().unwrap(),
            text_refreshed_at: Utc.with_ymd_and_hms(2026, 8, 17, 8, 0, 0).single().unwrap(),
        }
    }

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 23, 9, 30, 0).single().unwrap()
    }

    #[test]
    fn snapshot_shows_stats_and_trend_badge() {
        let html = static_snapshot(&profile(), &stats(), generated_at());
        assert!(html.contains(">4.7<"));
        assert!(html.contains("Verified Reviews (412)"));
        assert!(html.contains("+3"));
        assert!(html.contains("Trending Up"));
    }

    #[test]
    fn stable_trend_gets_the_quiet_badge() {
        let mut s = stats();
        s.reviews_last_30_days = 0;
        s.velocity_trend = VelocityTrend::Stable;
        let html = static_snapshot(&profile(), &s, generated_at());
        assert!(html.contains("Stable Volume"));
        assert!(!html.contains("Trending Up"));
    }

    #[test]
    fn services_cap_at_five_and_attributes_at_three() {
        let html = static_snapshot(&profile(), &stats(), generated_at());
        assert!(html.contains("braces"));
        assert!(!html.contains("x-rays"));
        assert!(html.contains("clear pricing"));
        assert!(!html.contains("friendly"));
    }

    #[test]
    fn business_name_is_escaped() {
        let html = static_snapshot(&profile(), &stats(), generated_at());
        assert!(html.contains("Harbor &lt;Dental&gt;"));
        assert!(!html.contains("Harbor <Dental>"));
    }

    #[test]
    fn snapshot_embeds_the_jsonld_script() {
        let html = static_snapshot(&profile(), &stats(), generated_at());
        assert!(html.contains(r#"<script type="application/ld+json">"#));
        assert!(html.contains(r#""@type":"LocalBusiness""#));
        assert!(html.contains(r#""userInteractionCount":3"#));
    }

    #[test]
    fn snapshot_never_leaks_credentials_or_tier() {
        let html = static_snapshot(&profile(), &stats(), generated_at());
        let lowered = html.to_lowercase();
        assert!(!lowered.contains("credential"));
        assert!(!lowered.contains("token"));
        assert!(!lowered.contains("api_key"));
        assert!(!lowered.contains("elevated"));
        assert!(!lowered.contains("standard"));
    }
}

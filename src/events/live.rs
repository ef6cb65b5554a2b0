// src/events/live.rs
//! Live space-weather events: DONKI notifications normalized into feed events.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use metrics::counter;
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::events::types::{parse_event_date, Event, EventKind};
use crate::sources::{NotificationFeed, RawNotification};

/// First id handed to a live event. Curated ids stay below it.
pub const LIVE_ID_BASE: i64 = 1000;
pub const LOOKBACK_DAYS: i64 = 7;
pub const LOOKAHEAD_DAYS: i64 = 30;
pub const DESCRIPTION_MAX_CHARS: usize = 300;
pub const LIVE_PRIORITY: u8 = 1;

const SPACE_WEATHER_IMAGES: &[(&str, &str)] = &[
    (
        "IPS",
        "https://images.unsplash.com/photo-1614728894747-a83421e2b9c9?ixlib=rb-4.0.3&auto=format&fit=crop&w=1000&q=80",
    ),
    ("CME", "https://www.nasa.gov/wp-content/uploads/2023/05/sun-1024x576.jpg"),
    ("FLR", "https://www.nasa.gov/wp-content/uploads/2023/05/solar-flare-1024x576.jpg"),
    ("SEP", "https://www.nasa.gov/wp-content/uploads/2023/05/radiation-storm-1024x576.jpg"),
    ("GST", "https://www.nasa.gov/wp-content/uploads/2023/05/geomagnetic-storm-1024x576.jpg"),
];
const SPACE_WEATHER_DEFAULT_IMAGE: &str =
    "https://www.nasa.gov/wp-content/uploads/2023/05/space-weather-1024x576.jpg";

/// Inclusive query window: 7 days back, 30 days ahead of `now`.
pub fn query_window(now: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    let start = now - Duration::days(LOOKBACK_DAYS);
    let end = now + Duration::days(LOOKAHEAD_DAYS);
    (start.date_naive(), end.date_naive())
}

pub fn space_weather_image(subtype: &str) -> &'static str {
    SPACE_WEATHER_IMAGES
        .iter()
        .find(|(code, _)| *code == subtype)
        .map(|(_, url)| *url)
        .unwrap_or(SPACE_WEATHER_DEFAULT_IMAGE)
}

/// Message body with HTML entities decoded (`&amp;` -> `&`).
pub fn decode_body(body: &str) -> String {
    html_escape::decode_html_entities(body).to_string()
}

/// Short card text: entities decoded, markers stripped, single line,
/// capped at 300 chars plus `...`.
pub fn format_description(raw: &RawNotification, message_type: &str, issued: DateTime<Utc>) -> String {
    match raw.message_body.as_deref() {
        Some(body) if !body.is_empty() => {
            static RE_NL: OnceCell<Regex> = OnceCell::new();
            let re_nl = RE_NL.get_or_init(|| Regex::new(r"\r?\n").unwrap());
            let flat = re_nl
                .replace_all(&decode_body(body).replace("##", ""), " ")
                .to_string();
            let mut out: String = flat.chars().take(DESCRIPTION_MAX_CHARS).collect();
            out.push_str("...");
            out
        }
        _ => format!(
            "Space weather event detected: {}. Issued on {}.",
            message_type,
            issued.format("%-m/%-d/%Y")
        ),
    }
}

/// Drop records without a category or a readable issue time, then normalize
/// survivors with sequential ids from `LIVE_ID_BASE` in feed order.
pub fn normalize_notifications(raw: Vec<RawNotification>) -> Vec<Event> {
    let total = raw.len();
    let mut out = Vec::with_capacity(total);

    for record in raw {
        let Some(message_type) = record
            .message_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
        else {
            continue;
        };
        let Some(issue_time) = record.message_issue_time.clone() else {
            continue;
        };
        let Some(issued) = parse_event_date(&issue_time) else {
            continue;
        };

        let subtype = message_type
            .split(' ')
            .next()
            .unwrap_or(message_type.as_str())
            .to_string();
        let title = record
            .message_title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| format!("{subtype} Event"));

        out.push(Event {
            id: LIVE_ID_BASE + out.len() as i64,
            title,
            date: issue_time,
            kind: EventKind::SpaceWeather,
            image_url: space_weather_image(&subtype).to_string(),
            description: format_description(&record, &message_type, issued),
            subtype: Some(subtype),
            location: "Space".to_string(),
            is_real_event: true,
            priority: LIVE_PRIORITY,
            raw_data: Some(record),
        });
    }

    let dropped = total - out.len();
    if dropped > 0 {
        tracing::debug!(target: "sources", dropped, "dropped malformed notifications");
        counter!("live_records_dropped_total").increment(dropped as u64);
    }
    out
}

/// Query the live feed for the window around `now`. Failures yield an empty list.
pub async fn fetch_live_events(feed: &dyn NotificationFeed, now: DateTime<Utc>) -> Vec<Event> {
    let (start, end) = query_window(now);
    match feed.notifications(start, end).await {
        Ok(raw) => normalize_notifications(raw),
        Err(e) => {
            tracing::warn!(target: "sources", error = ?e, provider = feed.name(), "live feed error");
            counter!("source_errors_total", "source" => feed.name()).increment(1);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn note(kind: Option<&str>, time: Option<&str>) -> RawNotification {
        RawNotification {
            message_type: kind.map(str::to_string),
            message_issue_time: time.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn window_spans_week_back_month_ahead() {
        let now = Utc.with_ymd_and_hms(2025, 7, 3, 15, 0, 0).unwrap();
        let (start, end) = query_window(now);
        assert_eq!(start.to_string(), "2025-06-26");
        assert_eq!(end.to_string(), "2025-08-02");
    }

    #[test]
    fn malformed_records_are_dropped_and_ids_stay_sequential() {
        let raw = vec![
            note(Some("FLR"), Some("2025-07-01T10:00Z")),
            note(None, Some("2025-07-01T11:00Z")),
            note(Some("CME"), None),
            note(Some("GST"), Some("whenever")),
            note(Some("Report"), Some("2025-07-02T09:00Z")),
        ];
        let out = normalize_notifications(raw);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, 1000);
        assert_eq!(out[1].id, 1001);
        assert_eq!(out[1].subtype.as_deref(), Some("Report"));
        assert!(out.iter().all(|e| e.is_real_event && e.priority == 1));
        assert!(out.iter().all(|e| e.location == "Space"));
    }

    #[test]
    fn title_and_image_follow_subtype() {
        let out = normalize_notifications(vec![note(Some("CME Analysis"), Some("2025-07-01T10:00Z"))]);
        assert_eq!(out[0].title, "CME Event");
        assert_eq!(out[0].subtype.as_deref(), Some("CME"));
        assert_eq!(out[0].image_url, space_weather_image("CME"));
        assert_eq!(space_weather_image("RBE"), SPACE_WEATHER_DEFAULT_IMAGE);
    }

    #[test]
    fn long_body_is_flattened_and_capped() {
        let mut raw = note(Some("FLR"), Some("2025-07-01T10:00Z"));
        raw.message_body = Some(format!("## Summary:\n{}", "x".repeat(400)));
        let issued = parse_event_date("2025-07-01T10:00Z").unwrap();
        let d = format_description(&raw, "FLR", issued);
        assert!(d.starts_with(" Summary: x"));
        assert!(!d.contains('\n'));
        assert!(d.ends_with("..."));
        assert_eq!(d.chars().count(), DESCRIPTION_MAX_CHARS + 3);
    }

    #[test]
    fn missing_body_gets_generated_text() {
        let raw = note(Some("SEP"), Some("2025-07-01T10:00Z"));
        let issued = parse_event_date("2025-07-01T10:00Z").unwrap();
        assert_eq!(
            format_description(&raw, "SEP", issued),
            "Space weather event detected: SEP. Issued on 7/1/2025."
        );
    }

    #[test]
    fn entities_in_body_are_decoded() {
        let mut raw = note(Some("CME"), Some("2025-07-01T10:00Z"));
        raw.message_body = Some("## Notes:\nCME &amp; flare, Kp &gt; 5".into());
        let issued = parse_event_date("2025-07-01T10:00Z").unwrap();
        assert_eq!(
            format_description(&raw, "CME", issued),
            " Notes: CME & flare, Kp > 5..."
        );
    }
}

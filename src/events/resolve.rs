// src/events/resolve.rs
use crate::events::aggregate::Aggregator;
use crate::events::live::decode_body;
use crate::events::types::{Event, EventDetail, EventKind, Link};
use crate::sources::FALLBACK_IMAGE;

pub const LIVE_SOURCE_LABEL: &str = "NASA Space Weather Database";
pub const REPORT_LINK_TITLE: &str = "NASA Official Report";

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(EventDetail),
    NotFound,
}

impl Resolution {
    /// Collapse into a displayable record; absence becomes the not-found event.
    pub fn into_detail(self) -> EventDetail {
        match self {
            Resolution::Found(d) => d,
            Resolution::NotFound => EventDetail::from(not_found_event()),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

pub fn not_found_event() -> Event {
    Event {
        id: 0,
        title: "Event Not Found".to_string(),
        date: String::new(),
        kind: EventKind::Unknown,
        subtype: None,
        location: String::new(),
        image_url: FALLBACK_IMAGE.to_string(),
        description: "The requested event could not be found.".to_string(),
        is_real_event: false,
        priority: 0,
        raw_data: None,
    }
}

/// Leading-integer parse: optional sign then digits, trailing text ignored.
/// `"7"` and `"7-perseids"` give 7; `"custom-1712"` gives `None`.
pub fn parse_event_id(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let digits: &str = {
        let end = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        &rest[..end]
    };
    digits.parse::<i64>().ok().map(|n| sign * n)
}

/// Live events gain the unabridged body, a provenance label and report links.
/// Curated events pass through untouched.
pub fn enrich(event: Event) -> EventDetail {
    if !event.is_real_event {
        return EventDetail::from(event);
    }
    let raw = event.raw_data.as_ref();
    let full_description = raw
        .and_then(|r| r.message_body.as_deref())
        .filter(|b| !b.is_empty())
        .map(decode_body)
        .unwrap_or_else(|| event.description.clone());
    let links = raw
        .and_then(|r| r.message_url.clone())
        .filter(|u| !u.trim().is_empty())
        .map(|url| {
            vec![Link {
                url,
                title: REPORT_LINK_TITLE.to_string(),
            }]
        })
        .unwrap_or_default();

    EventDetail {
        event,
        full_description: Some(full_description),
        source: Some(LIVE_SOURCE_LABEL.to_string()),
        links: Some(links),
    }
}

pub fn find_in_feed(feed: &[Event], id: i64) -> Resolution {
    feed.iter()
        .find(|e| e.id == id)
        .cloned()
        .map(|e| Resolution::Found(enrich(e)))
        .unwrap_or(Resolution::NotFound)
}

/// Fresh feed per call, then a linear scan. No caching between lookups.
pub async fn resolve(aggregator: &Aggregator, raw_id: &str) -> Resolution {
    let Some(id) = parse_event_id(raw_id) else {
        tracing::debug!(target: "aggregate", raw_id, "event id is not numeric");
        return Resolution::NotFound;
    };
    let feed = aggregator.upcoming_events().await;
    let out = find_in_feed(&feed, id);
    if !out.is_found() {
        tracing::info!(target: "aggregate", id, "event not in current feed");
    }
    out
}

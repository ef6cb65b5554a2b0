// src/events/types.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sources::RawNotification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "Meteor Shower")]
    MeteorShower,
    #[serde(rename = "Planetary Event")]
    PlanetaryEvent,
    Eclipse,
    #[serde(rename = "Planetary Conjunction")]
    PlanetaryConjunction,
    #[serde(rename = "Space Weather")]
    SpaceWeather,
    /// Only carried by the not-found record.
    Unknown,
}

/// Normalized feed entry. Both sources produce this shape before merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub title: String,
    /// ISO-8601 start instant. Empty only on the not-found record.
    pub date: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default)]
    pub location: String,
    pub image_url: String,
    pub description: String,
    pub is_real_event: bool,
    #[serde(default)]
    pub priority: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<RawNotification>,
}

impl Event {
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        parse_event_date(&self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub title: String,
}

/// Event as returned by single-event lookup. Live events carry the extra fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
}

impl From<Event> for EventDetail {
    fn from(event: Event) -> Self {
        Self {
            event,
            full_description: None,
            source: None,
            links: None,
        }
    }
}

/// Accepts RFC 3339, DONKI minute precision (`2025-07-01T12:30Z`),
/// naive date-times (read as UTC) and bare dates.
pub fn parse_event_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%dT%H:%MZ",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

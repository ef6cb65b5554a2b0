// src/schedule.rs
//! Time math for the calendar view and reminder notifications.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;

use crate::events::{parse_event_date, Event};
use crate::store::Reminder;

/// Events carry only a start; the calendar shows them for one hour.
pub const DISPLAY_WINDOW_MINUTES: i64 = 60;

pub fn display_window(start: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (start, start + ChronoDuration::minutes(DISPLAY_WINDOW_MINUTES))
}

/// Wait before notifying `minutes_before` ahead of `event_start`.
/// `None` once that moment is now or past.
pub fn notification_delay(
    event_start: DateTime<Utc>,
    minutes_before: u32,
    now: DateTime<Utc>,
) -> Option<std::time::Duration> {
    let fire_at = event_start - ChronoDuration::minutes(i64::from(minutes_before));
    let wait = fire_at.signed_duration_since(now);
    if wait <= ChronoDuration::zero() {
        return None;
    }
    wait.to_std().ok()
}

/// A reminder whose notification has not fired yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingNotification {
    pub id: String,
    pub title: String,
    pub fire_at: DateTime<Utc>,
    pub delay_secs: u64,
}

/// Next notification per reminder, soonest first. Reminders that are
/// undated or already past their lead time are left out.
pub fn pending_notifications(
    reminders: &[Reminder],
    minutes_before: u32,
    now: DateTime<Utc>,
) -> Vec<PendingNotification> {
    let mut out: Vec<PendingNotification> = reminders
        .iter()
        .filter_map(|r| {
            let start = parse_event_date(&r.date)?;
            let delay = notification_delay(start, minutes_before, now)?;
            Some(PendingNotification {
                id: r.id.clone(),
                title: r.title.clone(),
                fire_at: start - ChronoDuration::minutes(i64::from(minutes_before)),
                delay_secs: delay.as_secs(),
            })
        })
        .collect();
    out.sort_by_key(|p| p.fire_at);
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub is_reminder: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Event>,
}

/// Feed events plus custom reminders as calendar entries.
/// Entries whose date cannot be read are left out.
pub fn calendar_entries(feed: &[Event], reminders: &[Reminder]) -> Vec<CalendarEntry> {
    let mut out: Vec<CalendarEntry> = feed
        .iter()
        .filter_map(|ev| {
            let (start, end) = display_window(ev.starts_at()?);
            let id = ev.id.to_string();
            Some(CalendarEntry {
                is_reminder: reminders.iter().any(|r| r.id == id),
                id,
                title: ev.title.clone(),
                start,
                end,
                all_day: false,
                description: Some(ev.description.clone()),
                resource: Some(ev.clone()),
            })
        })
        .collect();

    out.extend(reminders.iter().filter(|r| r.is_custom()).filter_map(|r| {
        let (start, end) = display_window(parse_event_date(&r.date)?);
        Some(CalendarEntry {
            id: r.id.clone(),
            title: r.title.clone(),
            start,
            end,
            all_day: false,
            is_reminder: true,
            description: r.description.clone(),
            resource: None,
        })
    }));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::resolve::not_found_event;
    use chrono::TimeZone;

    #[test]
    fn delay_is_lead_time_before_start() {
        let now = Utc.with_ymd_and_hms(2025, 8, 11, 22, 0, 0).unwrap();
        let start = Utc.with_ymd_and_hms(2025, 8, 12, 0, 0, 0).unwrap();
        let d = notification_delay(start, 60, now).unwrap();
        assert_eq!(d.as_secs(), 3600);
    }

    #[test]
    fn past_moment_gives_none() {
        let start = Utc.with_ymd_and_hms(2025, 8, 12, 0, 0, 0).unwrap();
        let now = start - ChronoDuration::minutes(30);
        assert!(notification_delay(start, 60, now).is_none());
        assert!(notification_delay(start, 30, now).is_none());
    }

    #[test]
    fn pending_notifications_skip_past_and_undated() {
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap();
        let later = Reminder {
            id: "7".into(),
            title: "Perseid Meteor Shower".into(),
            date: "2025-08-12T22:00:00".into(),
            description: None,
            image_url: None,
        };
        let sooner = Reminder {
            id: "1000".into(),
            title: "CME Impact Alert".into(),
            date: "2025-08-01T02:00:00Z".into(),
            ..later.clone()
        };
        let past = Reminder {
            id: "1".into(),
            date: "2025-07-01T00:00:00".into(),
            ..later.clone()
        };
        let undated = Reminder {
            id: "2".into(),
            date: "soon".into(),
            ..later.clone()
        };

        let out = pending_notifications(&[later, past, undated, sooner], 60, now);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, "1000");
        assert_eq!(out[0].delay_secs, 3600);
        assert_eq!(out[1].id, "7");
        assert_eq!(out[1].fire_at, Utc.with_ymd_and_hms(2025, 8, 12, 21, 0, 0).unwrap());
    }

    #[test]
    fn calendar_marks_reminders_and_adds_custom_entries() {
        let feed = vec![Event {
            id: 1,
            date: "2025-08-12T00:00:00".into(),
            ..not_found_event()
        }];
        let custom = Reminder::custom(Utc.with_ymd_and_hms(2025, 7, 3, 10, 0, 0).unwrap());
        let set = Reminder::for_event(&feed[0]);
        let entries = calendar_entries(&feed, &[set, custom.clone()]);

        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_reminder);
        assert_eq!(entries[0].end - entries[0].start, ChronoDuration::hours(1));
        assert_eq!(entries[1].id, custom.id);
        assert!(entries[1].resource.is_none());
    }

    #[test]
    fn undated_events_are_skipped() {
        let entries = calendar_entries(&[not_found_event()], &[]);
        assert!(entries.is_empty());
    }
}

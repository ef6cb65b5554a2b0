// tests/aggregate_feed.rs
//
// Feed composition through the public Aggregator with mock sources.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};

use astro_notifier::events::{Aggregator, Event, FEED_SIZE};
use astro_notifier::sources::{
    DonkiClient, NotificationFeed, Picture, PictureSource, RawNotification, FALLBACK_IMAGE,
};

/// Curated ids ordered by date: 2025-03-01 .. 2026-08-12.
const CURATED_BY_DATE: [i64; 9] = [6, 1, 8, 2, 4, 5, 7, 9, 3];

struct FixedFeed {
    records: Vec<RawNotification>,
    seen_window: Mutex<Option<(NaiveDate, NaiveDate)>>,
}

impl FixedFeed {
    fn new(records: Vec<RawNotification>) -> Self {
        Self {
            records,
            seen_window: Mutex::new(None),
        }
    }
}

#[async_trait]
impl NotificationFeed for FixedFeed {
    async fn notifications(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawNotification>> {
        *self.seen_window.lock().unwrap() = Some((start, end));
        Ok(self.records.clone())
    }
    fn name(&self) -> &'static str {
        "fixed"
    }
}

struct DownFeed;

#[async_trait]
impl NotificationFeed for DownFeed {
    async fn notifications(&self, _: NaiveDate, _: NaiveDate) -> Result<Vec<RawNotification>> {
        Err(anyhow!("connection refused"))
    }
    fn name(&self) -> &'static str {
        "down"
    }
}

struct PanickingFeed;

#[async_trait]
impl NotificationFeed for PanickingFeed {
    async fn notifications(&self, _: NaiveDate, _: NaiveDate) -> Result<Vec<RawNotification>> {
        panic!("unexpected payload shape");
    }
    fn name(&self) -> &'static str {
        "panicking"
    }
}

struct StaticPictures;

#[async_trait]
impl PictureSource for StaticPictures {
    async fn picture(&self, date: NaiveDate) -> Result<Picture> {
        Ok(Picture {
            date: date.to_string(),
            title: "pic".into(),
            explanation: String::new(),
            media_type: Some("image".into()),
            display_url: format!("https://img.test/{date}.jpg"),
        })
    }
    fn name(&self) -> &'static str {
        "static"
    }
}

/// Fails on every other day to prove lookups are independent.
struct FlakyPictures;

#[async_trait]
impl PictureSource for FlakyPictures {
    async fn picture(&self, date: NaiveDate) -> Result<Picture> {
        use chrono::Datelike;
        if date.day() % 2 == 0 {
            return Err(anyhow!("invalid api key"));
        }
        StaticPictures.picture(date).await
    }
    fn name(&self) -> &'static str {
        "flaky"
    }
}

fn note(kind: &str, issued: &str) -> RawNotification {
    RawNotification {
        message_type: Some(kind.to_string()),
        message_issue_time: Some(issued.to_string()),
        message_body: Some(format!("## Summary:\n{kind} at {issued}")),
        ..Default::default()
    }
}

fn ids(feed: &[Event]) -> Vec<i64> {
    feed.iter().map(|e| e.id).collect()
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 2, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn five_live_records_give_six_curated_then_three_newest_live() {
    let feed = Arc::new(FixedFeed::new(vec![
        note("FLR", "2025-06-28T09:00Z"),
        note("CME", "2025-07-01T10:00Z"),
        note("GST", "2025-06-30T10:00Z"),
        note("SEP", "2025-07-02T08:00Z"),
        note("IPS", "2025-06-26T10:00Z"),
    ]));
    let agg = Aggregator::new(feed.clone(), Arc::new(StaticPictures));
    let out = agg.upcoming_events_at(now()).await;

    assert_eq!(out.len(), FEED_SIZE);
    assert_eq!(&ids(&out)[..6], &CURATED_BY_DATE[..6]);
    assert_eq!(&ids(&out)[6..], &[1003, 1001, 1002]);
    assert!(out[..6].iter().all(|e| e.id < 1000 && !e.is_real_event));
    assert!(out[6..].iter().all(|e| e.is_real_event && e.priority == 1));

    let window = feed.seen_window.lock().unwrap().unwrap();
    assert_eq!(window.0.to_string(), "2025-06-25");
    assert_eq!(window.1.to_string(), "2025-08-01");
}

#[tokio::test]
async fn zero_live_records_backfill_with_latest_curated() {
    let agg = Aggregator::new(Arc::new(FixedFeed::new(vec![])), Arc::new(StaticPictures));
    let out = agg.upcoming_events_at(now()).await;
    assert_eq!(ids(&out), CURATED_BY_DATE.to_vec());
}

#[tokio::test]
async fn two_live_records_leave_one_backfilled_slot() {
    let agg = Aggregator::new(
        Arc::new(FixedFeed::new(vec![
            note("FLR", "2025-06-28T09:00Z"),
            note("CME", "2025-07-01T10:00Z"),
        ])),
        Arc::new(StaticPictures),
    );
    let out = agg.upcoming_events_at(now()).await;
    assert_eq!(ids(&out), vec![6, 1, 8, 2, 4, 5, 1001, 1000, 7]);
}

#[tokio::test]
async fn live_outage_still_yields_full_curated_feed() {
    let agg = Aggregator::new(Arc::new(DownFeed), Arc::new(StaticPictures));
    let out = agg.upcoming_events_at(now()).await;
    assert_eq!(ids(&out), CURATED_BY_DATE.to_vec());
}

#[tokio::test]
async fn crashed_live_task_switches_to_fallback_composition() {
    let agg = Aggregator::new(Arc::new(PanickingFeed), Arc::new(StaticPictures));
    let out = agg.upcoming_events_at(now()).await;
    assert_eq!(out.len(), FEED_SIZE);
    assert_eq!(ids(&out), CURATED_BY_DATE.to_vec());
    assert!(out.iter().all(|e| !e.is_real_event));
}

#[tokio::test]
async fn failed_image_lookups_only_affect_their_own_slot() {
    let agg = Aggregator::new(Arc::new(FixedFeed::new(vec![])), Arc::new(FlakyPictures));
    let out = agg.upcoming_events_at(now()).await;
    let placeholders = out.iter().filter(|e| e.image_url == FALLBACK_IMAGE).count();
    // Anchors 2025-07-02 back to 2025-06-24: even days are 07-02, 06-30, 06-28, 06-26, 06-24.
    assert_eq!(placeholders, 5);
    assert!(out.iter().all(|e| !e.image_url.is_empty()));
}

#[tokio::test]
async fn donki_fixture_flows_through_the_feed() {
    let json = std::fs::read_to_string("tests/fixtures/donki_notifications.json")
        .expect("missing tests/fixtures/donki_notifications.json");
    let agg = Aggregator::new(
        Arc::new(DonkiClient::from_fixture_str(&json)),
        Arc::new(StaticPictures),
    );
    let out = agg.upcoming_events_at(now()).await;

    assert_eq!(out.len(), FEED_SIZE);
    assert_eq!(&ids(&out)[6..], &[1004, 1003, 1002]);
    let sep = &out[6];
    assert_eq!(sep.subtype.as_deref(), Some("SEP"));
    assert_eq!(sep.title, "SEP Event");
    assert_eq!(
        sep.description,
        "Space weather event detected: SEP. Issued on 7/1/2025."
    );
}

#[tokio::test]
async fn repeated_calls_are_independent_snapshots() {
    let agg = Aggregator::new(Arc::new(FixedFeed::new(vec![])), Arc::new(StaticPictures));
    let (a, b) = tokio::join!(agg.upcoming_events_at(now()), agg.upcoming_events_at(now()));
    assert_eq!(a, b);
}

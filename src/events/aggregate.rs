// src/events/aggregate.rs
//! Feed aggregation: curated + live events merged into one bounded, ordered feed.
//!
//! Positions 1-6 hold the earliest curated events, positions 7-9 the newest
//! live events. A short live supply is backfilled from the remaining curated
//! events. If the build fails as a whole, a separate curated-only composition
//! is returned instead (first 6 + last 3 by date).

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use thiserror::Error;

use crate::config::AppConfig;
use crate::events::curated::curated_events;
use crate::events::live::{fetch_live_events, LIVE_ID_BASE};
use crate::events::types::Event;
use crate::sources::{ApodClient, DonkiClient, NotificationFeed, PictureSource};

/// Feed length, sized for a 3x3 grid.
pub const FEED_SIZE: usize = 9;
pub const CURATED_SLOTS: usize = 6;
pub const LIVE_SLOTS: usize = 3;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("{task} fetch task failed")]
    Task {
        task: &'static str,
        #[source]
        err: tokio::task::JoinError,
    },
    #[error("event {id} is not normalized: {reason}")]
    Malformed { id: i64, reason: &'static str },
}

/// Shape check run on every record before it may enter the merge.
fn ensure_normalized(events: &[Event], live: bool) -> Result<(), AggregateError> {
    for ev in events {
        let reason = if ev.title.trim().is_empty() {
            Some("empty title")
        } else if ev.starts_at().is_none() {
            Some("unreadable date")
        } else if ev.image_url.trim().is_empty() {
            Some("missing image")
        } else if ev.is_real_event != live {
            Some("source flag mismatch")
        } else if live != (ev.id >= LIVE_ID_BASE) {
            Some("id outside source range")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(AggregateError::Malformed { id: ev.id, reason });
        }
    }
    Ok(())
}

fn by_date_asc(a: &Event, b: &Event) -> Ordering {
    a.starts_at().cmp(&b.starts_at())
}

/// Normal composition: 6 earliest curated, then up to 3 newest live,
/// backfilled with further curated events (ascending) and capped at 9.
pub fn compose_feed(mut curated: Vec<Event>, mut live: Vec<Event>) -> Result<Vec<Event>, AggregateError> {
    ensure_normalized(&curated, false)?;
    ensure_normalized(&live, true)?;

    live.sort_by(|a, b| by_date_asc(b, a));
    live.truncate(LIVE_SLOTS);

    curated.sort_by(by_date_asc);
    let rest = curated.split_off(CURATED_SLOTS.min(curated.len()));

    let mut feed = curated;
    feed.extend(live);

    if feed.len() < FEED_SIZE {
        let needed = FEED_SIZE - feed.len();
        feed.extend(rest.into_iter().take(needed));
    }

    feed.truncate(FEED_SIZE);
    Ok(feed)
}

/// Degraded composition used only after a failed build: curated events by
/// date, first 6 followed by last 3. The two slices may overlap when fewer
/// than 9 curated events exist.
pub fn fallback_feed(mut curated: Vec<Event>) -> Vec<Event> {
    curated.sort_by(by_date_asc);
    let head = CURATED_SLOTS.min(curated.len());
    let tail = curated.len().saturating_sub(LIVE_SLOTS);

    let mut feed: Vec<Event> = curated[..head].to_vec();
    feed.extend_from_slice(&curated[tail..]);
    feed.truncate(FEED_SIZE);
    feed
}

/// Builds feed snapshots. Cheap to clone; every call fetches fresh data.
#[derive(Clone)]
pub struct Aggregator {
    live: Arc<dyn NotificationFeed>,
    pictures: Arc<dyn PictureSource>,
}

impl Aggregator {
    pub fn new(live: Arc<dyn NotificationFeed>, pictures: Arc<dyn PictureSource>) -> Self {
        Self { live, pictures }
    }

    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self::new(
            Arc::new(DonkiClient::from_config(cfg)?),
            Arc::new(ApodClient::from_config(cfg)?),
        ))
    }

    pub fn pictures(&self) -> Arc<dyn PictureSource> {
        Arc::clone(&self.pictures)
    }

    pub async fn upcoming_events(&self) -> Vec<Event> {
        self.upcoming_events_at(Utc::now()).await
    }

    /// Feed snapshot relative to `now`. Never fails; may be shorter than 9
    /// only when the curated supply itself is short.
    pub async fn upcoming_events_at(&self, now: DateTime<Utc>) -> Vec<Event> {
        let t0 = std::time::Instant::now();
        counter!("feed_builds_total").increment(1);

        let feed = match self.try_build(now).await {
            Ok(feed) => feed,
            Err(e) => {
                tracing::error!(target: "aggregate", error = %e, "feed build failed, serving curated fallback");
                counter!("feed_fallback_total").increment(1);
                let curated = curated_events(self.pictures.as_ref(), now.date_naive()).await;
                fallback_feed(curated)
            }
        };

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("feed_build_ms").record(ms);
        tracing::info!(
            target: "aggregate",
            size = feed.len(),
            live = feed.iter().filter(|e| e.is_real_event).count(),
            "feed built"
        );
        feed
    }

    async fn try_build(&self, now: DateTime<Utc>) -> Result<Vec<Event>, AggregateError> {
        let live_src = Arc::clone(&self.live);
        let live_task = tokio::spawn(async move { fetch_live_events(live_src.as_ref(), now).await });

        let pictures = Arc::clone(&self.pictures);
        let today = now.date_naive();
        let curated_task = tokio::spawn(async move { curated_events(pictures.as_ref(), today).await });

        let (live, curated) = tokio::join!(live_task, curated_task);
        let live = live.map_err(|err| AggregateError::Task { task: "live", err })?;
        let curated = curated.map_err(|err| AggregateError::Task { task: "curated", err })?;

        compose_feed(curated, live)
    }
}

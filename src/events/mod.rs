// src/events/mod.rs
pub mod aggregate;
pub mod curated;
pub mod live;
pub mod resolve;
pub mod types;

pub use aggregate::{compose_feed, fallback_feed, AggregateError, Aggregator, FEED_SIZE};
pub use resolve::{resolve, Resolution};
pub use types::{parse_event_date, Event, EventDetail, EventKind, Link};

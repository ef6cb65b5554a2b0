// src/sources/types.rs
use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One record of the DONKI notifications feed, as delivered.
/// Every field is optional on the wire; normalization decides what survives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNotification {
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(rename = "messageID", default)]
    pub message_id: Option<String>,
    #[serde(rename = "messageURL", default)]
    pub message_url: Option<String>,
    #[serde(default)]
    pub message_issue_time: Option<String>,
    #[serde(default)]
    pub message_title: Option<String>,
    #[serde(default)]
    pub message_body: Option<String>,
}

/// Picture-of-the-day entry reduced to what the feed and the home page need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Picture {
    pub date: String,
    pub title: String,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    pub display_url: String,
}

/// Live space-weather feed queried over an inclusive `YYYY-MM-DD` range.
#[async_trait::async_trait]
pub trait NotificationFeed: Send + Sync {
    async fn notifications(&self, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<RawNotification>>;
    fn name(&self) -> &'static str;
}

/// Illustrative image lookup keyed by a single date.
#[async_trait::async_trait]
pub trait PictureSource: Send + Sync {
    async fn picture(&self, date: NaiveDate) -> Result<Picture>;
    fn name(&self) -> &'static str;
}

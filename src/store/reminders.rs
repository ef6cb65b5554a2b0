// src/store/reminders.rs
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::events::Event;
use crate::store::kv::KeyValueStore;

pub const REMINDERS_KEY: &str = "celestialReminders";
pub const CUSTOM_PREFIX: &str = "custom-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    /// Event id as text, or `custom-<unix millis>` for free-form entries.
    pub id: String,
    pub title: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Reminder {
    pub fn for_event(ev: &Event) -> Self {
        Self {
            id: ev.id.to_string(),
            title: ev.title.clone(),
            date: ev.date.clone(),
            description: Some(ev.description.clone()),
            image_url: Some(ev.image_url.clone()),
        }
    }

    pub fn custom(now: DateTime<Utc>) -> Self {
        Self {
            id: format!("{CUSTOM_PREFIX}{}", now.timestamp_millis()),
            title: format!("Custom Reminder - {}", now.format("%-m/%-d/%Y")),
            date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            description: Some("Your custom reminder".to_string()),
            image_url: None,
        }
    }

    pub fn is_custom(&self) -> bool {
        self.id.starts_with(CUSTOM_PREFIX)
    }
}

/// Reminder list persisted as one JSON array. Past reminders are never purged.
#[derive(Clone)]
pub struct ReminderStore {
    kv: Arc<dyn KeyValueStore>,
}

impl ReminderStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Stored reminders; a missing or unreadable entry reads as empty.
    pub fn list(&self) -> Vec<Reminder> {
        let raw = match self.kv.get(REMINDERS_KEY) {
            Ok(Some(s)) => s,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(target: "store", error = ?e, "reading reminders failed");
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(target: "store", error = %e, "stored reminders unparsable");
            Vec::new()
        })
    }

    pub fn save(&self, reminders: &[Reminder]) -> Result<()> {
        let json = serde_json::to_string(reminders).context("serializing reminders")?;
        self.kv.set(REMINDERS_KEY, &json)
    }

    pub fn is_set(&self, id: &str) -> bool {
        self.list().iter().any(|r| r.id == id)
    }

    /// Append unless a reminder with the same id exists. Returns whether it was added.
    pub fn add(&self, reminder: Reminder) -> Result<bool> {
        let mut all = self.list();
        if all.iter().any(|r| r.id == reminder.id) {
            return Ok(false);
        }
        all.push(reminder);
        self.save(&all)?;
        Ok(true)
    }

    pub fn add_custom(&self, now: DateTime<Utc>) -> Result<Reminder> {
        let r = Reminder::custom(now);
        self.add(r.clone())?;
        Ok(r)
    }

    /// Returns whether anything was removed.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let mut all = self.list();
        let before = all.len();
        all.retain(|r| r.id != id);
        if all.len() == before {
            return Ok(false);
        }
        self.save(&all)?;
        Ok(true)
    }

    /// Set the reminder for `ev` if absent, clear it if present.
    /// Returns whether a reminder is set afterwards.
    pub fn toggle(&self, ev: &Event) -> Result<bool> {
        let id = ev.id.to_string();
        if self.remove(&id)? {
            return Ok(false);
        }
        self.add(Reminder::for_event(ev))?;
        Ok(true)
    }
}

// src/store/settings.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::store::kv::KeyValueStore;

pub const SETTINGS_KEY: &str = "astroNotifierSettings";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubscribedEvents {
    pub meteor_showers: bool,
    pub solar_eclipses: bool,
    pub lunar_eclipses: bool,
    pub planetary_alignments: bool,
    pub iss_passes: bool,
}

impl Default for SubscribedEvents {
    fn default() -> Self {
        Self {
            meteor_showers: true,
            solar_eclipses: true,
            lunar_eclipses: true,
            planetary_alignments: true,
            iss_passes: true,
        }
    }
}

/// User preferences. Fields missing from stored JSON take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub notifications: bool,
    /// Minutes before an event to notify.
    pub notification_time: u32,
    pub location: String,
    pub theme: String,
    pub units: String,
    pub subscribed_events: SubscribedEvents,
    pub notification_sound: bool,
    pub vibration: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications: true,
            notification_time: 60,
            location: String::new(),
            theme: "dark".to_string(),
            units: "metric".to_string(),
            subscribed_events: SubscribedEvents::default(),
            notification_sound: true,
            vibration: false,
        }
    }
}

#[derive(Clone)]
pub struct SettingsStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Stored settings, or defaults when absent or unreadable.
    pub fn load(&self) -> Settings {
        match self.kv.get(SETTINGS_KEY) {
            Ok(Some(s)) => serde_json::from_str(&s).unwrap_or_else(|e| {
                tracing::warn!(target: "store", error = %e, "stored settings unparsable, using defaults");
                Settings::default()
            }),
            Ok(None) => Settings::default(),
            Err(e) => {
                tracing::warn!(target: "store", error = ?e, "reading settings failed, using defaults");
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        let json = serde_json::to_string(settings).context("serializing settings")?;
        self.kv.set(SETTINGS_KEY, &json)
    }

    pub fn reset(&self) -> Result<Settings> {
        let d = Settings::default();
        self.save(&d)?;
        Ok(d)
    }
}

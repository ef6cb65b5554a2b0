// src/store/mod.rs
pub mod kv;
pub mod reminders;
pub mod settings;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use reminders::{Reminder, ReminderStore};
pub use settings::{Settings, SettingsStore};

// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod events;
pub mod metrics;
pub mod schedule;
pub mod sources;
pub mod store;

pub use crate::api::{router, AppState};
pub use crate::config::AppConfig;
pub use crate::events::{Aggregator, Event, EventDetail, Resolution};

/// Build the full HTTP app from configuration (live NASA clients + file store).
pub fn app(cfg: &AppConfig) -> anyhow::Result<axum::Router> {
    let state = AppState::from_config(cfg)?;
    tracing::info!(
        data_dir = %cfg.data_dir.display(),
        demo_key = cfg.api_key == config::app::DEMO_API_KEY,
        "app state ready"
    );
    Ok(router(state))
}

//! Astro Notifier: binary entrypoint
//! Boots the Axum HTTP server: event feed, event detail, calendar, reminders, settings.

use astro_notifier::{app, metrics::Metrics, AppConfig};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs filtered by `RUST_LOG`, defaulting to the feed targets at info.
/// Shuttle may already have installed a subscriber; that one wins.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("aggregate=info,sources=info,store=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = AppConfig::load_default()?;
    let metrics = Metrics::init()?;
    let router = app(&cfg)?.merge(metrics.router());

    Ok(router.into())
}

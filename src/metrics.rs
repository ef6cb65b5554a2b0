// src/metrics.rs
use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and describe the feed series.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        describe();
        Ok(Self { handle })
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe() {
    describe_counter!("feed_builds_total", "Feed snapshots requested.");
    describe_counter!(
        "feed_fallback_total",
        "Feed builds that failed and served the curated fallback."
    );
    describe_counter!(
        "source_errors_total",
        "Live feed or picture lookups that failed, by source."
    );
    describe_counter!("live_records_total", "Raw notifications received.");
    describe_counter!(
        "live_records_dropped_total",
        "Notifications dropped for missing category or issue time."
    );
    describe_histogram!("feed_build_ms", "Feed build time in milliseconds.");
    describe_histogram!("source_parse_ms", "Source payload parse time in milliseconds.");
}

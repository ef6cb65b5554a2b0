// src/sources/donki.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use metrics::{counter, histogram};
use std::time::Duration;

use crate::config::AppConfig;
use crate::sources::types::{NotificationFeed, RawNotification};

/// Client for the DONKI space-weather notifications endpoint.
pub struct DonkiClient {
    mode: Mode,
}

enum Mode {
    // Owned copy so tests can hand in strings read at runtime.
    Fixture(String),
    Http {
        base_url: String,
        api_key: String,
        client: reqwest::Client,
    },
}

impl DonkiClient {
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("astro-notifier/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .build()
            .context("building donki http client")?;
        Ok(Self {
            mode: Mode::Http {
                base_url: cfg.donki_base_url.trim_end_matches('/').to_string(),
                api_key: cfg.api_key.clone(),
                client,
            },
        })
    }

    fn parse_from_str(s: &str) -> Result<Vec<RawNotification>> {
        let t0 = std::time::Instant::now();
        let out: Vec<RawNotification> =
            serde_json::from_str(s).context("parsing donki notifications json")?;
        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("source_parse_ms", "source" => "donki").record(ms);
        counter!("live_records_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl NotificationFeed for DonkiClient {
    async fn notifications(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawNotification>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_from_str(s),
            Mode::Http {
                base_url,
                api_key,
                client,
            } => {
                let start = start.format("%Y-%m-%d").to_string();
                let end = end.format("%Y-%m-%d").to_string();
                let body = client
                    .get(format!("{base_url}/notifications"))
                    .query(&[
                        ("api_key", api_key.as_str()),
                        ("startDate", start.as_str()),
                        ("endDate", end.as_str()),
                    ])
                    .send()
                    .await
                    .context("donki http get()")?
                    .error_for_status()
                    .context("donki non-2xx")?
                    .text()
                    .await
                    .context("donki http .text()")?;
                Self::parse_from_str(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "donki"
    }
}

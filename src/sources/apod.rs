// src/sources/apod.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use metrics::{counter, histogram};
use serde::Deserialize;
use std::time::Duration;

use crate::config::AppConfig;
use crate::sources::types::{Picture, PictureSource};

/// Placeholder image used whenever a lookup fails or an event has no image.
pub const FALLBACK_IMAGE: &str =
    "https://apod.nasa.gov/apod/image/2406/NGC6188-RGB-ESO-32bit-2048.jpg";

#[derive(Debug, Deserialize)]
struct ApodResponse {
    date: Option<String>,
    title: Option<String>,
    explanation: Option<String>,
    media_type: Option<String>,
    url: Option<String>,
    hdurl: Option<String>,
    thumbnail_url: Option<String>,
}

impl ApodResponse {
    fn into_picture(self, requested: NaiveDate) -> Picture {
        let is_video = self.media_type.as_deref() == Some("video");
        let non_blank = |u: &String| !u.trim().is_empty();
        let display_url = if is_video {
            self.thumbnail_url.filter(non_blank)
        } else {
            self.hdurl.filter(non_blank).or(self.url.filter(non_blank))
        }
        .unwrap_or_else(|| FALLBACK_IMAGE.to_string());

        Picture {
            date: self
                .date
                .unwrap_or_else(|| requested.format("%Y-%m-%d").to_string()),
            title: self
                .title
                .unwrap_or_else(|| "Astronomy Picture of the Day".to_string()),
            explanation: self
                .explanation
                .unwrap_or_else(|| "No description available.".to_string()),
            media_type: self.media_type,
            display_url,
        }
    }
}

impl Picture {
    /// Shown in place of a picture that could not be loaded.
    pub fn fallback(date: NaiveDate) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            title: "Error Loading Image".to_string(),
            explanation: "We encountered an issue loading today's astronomy picture.".to_string(),
            media_type: None,
            display_url: FALLBACK_IMAGE.to_string(),
        }
    }
}

pub struct ApodClient {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        base_url: String,
        api_key: String,
        client: reqwest::Client,
    },
}

impl ApodClient {
    /// Serve every lookup from the same JSON document.
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
            .context("building apod http client")?;
        Ok(Self {
            mode: Mode::Http {
                base_url: cfg.apod_base_url.clone(),
                api_key: cfg.api_key.clone(),
                client,
            },
        })
    }

    fn parse_from_str(s: &str, requested: NaiveDate) -> Result<Picture> {
        let t0 = std::time::Instant::now();
        let resp: ApodResponse = serde_json::from_str(s).context("parsing apod json")?;
        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("source_parse_ms", "source" => "apod").record(ms);
        Ok(resp.into_picture(requested))
    }
}

#[async_trait]
impl PictureSource for ApodClient {
    async fn picture(&self, date: NaiveDate) -> Result<Picture> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_from_str(s, date),
            Mode::Http {
                base_url,
                api_key,
                client,
            } => {
                let day = date.format("%Y-%m-%d").to_string();
                let body = client
                    .get(base_url)
                    .query(&[
                        ("api_key", api_key.as_str()),
                        ("thumbs", "true"),
                        ("date", day.as_str()),
                    ])
                    .send()
                    .await
                    .context("apod http get()")?
                    .error_for_status()
                    .context("apod non-2xx")?
                    .text()
                    .await
                    .context("apod http .text()")?;
                Self::parse_from_str(&body, date)
            }
        }
    }

    fn name(&self) -> &'static str {
        "apod"
    }
}

/// Image URL for `date`, or the placeholder. Never fails.
pub async fn display_url_or_fallback(source: &dyn PictureSource, date: NaiveDate) -> String {
    match source.picture(date).await {
        Ok(p) => p.display_url,
        Err(e) => {
            tracing::warn!(target: "sources", error = ?e, provider = source.name(), %date, "picture lookup failed");
            counter!("source_errors_total", "source" => source.name()).increment(1);
            FALLBACK_IMAGE.to_string()
        }
    }
}

// src/config/app.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub const ENV_CONFIG_PATH: &str = "ASTRO_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/astro.toml";
pub const ENV_API_KEY: &str = "NASA_API_KEY";
pub const ENV_DATA_DIR: &str = "ASTRO_DATA_DIR";

/// Public rate-limited credential used when no key is configured.
pub const DEMO_API_KEY: &str = "DEMO_KEY";

fn default_api_key() -> String {
    DEMO_API_KEY.to_string()
}
fn default_donki_base_url() -> String {
    "https://api.nasa.gov/DONKI".to_string()
}
fn default_apod_base_url() -> String {
    "https://api.nasa.gov/planetary/apod".to_string()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_http_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// NASA API key. Empty or "ENV" resolves from `NASA_API_KEY`, then `DEMO_KEY`.
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_donki_base_url")]
    pub donki_base_url: String,
    #[serde(default = "default_apod_base_url")]
    pub apod_base_url: String,
    /// Directory for the JSON key-value store (reminders, settings).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            donki_base_url: default_donki_base_url(),
            apod_base_url: default_apod_base_url(),
            data_dir: default_data_dir(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Load from an explicit TOML file, then apply env overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: AppConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg.with_env_overrides())
    }

    /// Load using env var + fallbacks:
    /// 1) $ASTRO_CONFIG_PATH (must exist)
    /// 2) config/astro.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("ASTRO_CONFIG_PATH points to non-existent path"));
        }
        let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        Ok(Self::default().with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        let key = self.api_key.trim();
        if key.is_empty() || key.eq_ignore_ascii_case("env") {
            self.api_key = resolve_api_key(env::var(ENV_API_KEY).ok());
        } else if let Ok(k) = env::var(ENV_API_KEY) {
            if !k.trim().is_empty() {
                self.api_key = k.trim().to_string();
            }
        }
        if let Ok(dir) = env::var(ENV_DATA_DIR) {
            if !dir.trim().is_empty() {
                self.data_dir = PathBuf::from(dir.trim());
            }
        }
        if self.http_timeout_secs == 0 {
            self.http_timeout_secs = default_http_timeout_secs();
        }
        self
    }
}

/// Absent or blank key → public demo credential.
pub fn resolve_api_key(key: Option<String>) -> String {
    key.map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .unwrap_or_else(default_api_key)
}

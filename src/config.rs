use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::location::RadiusPolicy;
use crate::models::GeoPoint;
use crate::places::RetryPolicy;

/// Environment variables checked, in order, for the API key
pub const API_KEY_VARS: &[&str] = &["PLACES_API_KEY", "GOOGLE_PLACES_API_KEY"];

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HarvestConfig {
    pub api: ApiConfig,
    pub search: SearchConfig,
    pub retry: RetryPolicy,
    pub radius: RadiusPolicy,
    /// Reference point used only for best-effort province resolution
    pub fallback_center: Option<GeoPoint>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub language: String,
    pub region: String,
    pub page_size: u8,
    /// Settle time before a continuation token becomes valid
    pub page_delay_ms: u64,
    pub enrich_concurrency: usize,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            search: SearchConfig::default(),
            retry: RetryPolicy::default(),
            radius: RadiusPolicy::default(),
            // Bangkok
            fallback_center: Some(GeoPoint::new(13.7563, 100.5018)),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://places.googleapis.com".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            language: "th".to_string(),
            region: "TH".to_string(),
            page_size: 20,
            page_delay_ms: 1200,
            enrich_concurrency: 1,
        }
    }
}

impl SearchConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

impl HarvestConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: HarvestConfig =
            toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Ok(Self::default()),
        }
    }
}

/// The API key from the environment, if set and non-empty
pub fn api_key_from_env() -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|key| !key.trim().is_empty())
}

use crate::domain::timestamp::TimestampStyle;
use crate::error::{DashboardError, Result};
use reqwest::Url;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the admin backend.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: Url,
    pub timeout: Duration,
}

impl BackendSettings {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| DashboardError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DashboardError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { base_url, timeout })
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Everything the CLI resolves from flags, environment and `.env`.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub backend: BackendSettings,
    pub timestamps: TimestampStyle,
}

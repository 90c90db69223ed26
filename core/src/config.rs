//! Client configuration, read once at startup.

use std::time::Duration;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";
pub const BASE_URL_ENV: &str = "TRACKER_API_URL";
pub const TIMEOUT_ENV: &str = "TRACKER_API_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Applied to calls that set no timeout of their own.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Read from the process environment, loading `.env` first if present.
    pub fn from_env() -> Result<Self, ClientError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let base_url = lookup(BASE_URL_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout = match lookup(TIMEOUT_ENV) {
            None => None,
            Some(raw) => {
                let millis: u64 = raw.trim().parse().map_err(|_| ClientError::Config {
                    key: TIMEOUT_ENV.to_string(),
                    value: raw.clone(),
                })?;
                (millis > 0).then(|| Duration::from_millis(millis))
            }
        };

        Ok(Self { base_url, timeout })
    }
}

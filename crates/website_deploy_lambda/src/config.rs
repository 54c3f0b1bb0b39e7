use std::path::PathBuf;
use std::time::Duration;

use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use serde::Deserialize;
use website_deploy_core::manifest::DEFAULT_MANIFEST_PATH;

pub const CLIENT_CONFIG_VAR: &str = "botoConfig";
pub const MANIFEST_PATH_VAR: &str = "WEBAPP_MANIFEST_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub manifest_path: PathBuf,
}

impl HandlerConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let manifest_path = lookup(MANIFEST_PATH_VAR)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MANIFEST_PATH.to_string());
        Self {
            manifest_path: PathBuf::from(manifest_path),
        }
    }
}

/// Object-store client settings passed through the `botoConfig` variable.
///
/// Only the fields that have an SDK counterpart are read; anything else in
/// the blob is ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(default)]
    pub retries: Option<RetrySettings>,
    #[serde(default)]
    pub connect_timeout: Option<f64>,
    #[serde(default)]
    pub read_timeout: Option<f64>,
    #[serde(default)]
    pub user_agent_extra: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RetrySettings {
    /// Retries after the initial attempt.
    #[serde(default)]
    pub max_attempts: Option<u32>,
    /// Attempts including the initial one; wins over `max_attempts`.
    #[serde(default)]
    pub total_max_attempts: Option<u32>,
    #[serde(default)]
    pub mode: Option<String>,
}

impl ClientConfig {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn retry_config(&self) -> Option<RetryConfig> {
        let retries = self.retries.as_ref()?;
        let base = match retries.mode.as_deref() {
            Some("adaptive") => RetryConfig::adaptive(),
            _ => RetryConfig::standard(),
        };
        let attempts = retries
            .total_max_attempts
            .or_else(|| retries.max_attempts.map(|retries| retries + 1));
        Some(match attempts {
            Some(attempts) => base.with_max_attempts(attempts.max(1)),
            None => base,
        })
    }

    pub fn timeout_config(&self) -> Option<TimeoutConfig> {
        if self.connect_timeout.is_none() && self.read_timeout.is_none() {
            return None;
        }

        let mut builder = TimeoutConfig::builder();
        if let Some(seconds) = self.connect_timeout.and_then(positive_duration) {
            builder = builder.connect_timeout(seconds);
        }
        if let Some(seconds) = self.read_timeout.and_then(positive_duration) {
            builder = builder.read_timeout(seconds);
        }
        Some(builder.build())
    }
}

fn positive_duration(seconds: f64) -> Option<Duration> {
    (seconds.is_finite() && seconds > 0.0).then(|| Duration::from_secs_f64(seconds))
}

use std::time::Duration;

use reqwest::Client;
use stackwise_core::AppConfig;

use crate::error::SourceError;

/// HTTP settings shared by every network-backed source.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure for transient errors.
    pub max_retries: u32,
    pub backoff_base_secs: u64,
}

impl ClientOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.http_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_secs: config.retry_backoff_base_secs,
        }
    }

    /// Builds a `reqwest::Client` with the configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the client cannot be constructed.
    pub(crate) fn build_client(&self) -> Result<Client, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&self.user_agent)
            .build()?;
        Ok(client)
    }
}

/// Parses `base_url`, guaranteeing exactly one trailing slash so that
/// `Url::join` appends to the path instead of replacing its last segment.
pub(crate) fn parse_base_url(base_url: &str) -> Result<reqwest::Url, SourceError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    reqwest::Url::parse(&normalised).map_err(|e| SourceError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })
}

/// Reads the `Retry-After` header in seconds, defaulting to 60.
pub(crate) fn retry_after_secs(response: &reqwest::Response) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(60)
}

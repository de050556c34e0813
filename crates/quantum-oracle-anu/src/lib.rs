//! Blocking client for the ANU quantum random numbers API.
//!
//! The ANU service measures vacuum fluctuations of the electromagnetic field
//! and serves the result over HTTPS:
//!
//! ```text
//! GET https://api.quantumnumbers.anu.edu.au?length=3&type=uint8&size=1
//! x-api-key: <key>
//!
//! {"success": true, "type": "uint8", "length": 3, "data": [12, 200, 97]}
//! ```
//!
//! [`AnuClient`] implements [`KeyedSource`] so it can sit behind a
//! [`CredentialChain`](quantum_oracle_core::CredentialChain).

use std::time::Duration;

use serde::Deserialize;

use quantum_oracle_core::source::expect_len;
use quantum_oracle_core::{Credential, KeyedSource, SourceError};

/// Public ANU endpoint.
pub const DEFAULT_API_URL: &str = "https://api.quantumnumbers.anu.edu.au";

/// Largest `length` the API accepts in one request.
pub const MAX_LENGTH: usize = 1024;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for [`AnuClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnuConfig {
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for AnuConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AnuConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Errors building the client. Request failures are [`SourceError`]s.
#[derive(Debug, thiserror::Error)]
pub enum AnuError {
    #[error("invalid API URL '{0}': expected http:// or https://")]
    InvalidUrl(String),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Body of a successful (or soft-failed) response.
#[derive(Debug, Deserialize)]
struct RandomResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Vec<u8>,
    #[serde(default)]
    message: Option<String>,
}

/// Body of an error response from the API gateway.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Blocking ANU QRNG client.
#[derive(Debug, Clone)]
pub struct AnuClient {
    http: reqwest::blocking::Client,
    config: AnuConfig,
}

impl AnuClient {
    pub fn new(config: AnuConfig) -> Result<Self, AnuError> {
        if !(config.api_url.starts_with("http://") || config.api_url.starts_with("https://")) {
            return Err(AnuError::InvalidUrl(config.api_url));
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("quantum-oracle/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &AnuConfig {
        &self.config
    }

    /// Request `count` uint8 samples with `key`.
    pub fn fetch_uint8(&self, key: &str, count: usize) -> Result<Vec<u8>, SourceError> {
        if count == 0 || count > MAX_LENGTH {
            return Err(SourceError::InvalidLength {
                requested: count,
                max: MAX_LENGTH,
            });
        }

        log::debug!("GET {} length={count}", self.config.api_url);
        let resp = self
            .http
            .get(&self.config.api_url)
            .query(&[("length", count.to_string().as_str()), ("type", "uint8"), ("size", "1")])
            .header("x-api-key", key)
            .send()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(SourceError::Status {
                code: status.as_u16(),
                message: error_message(&body, status.canonical_reason()),
            });
        }

        let parsed: RandomResponse =
            serde_json::from_str(&body).map_err(|e| SourceError::Malformed(e.to_string()))?;
        if !parsed.success {
            return Err(SourceError::Rejected(
                parsed
                    .message
                    .unwrap_or_else(|| "success=false".to_string()),
            ));
        }

        expect_len(parsed.data, count)
    }
}

impl KeyedSource for AnuClient {
    fn name(&self) -> &str {
        "anu"
    }

    fn fetch_with(&self, credential: &Credential, count: usize) -> Result<Vec<u8>, SourceError> {
        self.fetch_uint8(credential.key(), count)
    }
}

/// Best human-readable message from an error body.
fn error_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(err) = serde_json::from_str::<ErrorResponse>(body) {
        return err.message;
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.chars().take(200).collect();
    }
    reason.unwrap_or("unknown error").to_string()
}

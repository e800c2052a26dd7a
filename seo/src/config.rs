use crate::metadata::Metadata;
use http::HeaderName;
use serde::Deserialize;
use shared::http::PATHNAME_HEADER;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("SEO request timeout cannot be 0")]
    InvalidTimeout,

    #[error("Invalid pathname header name: {0}")]
    InvalidHeaderName(String),
}

/// SEO backend and metadata configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Endpoint serving overrides, queried with `appSource`, `path` and `force`
    pub url: Url,
    /// Timeout for a single override request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Delays after the first write at which a resolved override is written again.
    ///
    /// These must outlast the renderer's hydration, which may reset the head.
    #[serde(default = "default_reapply_delays_ms")]
    pub reapply_delays_ms: Vec<u64>,
    /// Header carrying the request path from the edge to page generation
    #[serde(default = "default_pathname_header")]
    pub pathname_header: String,
    /// Metadata used when no override is set
    #[serde(default)]
    pub defaults: Metadata,
}

fn default_timeout_secs() -> u64 {
    3
}

fn default_reapply_delays_ms() -> Vec<u64> {
    vec![1200, 2600]
}

fn default_pathname_header() -> String {
    PATHNAME_HEADER.to_string()
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        self.pathname_header()?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn reapply_delays(&self) -> Vec<Duration> {
        self.reapply_delays_ms
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect()
    }

    pub fn pathname_header(&self) -> Result<HeaderName, ValidationError> {
        HeaderName::from_bytes(self.pathname_header.as_bytes())
            .map_err(|_| ValidationError::InvalidHeaderName(self.pathname_header.clone()))
    }
}

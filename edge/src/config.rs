use http::HeaderName;
use serde::Deserialize;
use shared::http::PATHNAME_HEADER;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Upstream timeout cannot be 0")]
    InvalidTimeout,

    #[error("Invalid pathname header name: {0}")]
    InvalidHeaderName(String),

    #[error("Empty excluded path")]
    EmptyExcludedPath,
}

/// Edge configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Main listener for incoming requests
    pub listener: Listener,
    /// Admin listener for health and readiness probes
    pub admin_listener: Listener,
    /// The page renderer requests are forwarded to
    pub upstream: UpstreamConfig,
    /// Path patterns forwarded without routing (e.g. "/api/*", "/robots.txt")
    #[serde(default = "default_excluded_paths")]
    pub excluded_paths: Vec<String>,
    /// Header carrying the served path to page generation
    #[serde(default = "default_pathname_header")]
    pub pathname_header: String,
}

fn default_excluded_paths() -> Vec<String> {
    [
        "/api/*",
        "/_next/static/*",
        "/_next/image/*",
        "/favicon.ico",
        "/robots.txt",
        "/sitemap.xml",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_pathname_header() -> String {
    PATHNAME_HEADER.to_string()
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;
        self.upstream.validate()?;

        if self.excluded_paths.iter().any(|p| p.trim().is_empty()) {
            return Err(ValidationError::EmptyExcludedPath);
        }

        self.pathname_header()?;
        Ok(())
    }

    pub fn pathname_header(&self) -> Result<HeaderName, ValidationError> {
        HeaderName::from_bytes(self.pathname_header.as_bytes())
            .map_err(|_| ValidationError::InvalidHeaderName(self.pathname_header.clone()))
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// Page renderer configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UpstreamConfig {
    /// Base URL of the renderer
    pub url: Url,
    /// Timeout for the whole upstream request, including the response body
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl UpstreamConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

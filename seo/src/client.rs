use crate::config::Config;
use crate::metadata::SeoOverride;
use crate::metrics_defs::{FETCH_DURATION, FETCH_RESULTS};
use crate::query::SeoQuery;
use async_trait::async_trait;
use reqwest::StatusCode;
use shared::{counter, histogram};
use std::time::{Duration, Instant};
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("unexpected status code: {0}")]
    UnexpectedStatus(StatusCode),
    #[error("invalid override payload: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Source of SEO overrides.
///
/// Lookups never fail: any error is treated as "no override" so that metadata
/// can always fall back to the defaults.
#[async_trait]
pub trait SeoFetch: Send + Sync {
    async fn fetch(&self, query: &SeoQuery) -> Option<SeoOverride>;
}

/// Fetches overrides from the SEO backend over HTTP.
#[derive(Clone)]
pub struct SeoClient {
    client: reqwest::Client,
    url: Url,
}

impl SeoClient {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(SeoClient { client, url })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(config.url.clone(), config.timeout())
    }

    async fn try_fetch(&self, query: &SeoQuery) -> Result<Option<SeoOverride>, ClientError> {
        let response = self
            .client
            .get(self.url.clone())
            .query(query)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.bytes().await?;
                if body.iter().all(u8::is_ascii_whitespace) {
                    return Ok(None);
                }
                Ok(serde_json::from_slice::<Option<SeoOverride>>(&body)?)
            }
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(None),
            status => Err(ClientError::UnexpectedStatus(status)),
        }
    }
}

#[async_trait]
impl SeoFetch for SeoClient {
    async fn fetch(&self, query: &SeoQuery) -> Option<SeoOverride> {
        let started = Instant::now();
        let result = self.try_fetch(query).await;

        let outcome = match &result {
            Ok(Some(_)) => "found",
            Ok(None) => "none",
            Err(_) => "error",
        };
        counter!(FETCH_RESULTS, "result" => outcome).increment(1);
        histogram!(FETCH_DURATION, "result" => outcome).record(started.elapsed().as_secs_f64());

        match result {
            Ok(seo_override) => {
                tracing::debug!(path = %query.path, outcome, "Fetched SEO override");
                seo_override
            }
            Err(e) => {
                tracing::warn!(
                    path = %query.path,
                    app_source = ?query.app_source,
                    error = %e,
                    "SEO override lookup failed, using defaults"
                );
                None
            }
        }
    }
}

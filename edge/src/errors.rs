use crate::config::ValidationError;
use std::io;

#[derive(thiserror::Error, Debug)]
pub enum EdgeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ValidationError),
    #[error("upstream request failed for {0}: {1}")]
    UpstreamRequestFailed(String, String),
    #[error("upstream timeout for {0}")]
    UpstreamTimeout(String),
    #[error("failed to read response body: {0}")]
    ResponseBodyError(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

// Error types for the script filters.
// Covers transport, HTTP status, cache storage, and response parsing failures.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    ClientSetup(#[source] reqwest::Error),

    #[error("{url} -> HTTP {status}: {body}")]
    HttpStatus {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("cache entry {key}: {source}")]
    CacheIo {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed response from {origin}: {source}")]
    MalformedResponse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Please set {0} in the workflow configuration")]
    MissingConfig(&'static str),
}

impl FilterError {
    pub(crate) fn cache_io(key: &str, source: std::io::Error) -> Self {
        FilterError::CacheIo {
            key: key.to_string(),
            source,
        }
    }

    pub(crate) fn malformed(origin: &str, source: serde_json::Error) -> Self {
        FilterError::MalformedResponse {
            origin: origin.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;

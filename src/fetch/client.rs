// HTTP transport.
// Issues GET requests and converts non-success statuses into errors.

use std::future::Future;

use reqwest::{
    Client, ClientBuilder, StatusCode,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{FilterError, Result};

/// A completed HTTP response with a 2xx status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// The URL that was requested.
    pub url: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Header value as text, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| FilterError::malformed(&self.url, e))
    }
}

/// Something that can perform a GET request.
pub trait HttpTransport {
    /// Fetch `url` with `headers` added to the request.
    ///
    /// Connection failures map to [`FilterError::Transport`] and non-2xx
    /// responses to [`FilterError::HttpStatus`].
    fn get(&self, url: &str, headers: &HeaderMap) -> impl Future<Output = Result<HttpResponse>>;
}

/// GitHub-style rate limit headers, when the server sends them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}

impl RateLimit {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        };

        Some(Self {
            limit: value("x-ratelimit-limit")?,
            remaining: value("x-ratelimit-remaining")?,
            reset: value("x-ratelimit-reset")?,
        })
    }
}

/// [`HttpTransport`] backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport. Headers are supplied per request by the caller.
    pub fn new() -> Result<Self> {
        Self::with_builder(Client::builder())
    }

    fn with_builder(builder: ClientBuilder) -> Result<Self> {
        let client = builder.build().map_err(FilterError::ClientSetup)?;

        Ok(Self { client })
    }

    /// Check response status and collect the body.
    async fn check_response(url: &str, response: reqwest::Response) -> Result<HttpResponse> {
        let status = response.status();
        let headers = response.headers().clone();

        if let Some(rate_limit) = RateLimit::from_headers(&headers) {
            debug!(
                limit = rate_limit.limit,
                remaining = rate_limit.remaining,
                reset = rate_limit.reset,
                "rate limit"
            );
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FilterError::Transport {
                url: url.to_string(),
                source,
            })?;

        if !status.is_success() {
            return Err(FilterError::HttpStatus {
                url: url.to_string(),
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(HttpResponse {
            url: url.to_string(),
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<HttpResponse> {
        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .send()
            .await
            .map_err(|source| FilterError::Transport {
                url: url.to_string(),
                source,
            })?;

        Self::check_response(url, response).await
    }
}

/// Build a header map from name/value pairs.
pub fn header_map<'a>(pairs: impl IntoIterator<Item = (&'a str, String)>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| FilterError::InvalidHeader(format!("{}: {}", name, e)))?;
        let value = HeaderValue::from_str(&value)
            .map_err(|e| FilterError::InvalidHeader(format!("{}: {}", name.as_str(), e)))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

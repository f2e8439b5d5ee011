//! HTTP fetch pipeline for product pages.
//!
//! ### URL Canonicalization
//! - Trim whitespace, ensure scheme (default: `https`)
//! - Lowercase host, remove fragments
//! - Preserve query string
//!
//! ### Request
//! - Identifying `User-Agent` and an `Accept-Language` preference
//! - Bounded timeout, redirect limit and body size
//!
//! ### Retries
//! - Transient statuses (429, 500, 502, 503, 504) and connect/timeout errors
//!   are retried with doubling backoff, up to [`RetryPolicy::max_attempts`].
//! - Any other non-success status fails immediately.

pub mod retry;
pub mod url;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use productmcp_core::{AppConfig, Error};
use reqwest::{Client, Response, StatusCode, Url, header};

pub use retry::RetryPolicy;
pub use url::{UrlError, canonicalize};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "Mozilla/5.0 (compatible; ProductMCP/1.2)")
    pub user_agent: String,

    /// Accept-Language header value
    pub accept_language: String,

    /// Request timeout per attempt (default: 25s)
    pub timeout: Duration,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,

    pub retry: RetryPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
            timeout: config.timeout(),
            max_bytes: config.max_bytes,
            max_redirects: config.max_redirects,
            retry: RetryPolicy { max_attempts: config.max_retries, backoff: config.backoff(), ..RetryPolicy::default() },
        }
    }
}

/// A fetched page.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The canonical URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body, decoded as UTF-8 with invalid sequences replaced
    pub body: String,
    /// Time taken across all attempts in milliseconds
    pub fetch_ms: u64,
    /// Number of requests sent
    pub attempts: u32,
}

/// Where page markup comes from.
///
/// [`FetchClient`] is the network implementation; tests substitute fixed pages.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Markup of the page at `url`.
    async fn fetch_html(&self, url: &str) -> Result<String, Error>;
}

/// HTTP fetch client with retries.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Fetch a URL, retrying transient failures.
    pub async fn fetch(&self, url_str: &str) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let url = canonicalize(url_str).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let retry = &self.config.retry;

        let mut attempt = 0;
        loop {
            attempt += 1;

            let err = match self.send(&url).await {
                Ok(response) if response.status().is_success() => {
                    return self.read(url, response, start, attempt).await;
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    let err = Error::HttpError(format!("status {}", status));
                    if !retry.should_retry(status) {
                        return Err(err);
                    }
                    err
                }
                Err(e) if e.is_timeout() => Error::FetchTimeout(format!("no response within {:?}", self.config.timeout)),
                Err(e) if e.is_connect() => Error::HttpError(format!("network error: {}", e)),
                Err(e) => return Err(Error::HttpError(format!("network error: {}", e))),
            };

            if !retry.has_attempts_left(attempt) {
                return Err(err);
            }

            let delay = retry.delay(attempt);
            tracing::warn!("retrying {} after attempt {} failed ({}); waiting {:?}", url, attempt, err, delay);
            tokio::time::sleep(delay).await;
        }
    }

    async fn send(&self, url: &Url) -> Result<Response, reqwest::Error> {
        self.http
            .get(url.as_str())
            .header(header::ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header(header::ACCEPT_LANGUAGE, &self.config.accept_language)
            .send()
            .await
    }

    async fn read(&self, url: Url, response: Response, start: Instant, attempts: u32) -> Result<FetchResponse, Error> {
        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let status = response.status();
        let final_url = response.url().clone();
        let content_type =
            response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).map(|s| s.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::HttpError(format!("failed to read response: {}", e)))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;
        tracing::debug!("fetched {} -> {} in {}ms ({} bytes, {} attempts)", url, final_url, fetch_ms, bytes.len(), attempts);

        let body = String::from_utf8_lossy(&bytes).into_owned();
        Ok(FetchResponse { url, final_url, status, content_type, body, fetch_ms, attempts })
    }
}

#[async_trait]
impl PageSource for FetchClient {
    async fn fetch_html(&self, url: &str) -> Result<String, Error> {
        self.fetch(url).await.map(|response| response.body)
    }
}

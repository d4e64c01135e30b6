//! Minimal page-fetching HTTP client with safe logging and bounded retries.
//!
//! - [`PageFetcher`]: the fetch capability the pipeline stages depend on
//! - [`HttpClient`]: reqwest-backed implementation with timeout, user agent, retries
//! - Retries transport failures, 429 and 5xx with exponential backoff and `Retry-After`
//!   support; every other status is handed back to the caller untouched
//! - Optional *raw* response logging via `CORPUS_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), corpus_http::HttpError> {
//! use corpus_http::{HttpClient, PageFetcher};
//!
//! let client = HttpClient::new("https://example.com")?;
//! let page = client.fetch_page("/news?page=1").await?;
//! if page.is_success() {
//!     println!("{} bytes", page.body.len());
//! }
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), retries and final errors.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use std::env;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "CORPUS_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)

/// Longest pause a `Retry-After` header can impose on one retry.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
}

// ==============================
// Fetch capability
// ==============================

/// A fetched page: final status plus the body decoded as UTF-8.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    /// Charset declared in `Content-Type`, if any. Informational only.
    pub charset: Option<String>,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        self.status == StatusCode::OK.as_u16()
    }
}

/// "Fetch page → text" capability used by the collector and downloader.
///
/// Implementations return `Ok` for any HTTP status; `Err` means no response was
/// obtained at all (after whatever retries the implementation performs).
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, address: &str) -> Result<FetchedPage, HttpError>;
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub user_agent: String,
    pub default_timeout: Duration,
    pub max_retries: usize,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use corpus_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://example.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(30));
    /// assert_eq!(client.max_retries, 3);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            user_agent: "MedicalDataCollector/1.0".into(),
            default_timeout: Duration::from_secs(30),
            max_retries: 3,
        })
    }

    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Override the retry budget. Zero disables retries entirely.
    ///
    /// ```no_run
    /// use corpus_http::{HttpClient, HttpError};
    ///
    /// let client = HttpClient::new("https://example.com")?.with_retries(0);
    /// assert_eq!(client.max_retries, 0);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    /// Absolute URLs are used as-is; anything else is joined onto the base.
    fn resolve(&self, path: &str) -> Result<Url, HttpError> {
        if let Ok(abs) = Url::parse(path) {
            return Ok(abs);
        }
        self.base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))
    }

    // ==============================
    // Core request implementation
    // ==============================

    /// GET a page, retrying transport failures, 429 and 5xx within the retry budget.
    pub async fn get_page(&self, path: &str) -> Result<FetchedPage, HttpError> {
        let url = self.resolve(path)?;
        let max_retries = self.max_retries;
        let timeout = self.default_timeout;
        let mut attempt = 0usize;

        loop {
            let rb = self
                .inner
                .get(url.clone())
                .timeout(timeout)
                .header(USER_AGENT, self.user_agent.as_str());

            tracing::debug!(
                attempt = attempt + 1,
                max_retries,
                host_path = %format!("{}{}", url.domain().unwrap_or("-"), url.path()),
                query = url.query().unwrap_or(""),
                timeout_ms = timeout.as_millis() as u64,
                "http.request.start"
            );

            // ----- Send -----
            let t0 = std::time::Instant::now();
            let resp = match rb.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    let message = err.to_string();
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff(attempt);
                        tracing::warn!(
                            %url,
                            attempt,
                            max_retries,
                            backoff_ms = delay.as_millis() as u64,
                            message = %message,
                            "http.retrying.network_send"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    tracing::warn!(%url, attempt, max_retries, message = %message, "http.network_error.send");
                    return Err(HttpError::Network(message));
                }
            };
            let status = resp.status();
            let headers = resp.headers().clone();
            let bytes = match resp.bytes().await {
                Ok(bytes) => bytes,
                Err(err) => {
                    let message = err.to_string();
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff(attempt);
                        tracing::warn!(
                            %url,
                            attempt,
                            max_retries,
                            backoff_ms = delay.as_millis() as u64,
                            message = %message,
                            "http.retrying.network_body"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    tracing::warn!(%url, attempt, max_retries, message = %message, "http.network_error.body");
                    return Err(HttpError::Network(message));
                }
            };
            let dur_ms = t0.elapsed().as_millis() as u64;
            let charset = declared_charset(&headers);

            tracing::debug!(
                %url,
                %status,
                duration_ms = dur_ms,
                body_len = bytes.len(),
                charset = ?charset,
                "http.response.headers"
            );

            if raw_enabled() {
                let mut body_snip = bytes.to_vec();
                let truncated = body_snip.len() > RAW_MAX_BODY;
                if truncated {
                    body_snip.truncate(RAW_MAX_BODY);
                }
                let text = String::from_utf8_lossy(&body_snip);
                tracing::info!(
                    target: "http.raw",
                    %url,
                    status = %status,
                    duration_ms = dur_ms,
                    body = %text,
                    truncated
                );
            }

            let is_429 = status == StatusCode::TOO_MANY_REQUESTS;
            let is_5xx = status.is_server_error();

            if (is_429 || is_5xx) && attempt < max_retries {
                attempt += 1;
                let delay = retry_delay(&headers, is_429, attempt);
                tracing::warn!(
                    %url,
                    %status,
                    attempt,
                    max_retries,
                    backoff_ms = delay.as_millis() as u64,
                    body_snippet = %snip_body(&bytes),
                    "http.retrying"
                );
                sleep(delay).await;
                continue;
            }

            if !status.is_success() {
                tracing::debug!(%url, %status, body_snippet = %snip_body(&bytes), "http.non_success");
            }

            // The source serves UTF-8 regardless of what it declares.
            return Ok(FetchedPage {
                url: url.to_string(),
                status: status.as_u16(),
                charset,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_page(&self, address: &str) -> Result<FetchedPage, HttpError> {
        self.get_page(address).await
    }
}

// ==============================
// Helpers
// ==============================

fn backoff(attempt: usize) -> Duration {
    let shift = attempt.saturating_sub(1).min(16) as u32;
    Duration::from_millis(200u64.saturating_mul(1u64 << shift))
}

/// Pause before retry `attempt` of a 429/5xx response. A server-supplied
/// `Retry-After` is honoured up to [`MAX_RETRY_AFTER`].
fn retry_delay(h: &HeaderMap, is_429: bool, attempt: usize) -> Duration {
    if let Some(secs) = retry_after_delay_secs(h) {
        Duration::from_secs(secs).min(MAX_RETRY_AFTER)
    } else if is_429 {
        // default floor for 429 when no Retry-After is present
        backoff(attempt).max(Duration::from_millis(1100))
    } else {
        backoff(attempt)
    }
}

fn retry_after_delay_secs(h: &HeaderMap) -> Option<u64> {
    h.get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())?
        .parse()
        .ok()
}

fn declared_charset(h: &HeaderMap) -> Option<String> {
    let ct = h.get(CONTENT_TYPE)?.to_str().ok()?;
    ct.split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, v)| v.trim().trim_matches('"').to_ascii_lowercase())
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        let mut cut = 500;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn backoff_doubles_from_200ms() {
        assert_eq!(backoff(1), Duration::from_millis(200));
        assert_eq!(backoff(2), Duration::from_millis(400));
        assert_eq!(backoff(3), Duration::from_millis(800));
    }

    #[test]
    fn retry_after_is_honoured_but_capped() {
        let mut h = HeaderMap::new();
        h.insert(RETRY_AFTER, HeaderValue::from_static("5"));
        assert_eq!(retry_delay(&h, true, 1), Duration::from_secs(5));

        h.insert(RETRY_AFTER, HeaderValue::from_static("86400"));
        assert_eq!(retry_delay(&h, false, 1), MAX_RETRY_AFTER);

        let empty = HeaderMap::new();
        assert_eq!(retry_delay(&empty, true, 1), Duration::from_millis(1100));
        assert_eq!(retry_delay(&empty, false, 2), Duration::from_millis(400));
    }

    #[test]
    fn charset_is_read_from_content_type() {
        let mut h = HeaderMap::new();
        h.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=\"UTF-8\""),
        );
        assert_eq!(declared_charset(&h).as_deref(), Some("utf-8"));

        h.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        assert_eq!(declared_charset(&h), None);
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        let body = "م".repeat(400);
        let snip = snip_body(body.as_bytes());
        assert!(snip.ends_with("..."));
        assert!(snip.len() <= 503);
    }

    #[test]
    fn relative_and_absolute_paths_resolve() {
        let client = HttpClient::new("https://altibbi.com").unwrap();
        assert_eq!(
            client.resolve("/news?page=2").unwrap().as_str(),
            "https://altibbi.com/news?page=2"
        );
        assert_eq!(
            client.resolve("https://other.test/a").unwrap().as_str(),
            "https://other.test/a"
        );
    }
}

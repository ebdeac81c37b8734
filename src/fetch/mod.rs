//! HTML fetcher
//!
//! This module handles the single HTTP round-trip of a scrape:
//! - Building an HTTP client with a realistic browser header set
//! - Fetching the VDP body with redirect following and a fixed timeout
//! - Classifying failures into the crate error taxonomy
//!
//! There are no retries here; a failed fetch is surfaced immediately and
//! the caller decides whether to retry at a higher level.

use crate::{Result, ScrapeError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, REFERER};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Fixed per-request timeout for dealer origins
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Desktop-browser User-Agent; dealer sites routinely reject obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/122.0.6261.57 Safari/537.36";

/// Builds an HTTP client configured for scraping dealer pages
///
/// The client sends a browser-like header set (Accept, Accept-Language,
/// Referer, DNT, Upgrade-Insecure-Requests), follows redirects, and
/// enforces a 15 second timeout per request.
pub fn build_http_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;\
             q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert("DNT", HeaderValue::from_static("1"));
    headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(FETCH_TIMEOUT)
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|e| ScrapeError::Transport {
            url: String::new(),
            message: format!("failed to build HTTP client: {}", e),
        })
}

/// Fetches the raw HTML body of a page
///
/// # Errors
///
/// * `PageNotFound` - the origin answered 404
/// * `RequestFailed` - any other non-2xx HTTP status (carries the status)
/// * `Transport` - DNS/connect/timeout/TLS failures with no response
pub async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    tracing::debug!(url, "fetching page");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_transport_error(url, &e))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ScrapeError::PageNotFound {
            url: url.to_string(),
        });
    }
    if !status.is_success() {
        return Err(ScrapeError::RequestFailed {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| ScrapeError::Transport {
        url: url.to_string(),
        message: format!("failed to read response body: {}", e),
    })?;

    tracing::debug!(url, bytes = body.len(), "page fetched");
    Ok(body)
}

/// Maps a reqwest error that produced no response onto the taxonomy
fn classify_transport_error(url: &str, error: &reqwest::Error) -> ScrapeError {
    let message = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };

    ScrapeError::Transport {
        url: url.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client().is_ok());
    }
}

//! Normalized HTTP responses and rate-limit headers

use std::time::{Duration, Instant, SystemTime};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE, RETRY_AFTER};

pub const QUOTA_LIMIT_HEADER: &str = "X-Api-Quota-Limit";
pub const QUOTA_REMAINING_HEADER: &str = "X-Api-Quota-Remaining";
pub const QUOTA_RESET_HEADER: &str = "X-Api-Quota-Reset";

/// A fully-read HTTP response
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code
    pub status_code: u16,
    /// Canonical reason phrase for the status code
    pub status_text: String,
    /// Response headers in wire order
    pub headers: HeaderMap,
    /// Raw body bytes
    pub body: Bytes,
    /// Time from send to fully-read body
    pub duration: Duration,
    /// When the body finished arriving
    pub received_at: DateTime<Utc>,
    /// Body length in bytes
    pub size_bytes: usize,
}

impl Response {
    /// Read a reqwest response to completion
    pub(crate) async fn read(
        response: reqwest::Response,
        started: Instant,
    ) -> std::result::Result<Self, reqwest::Error> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(Self {
            status_code: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            size_bytes: body.len(),
            body,
            duration: started.elapsed(),
            received_at: Utc::now(),
        })
    }

    /// Check for a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// First value of a header, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// True for an empty body or an explicit `Content-Length: 0`
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
            || self
                .headers
                .get(CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.trim() == "0")
    }

    /// Body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn rate_limit(&self) -> RateLimit {
        RateLimit::from_headers(&self.headers)
    }
}

/// Quota headers reported by the API on every response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimit {
    /// Requests allowed per window
    pub limit: Option<u64>,
    /// Requests left in the current window
    pub remaining: Option<u64>,
    /// When the window resets, as sent by the server
    pub reset: Option<String>,
    /// How long the server asked us to wait
    pub retry_after: Option<Duration>,
}

impl RateLimit {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        Self {
            limit: get(QUOTA_LIMIT_HEADER).and_then(|v| v.parse().ok()),
            remaining: get(QUOTA_REMAINING_HEADER).and_then(|v| v.parse().ok()),
            reset: get(QUOTA_RESET_HEADER).map(str::to_string),
            retry_after: get(RETRY_AFTER.as_str()).and_then(parse_retry_after),
        }
    }

    /// Check whether the quota is used up
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

/// Parse `Retry-After` as delta-seconds or an HTTP date
fn parse_retry_after(value: &str) -> Option<Duration> {
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    httpdate::parse_http_date(value)
        .ok()
        .map(|at| at.duration_since(SystemTime::now()).unwrap_or_default())
}

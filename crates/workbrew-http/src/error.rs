//! Error types for the Workbrew transport

use std::fmt;
use std::time::Duration;

use reqwest::{header::HeaderMap, Method};
use serde::Deserialize;
use thiserror::Error;

use crate::response::{RateLimit, Response};

/// Result type for Workbrew operations
pub type Result<T> = std::result::Result<T, WorkbrewError>;

/// Coarse error taxonomy, one entry per failure family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Client misconfiguration, raised before any I/O
    Configuration,
    /// No HTTP response was received
    Network,
    /// Client-side validation (missing parameter, bad content type, bad header)
    Validation,
    /// Non-2xx HTTP response
    Api,
    /// JSON encode/decode failure
    Serialization,
    /// Request canceled or deadline exceeded
    Canceled,
}

/// Errors returned by the transport and the resource services
#[derive(Debug, Error)]
pub enum WorkbrewError {
    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Required path parameter was empty
    #[error("{0} is required")]
    MissingParameter(&'static str),

    /// Invalid request header name or value
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Endpoint could not be joined onto the base URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// 2xx response whose body is not JSON
    #[error("{method} {endpoint}: expected application/json response, got {content_type} (status {status})")]
    UnexpectedContentType {
        method: Method,
        endpoint: String,
        status: u16,
        content_type: String,
        response: Box<Response>,
    },

    /// Transport-level failure before an HTTP response existed
    #[error("{method} {endpoint}: network request failed: {source}")]
    Network {
        method: Method,
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx response from the API
    #[error(transparent)]
    Api(Box<ApiError>),

    /// Request body could not be encoded or response body could not be decoded
    #[error("{method} {endpoint}: serialization error: {source}")]
    Serialization {
        method: Method,
        endpoint: String,
        #[source]
        source: serde_json::Error,
        /// The 2xx response whose body failed to decode; `None` for request encoding
        response: Option<Box<Response>>,
    },

    /// Request canceled through its cancellation token
    #[error("Request canceled")]
    Canceled,

    /// Request did not finish before its deadline
    #[error("Request deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

impl WorkbrewError {
    /// Create a new configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        WorkbrewError::Configuration(msg.into())
    }

    /// Failure family of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkbrewError::Configuration(_) => ErrorKind::Configuration,
            WorkbrewError::MissingParameter(_)
            | WorkbrewError::InvalidHeader(_)
            | WorkbrewError::InvalidUrl(_)
            | WorkbrewError::UnexpectedContentType { .. } => ErrorKind::Validation,
            WorkbrewError::Network { .. } => ErrorKind::Network,
            WorkbrewError::Api(_) => ErrorKind::Api,
            WorkbrewError::Serialization { .. } => ErrorKind::Serialization,
            WorkbrewError::Canceled | WorkbrewError::DeadlineExceeded(_) => ErrorKind::Canceled,
        }
    }

    /// The API error, if this is a non-2xx response
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            WorkbrewError::Api(err) => Some(err),
            _ => None,
        }
    }

    /// The HTTP response behind this error, whenever one was received
    pub fn response(&self) -> Option<&Response> {
        match self {
            WorkbrewError::Api(err) => Some(&err.response),
            WorkbrewError::UnexpectedContentType { response, .. } => Some(response),
            WorkbrewError::Serialization { response, .. } => response.as_deref(),
            _ => None,
        }
    }

    /// Check if the request timed out at the network layer
    pub fn is_timeout(&self) -> bool {
        matches!(self, WorkbrewError::Network { source, .. } if source.is_timeout())
    }

    /// Check if the error came from a cancellation token or a deadline
    pub fn is_canceled(&self) -> bool {
        self.kind() == ErrorKind::Canceled
    }

    /// Check if the request is worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkbrewError::Network { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request()
            }
            WorkbrewError::Api(err) => err.is_rate_limited() || err.is_server_error(),
            _ => false,
        }
    }

    /// Server-requested wait before the next attempt, if any
    pub fn retry_after(&self) -> Option<Duration> {
        self.response().and_then(|response| response.rate_limit().retry_after)
    }

    pub fn is_bad_request(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_bad_request)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_unauthorized)
    }

    pub fn is_forbidden(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_forbidden)
    }

    pub fn is_not_found(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_not_found)
    }

    pub fn is_conflict(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_conflict)
    }

    pub fn is_validation_error(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_validation_error)
    }

    pub fn is_failed_dependency(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_failed_dependency)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_rate_limited)
    }

    pub fn is_server_error(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_server_error)
    }

    pub fn is_transient(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_transient)
    }

    pub fn is_free_tier_restriction(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_free_tier_restriction)
    }
}

impl From<ApiError> for WorkbrewError {
    fn from(err: ApiError) -> Self {
        WorkbrewError::Api(Box::new(err))
    }
}

/// Wire format of an API error body
#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<Vec<String>>,
}

/// A non-2xx response from the Workbrew API
#[derive(Debug, Clone, Error)]
pub struct ApiError {
    /// Primary error message
    pub message: String,
    /// Individual error entries from the envelope
    pub errors: Vec<String>,
    /// HTTP status code
    pub status_code: u16,
    /// Canonical reason phrase
    pub status_text: String,
    /// Request path relative to the workspace
    pub endpoint: String,
    /// HTTP method
    pub method: Method,
    /// The full normalized response
    pub response: Response,
}

impl ApiError {
    /// Build an API error from a non-2xx response.
    ///
    /// Message precedence: envelope `message`, then the raw body, then the
    /// default message for the status code.
    pub fn from_response(method: Method, endpoint: impl Into<String>, response: Response) -> Self {
        let envelope: ErrorEnvelope = serde_json::from_slice(&response.body).unwrap_or_default();

        let message = envelope
            .message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .or_else(|| {
                let raw = response.text();
                let raw = raw.trim();
                (!raw.is_empty()).then(|| raw.to_string())
            })
            .unwrap_or_else(|| default_message(response.status_code).to_string());

        Self {
            message,
            errors: envelope.errors.unwrap_or_default(),
            status_code: response.status_code,
            status_text: response.status_text.clone(),
            endpoint: endpoint.into(),
            method,
            response,
        }
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.response.headers
    }

    /// Rate-limit headers of the failed response
    pub fn rate_limit(&self) -> RateLimit {
        self.response.rate_limit()
    }

    fn detail(&self) -> String {
        if self.errors.is_empty() {
            self.message.clone()
        } else {
            format!("{} ({})", self.message, self.errors.join("; "))
        }
    }

    pub fn is_bad_request(&self) -> bool {
        self.status_code == 400
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code == 401
    }

    pub fn is_forbidden(&self) -> bool {
        self.status_code == 403
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == 404
    }

    pub fn is_conflict(&self) -> bool {
        self.status_code == 409
    }

    /// 422 Unprocessable Entity
    pub fn is_validation_error(&self) -> bool {
        self.status_code == 422
    }

    pub fn is_failed_dependency(&self) -> bool {
        self.status_code == 424
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status_code == 429
    }

    pub fn is_server_error(&self) -> bool {
        (500..=599).contains(&self.status_code)
    }

    /// 503 and 504, which usually clear up on their own
    pub fn is_transient(&self) -> bool {
        matches!(self.status_code, 503 | 504)
    }

    /// A 403 telling the caller their plan does not include this feature
    pub fn is_free_tier_restriction(&self) -> bool {
        if !self.is_forbidden() {
            return false;
        }
        std::iter::once(&self.message)
            .chain(self.errors.iter())
            .map(|text| text.to_lowercase())
            .any(|text| text.contains("free subscription") || text.contains("upgrade your plan"))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} {}: {}",
            self.method,
            self.endpoint,
            self.status_code,
            self.status_text,
            self.detail()
        )
    }
}

/// Fallback message when the response carries neither an envelope nor a body
pub fn default_message(status: u16) -> &'static str {
    match status {
        400 => "Bad request: the request was malformed or had invalid parameters",
        401 => "Unauthorized: the API key is missing, invalid or expired",
        403 => "Forbidden: the API key lacks permission or the plan does not include this feature",
        404 => "Not found: the requested resource does not exist",
        409 => "Conflict: the resource already exists or is in a conflicting state",
        422 => "Unprocessable entity: the request failed validation",
        424 => "Failed dependency: a prerequisite request failed",
        429 => "Too many requests: the API quota has been exceeded",
        500 => "Internal server error",
        502 => "Bad gateway: the upstream server returned an invalid response",
        503 => "Service unavailable: the server is temporarily unable to handle the request",
        504 => "Gateway timeout: the upstream server did not respond in time",
        _ => "Unexpected API error",
    }
}

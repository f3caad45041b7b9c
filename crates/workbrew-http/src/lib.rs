//! HTTP transport for the Workbrew API
//!
//! Provides the authenticated, retrying transport shared by every Workbrew
//! resource service.
//!
//! ## Features
//!
//! - **Trait-based design**: services talk to `HttpTransport`, so tests can swap it out
//! - **Configurable**: timeouts, retries, proxy, TLS, user-agent, global headers
//! - **Key rotation**: `AuthManager` swaps the API key without rebuilding the client
//! - **Typed errors**: non-2xx responses become `ApiError` with status predicates
//! - **Cancellation**: every call takes a `RequestContext`

pub mod auth;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod headers;
pub mod middleware;
pub mod query;
pub mod request;
pub mod response;

pub use auth::{AuthConfig, AuthManager, DEFAULT_API_VERSION};
pub use client::{shared_transport, ApiResponse, HttpTransport, Transport, TransportExt};
pub use config::{TransportConfig, DEFAULT_BASE_URL};
pub use context::RequestContext;
pub use error::{ApiError, ErrorKind, Result, WorkbrewError};
pub use headers::{merge_headers, API_VERSION_HEADER};
pub use middleware::{RetryConfig, RetryMiddleware};
pub use query::QueryBuilder;
pub use request::{ApiRequest, FilePart, MultipartUpload, RequestBody, ResponseFormat};
pub use response::{RateLimit, Response};

/// Re-export commonly used types
pub use reqwest::{header, Method, StatusCode};
pub use tokio_util::sync::CancellationToken;

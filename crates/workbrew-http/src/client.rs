//! Workbrew HTTP transport

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, Instrument};
use url::Url;

use crate::{
    auth::{AuthConfig, AuthManager},
    config::TransportConfig,
    context::RequestContext,
    error::{ApiError, Result, WorkbrewError},
    headers::{merge_headers, API_VERSION_HEADER},
    middleware::{RetryConfig, RetryMiddleware},
    query::QueryBuilder,
    request::{ApiRequest, MultipartUpload, RequestBody, ResponseFormat},
    response::Response,
};

/// Sends [`ApiRequest`]s and returns normalized responses
///
/// Implementations classify non-2xx responses as [`WorkbrewError::Api`].
/// Typed verbs are provided by [`TransportExt`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute one logical request, retries included
    async fn execute(&self, ctx: &RequestContext, request: ApiRequest) -> Result<Response>;
}

/// A decoded body together with the response it came from
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub data: T,
    pub response: Response,
}

impl<T> ApiResponse<T> {
    pub fn into_data(self) -> T {
        self.data
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            data: f(self.data),
            response: self.response,
        }
    }
}

/// Production transport backed by reqwest
pub struct Transport {
    inner: reqwest::Client,
    config: TransportConfig,
    auth: Arc<AuthManager>,
    retry: RetryMiddleware,
    workspace_url: String,
}

impl Transport {
    /// Validate `config` and build the underlying client
    pub fn new(config: TransportConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .pool_idle_timeout(config.pool_idle_timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .redirect(if config.max_redirects > 0 {
                reqwest::redirect::Policy::limited(config.max_redirects)
            } else {
                reqwest::redirect::Policy::none()
            });

        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
                WorkbrewError::configuration(format!("invalid proxy '{proxy_url}': {e}"))
            })?;
            builder = builder.proxy(proxy);
        }

        if let Some(path) = &config.root_certificate {
            let pem = std::fs::read(path).map_err(|e| {
                WorkbrewError::configuration(format!(
                    "cannot read root certificate {}: {e}",
                    path.display()
                ))
            })?;
            let certificate = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                WorkbrewError::configuration(format!(
                    "invalid root certificate {}: {e}",
                    path.display()
                ))
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        let inner = builder
            .build()
            .map_err(|e| WorkbrewError::configuration(format!("failed to build HTTP client: {e}")))?;

        let auth = AuthManager::new(AuthConfig::new(
            config.api_key.clone(),
            config.api_version.clone(),
        )?);

        let retry = RetryMiddleware::new(RetryConfig {
            max_retries: config.retry_count,
            initial_delay: config.retry_wait,
            max_delay: config.retry_max_wait,
            ..Default::default()
        });

        debug!(
            "Workbrew transport ready for workspace {} at {}",
            config.workspace, config.base_url
        );

        Ok(Self {
            workspace_url: config.workspace_url(),
            inner,
            config,
            auth: Arc::new(auth),
            retry,
        })
    }

    /// Credentials used for every request; update them to rotate keys
    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    /// Shared handle to the credentials, for callers that outlive a borrow
    pub fn shared_auth(&self) -> Arc<AuthManager> {
        Arc::clone(&self.auth)
    }

    /// Get configuration
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Get underlying reqwest client (for advanced usage)
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    /// Full URL for a workspace-relative endpoint
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let joined = if endpoint.starts_with('/') {
            format!("{}{endpoint}", self.workspace_url)
        } else {
            format!("{}/{endpoint}", self.workspace_url)
        };
        Url::parse(&joined).map_err(|e| WorkbrewError::InvalidUrl(format!("{joined}: {e}")))
    }

    /// One attempt: build, send, read and classify
    async fn send_once(
        &self,
        request: &ApiRequest,
        url: &Url,
        headers: &HeaderMap,
    ) -> Result<Response> {
        let headers = with_credentials(headers, &self.auth.snapshot())?;

        let mut builder = self
            .inner
            .request(request.method.clone(), url.clone())
            .headers(headers.clone());

        if !request.query.is_empty() {
            let pairs: Vec<(&str, &str)> = request.query.pairs().collect();
            builder = builder.query(&pairs);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(bytes) => {
                if !headers.contains_key(CONTENT_TYPE) {
                    builder = builder.header(CONTENT_TYPE, "application/json");
                }
                builder.body(bytes.clone())
            }
            RequestBody::Form(fields) => builder.form(fields),
            RequestBody::Multipart(upload) => builder.multipart(upload.to_form()?),
        };

        let network_error = |source: reqwest::Error| WorkbrewError::Network {
            method: request.method.clone(),
            endpoint: request.endpoint.clone(),
            source,
        };

        let started = Instant::now();
        let raw = builder.send().await.map_err(network_error)?;
        let response = Response::read(raw, started).await.map_err(network_error)?;

        debug!(
            status = response.status_code,
            duration_ms = response.duration.as_millis() as u64,
            bytes = response.size_bytes,
            "Workbrew response received"
        );

        if !response.is_success() {
            let err = ApiError::from_response(request.method.clone(), &request.endpoint, response);
            debug!("Workbrew API error: {err}");
            return Err(err.into());
        }

        if request.format == ResponseFormat::Json {
            validate_json_response(request, &response)?;
        }

        Ok(response)
    }
}

#[async_trait]
impl HttpTransport for Transport {
    async fn execute(&self, ctx: &RequestContext, request: ApiRequest) -> Result<Response> {
        let span = tracing::debug_span!(
            "workbrew_request",
            method = %request.method,
            endpoint = %request.endpoint
        );

        let headers = merge_headers(
            self.config
                .global_headers
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
            request.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )?;
        let url = self.endpoint_url(&request.endpoint)?;

        debug!(parent: &span, "HTTP {} {}", request.method, request.endpoint);

        let attempts = self
            .retry
            .execute(|| self.send_once(&request, &url, &headers))
            .instrument(span);

        ctx.run(attempts).await
    }
}

/// Reject a non-empty 2xx body that declares a non-JSON content type
fn validate_json_response(request: &ApiRequest, response: &Response) -> Result<()> {
    if response.is_empty() {
        return Ok(());
    }

    match response.content_type() {
        Some(content_type) if !is_json_content_type(content_type) => {
            Err(WorkbrewError::UnexpectedContentType {
                method: request.method.clone(),
                endpoint: request.endpoint.clone(),
                status: response.status_code,
                content_type: content_type.to_string(),
                response: Box::new(response.clone()),
            })
        }
        _ => Ok(()),
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}

/// Typed verbs over any [`HttpTransport`]
pub trait TransportExt: HttpTransport {
    /// Execute a JSON request and decode the body
    fn send_json<R>(
        &self,
        ctx: &RequestContext,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse<R>>> + Send
    where
        R: DeserializeOwned + Default + Send,
    {
        async move {
            let method = request.method.clone();
            let endpoint = request.endpoint.clone();
            let response = self
                .execute(ctx, request.with_format(ResponseFormat::Json))
                .await?;
            let data = decode_json(&method, &endpoint, &response)?;
            Ok(ApiResponse { data, response })
        }
    }

    fn get<R>(
        &self,
        ctx: &RequestContext,
        endpoint: &str,
        query: QueryBuilder,
        headers: &[(&str, &str)],
    ) -> impl Future<Output = Result<ApiResponse<R>>> + Send
    where
        R: DeserializeOwned + Default + Send,
    {
        let request = ApiRequest::new(Method::GET, endpoint)
            .with_query(query)
            .with_headers(headers);
        self.send_json(ctx, request)
    }

    fn post<B, R>(
        &self,
        ctx: &RequestContext,
        endpoint: &str,
        body: &B,
        headers: &[(&str, &str)],
    ) -> impl Future<Output = Result<ApiResponse<R>>> + Send
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned + Default + Send,
    {
        let request = ApiRequest::new(Method::POST, endpoint)
            .with_headers(headers)
            .with_json(body);
        async move { self.send_json(ctx, request?).await }
    }

    fn put<B, R>(
        &self,
        ctx: &RequestContext,
        endpoint: &str,
        body: &B,
        headers: &[(&str, &str)],
    ) -> impl Future<Output = Result<ApiResponse<R>>> + Send
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned + Default + Send,
    {
        let request = ApiRequest::new(Method::PUT, endpoint)
            .with_headers(headers)
            .with_json(body);
        async move { self.send_json(ctx, request?).await }
    }

    fn patch<B, R>(
        &self,
        ctx: &RequestContext,
        endpoint: &str,
        body: &B,
        headers: &[(&str, &str)],
    ) -> impl Future<Output = Result<ApiResponse<R>>> + Send
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned + Default + Send,
    {
        let request = ApiRequest::new(Method::PATCH, endpoint)
            .with_headers(headers)
            .with_json(body);
        async move { self.send_json(ctx, request?).await }
    }

    fn delete<R>(
        &self,
        ctx: &RequestContext,
        endpoint: &str,
        query: QueryBuilder,
        headers: &[(&str, &str)],
    ) -> impl Future<Output = Result<ApiResponse<R>>> + Send
    where
        R: DeserializeOwned + Default + Send,
    {
        let request = ApiRequest::new(Method::DELETE, endpoint)
            .with_query(query)
            .with_headers(headers);
        self.send_json(ctx, request)
    }

    fn delete_with_body<B, R>(
        &self,
        ctx: &RequestContext,
        endpoint: &str,
        body: &B,
        headers: &[(&str, &str)],
    ) -> impl Future<Output = Result<ApiResponse<R>>> + Send
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned + Default + Send,
    {
        let request = ApiRequest::new(Method::DELETE, endpoint)
            .with_headers(headers)
            .with_json(body);
        async move { self.send_json(ctx, request?).await }
    }

    /// POST `application/x-www-form-urlencoded` fields
    fn post_form<R>(
        &self,
        ctx: &RequestContext,
        endpoint: &str,
        fields: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> impl Future<Output = Result<ApiResponse<R>>> + Send
    where
        R: DeserializeOwned + Default + Send,
    {
        let request = ApiRequest::new(Method::POST, endpoint)
            .with_headers(headers)
            .with_form(fields);
        self.send_json(ctx, request)
    }

    /// POST a `multipart/form-data` upload
    fn post_multipart<R>(
        &self,
        ctx: &RequestContext,
        endpoint: &str,
        upload: MultipartUpload,
        headers: &[(&str, &str)],
    ) -> impl Future<Output = Result<ApiResponse<R>>> + Send
    where
        R: DeserializeOwned + Default + Send,
    {
        let request = ApiRequest::new(Method::POST, endpoint)
            .with_headers(headers)
            .with_multipart(upload);
        self.send_json(ctx, request)
    }

    /// GET without decoding; the body is in `Response::body`
    fn get_bytes(
        &self,
        ctx: &RequestContext,
        endpoint: &str,
        query: QueryBuilder,
        headers: &[(&str, &str)],
    ) -> impl Future<Output = Result<Response>> + Send {
        let request = ApiRequest::new(Method::GET, endpoint)
            .with_query(query)
            .with_headers(headers)
            .with_format(ResponseFormat::Raw);
        async move { self.execute(ctx, request).await }
    }
}

impl<T: HttpTransport + ?Sized> TransportExt for T {}

/// Credentials replace any same-named global or per-call header
fn with_credentials(headers: &HeaderMap, auth: &AuthConfig) -> Result<HeaderMap> {
    let mut merged = headers.clone();

    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", auth.api_key()))
        .map_err(|_| WorkbrewError::InvalidHeader("invalid API key".to_string()))?;
    bearer.set_sensitive(true);
    merged.insert(AUTHORIZATION, bearer);

    let version = HeaderValue::from_str(auth.api_version()).map_err(|_| {
        WorkbrewError::InvalidHeader(format!("invalid value for header '{API_VERSION_HEADER}'"))
    })?;
    merged.insert(API_VERSION_HEADER, version);

    Ok(merged)
}

/// Decode a 2xx body; an empty body (204, `Content-Length: 0`) yields `R::default()`
fn decode_json<R>(method: &Method, endpoint: &str, response: &Response) -> Result<R>
where
    R: DeserializeOwned + Default,
{
    if response.is_empty() {
        return Ok(R::default());
    }
    serde_json::from_slice(&response.body).map_err(|source| WorkbrewError::Serialization {
        method: method.clone(),
        endpoint: endpoint.to_string(),
        source,
        response: Some(Box::new(response.clone())),
    })
}

/// Create a shared transport (Arc-wrapped for cloning)
pub fn shared_transport(config: TransportConfig) -> Result<Arc<dyn HttpTransport>> {
    Ok(Arc::new(Transport::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> TransportConfig {
        TransportConfig::new("test-key", "acme").with_base_url("https://example.com")
    }

    #[test]
    fn test_transport_creation_with_defaults() {
        assert!(Transport::new(config()).is_ok());
    }

    #[test]
    fn test_transport_creation_with_config() {
        let transport = Transport::new(
            config()
                .with_timeout(Duration::from_secs(10))
                .with_retry_count(2),
        )
        .unwrap();

        assert_eq!(transport.config().timeout, Duration::from_secs(10));
        assert_eq!(transport.config().retry_count, 2);
        assert_eq!(transport.retry.config().max_retries, 2);
    }

    #[test]
    fn test_transport_with_proxy() {
        assert!(Transport::new(config().with_proxy("http://proxy.example.com:8080")).is_ok());
    }

    #[test]
    fn test_invalid_proxy() {
        let result = Transport::new(config().with_proxy("invalid proxy"));
        assert!(matches!(result, Err(WorkbrewError::Configuration(_))));
    }

    #[test]
    fn test_missing_root_certificate() {
        let result = Transport::new(config().with_root_certificate("/nonexistent/ca.pem"));
        assert!(matches!(result, Err(WorkbrewError::Configuration(_))));
    }

    #[test]
    fn test_empty_key_rejected_before_io() {
        let result = Transport::new(TransportConfig::new("", "acme"));
        assert!(matches!(result, Err(WorkbrewError::Configuration(_))));
    }

    #[test]
    fn test_endpoint_url() {
        let transport = Transport::new(config()).unwrap();
        assert_eq!(
            transport.endpoint_url("/devices.json").unwrap().as_str(),
            "https://example.com/workspaces/acme/devices.json"
        );
        assert_eq!(
            transport.endpoint_url("casks.csv").unwrap().as_str(),
            "https://example.com/workspaces/acme/casks.csv"
        );
    }

    #[test]
    fn test_key_rotation() {
        let transport = Transport::new(config()).unwrap();
        transport.auth().update_key("rotated").unwrap();
        assert_eq!(transport.auth().get_key().unwrap(), "rotated");
    }

    #[test]
    fn test_json_content_type_detection() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("Application/JSON"));
        assert!(!is_json_content_type("text/html"));
        assert!(!is_json_content_type("text/csv"));
    }

    #[test]
    fn test_shared_transport_creation() {
        assert!(shared_transport(config()).is_ok());
    }
}

//! Transport configuration

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::DEFAULT_API_VERSION;
use crate::error::{Result, WorkbrewError};
use crate::headers::parse_header;

/// Production console URL
pub const DEFAULT_BASE_URL: &str = "https://console.workbrew.com";

/// Transport configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// API root, without the workspace segment
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Workspace slug inserted as `/workspaces/{workspace}`
    pub workspace: String,

    /// Bearer token; never serialized
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Value of the API version header
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Request timeout
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Connection timeout
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// Maximum retries after the first attempt
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Initial retry wait (exponential backoff)
    #[serde(default = "default_retry_wait")]
    pub retry_wait: Duration,

    /// Upper bound for a single retry wait
    #[serde(default = "default_retry_max_wait")]
    pub retry_max_wait: Duration,

    /// HTTP/HTTPS proxy URL
    #[serde(default)]
    pub proxy: Option<String>,

    /// Custom user agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Headers sent with every request unless overridden per call
    #[serde(default)]
    pub global_headers: BTreeMap<String, String>,

    /// Skip TLS certificate verification
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Extra PEM root certificate to trust
    #[serde(default)]
    pub root_certificate: Option<PathBuf>,

    /// Maximum redirects to follow (0 = no redirects)
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Pool idle timeout
    #[serde(default = "default_pool_idle_timeout")]
    pub pool_idle_timeout: Duration,
}

impl TransportConfig {
    /// Create a config for a workspace with default settings
    pub fn new(api_key: impl Into<String>, workspace: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            workspace: workspace.into(),
            api_key: api_key.into(),
            api_version: default_api_version(),
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            retry_count: default_retry_count(),
            retry_wait: default_retry_wait(),
            retry_max_wait: default_retry_max_wait(),
            proxy: None,
            user_agent: default_user_agent(),
            global_headers: BTreeMap::new(),
            accept_invalid_certs: false,
            root_certificate: None,
            max_redirects: default_max_redirects(),
            pool_idle_timeout: default_pool_idle_timeout(),
        }
    }

    /// Load from `WORKBREW_*` environment variables
    ///
    /// `WORKBREW_API_KEY` and `WORKBREW_WORKSPACE` are required;
    /// `WORKBREW_BASE_URL`, `WORKBREW_API_VERSION`, `WORKBREW_TIMEOUT_SECS`
    /// and `WORKBREW_RETRY_COUNT` are optional.
    pub fn from_env() -> Result<Self> {
        let required = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| WorkbrewError::configuration(format!("{name} is not set")))
        };

        let mut config = Self::new(required("WORKBREW_API_KEY")?, required("WORKBREW_WORKSPACE")?);

        if let Ok(base_url) = std::env::var("WORKBREW_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let Ok(version) = std::env::var("WORKBREW_API_VERSION") {
            config = config.with_api_version(version);
        }
        if let Ok(secs) = std::env::var("WORKBREW_TIMEOUT_SECS") {
            let secs = secs.parse::<u64>().map_err(|_| {
                WorkbrewError::configuration(format!("WORKBREW_TIMEOUT_SECS is not a number: {secs}"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Ok(count) = std::env::var("WORKBREW_RETRY_COUNT") {
            let count = count.parse::<u32>().map_err(|_| {
                WorkbrewError::configuration(format!("WORKBREW_RETRY_COUNT is not a number: {count}"))
            })?;
            config = config.with_retry_count(count);
        }

        Ok(config)
    }

    /// Set base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set API version
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set retry count
    pub fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    /// Set the initial and maximum retry waits
    pub fn with_retry_wait(mut self, wait: Duration, max_wait: Duration) -> Self {
        self.retry_wait = wait;
        self.retry_max_wait = max_wait;
        self
    }

    /// Set proxy URL
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a header sent with every request
    pub fn with_global_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.global_headers.insert(name.into(), value.into());
        self
    }

    /// Trust an extra PEM root certificate
    pub fn with_root_certificate(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_certificate = Some(path.into());
        self
    }

    /// Disable certificate verification
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Check every field, reporting the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(WorkbrewError::configuration("API key cannot be empty"));
        }
        if self.workspace.trim().is_empty() {
            return Err(WorkbrewError::configuration("workspace cannot be empty"));
        }

        let base = url::Url::parse(&self.base_url).map_err(|e| {
            WorkbrewError::configuration(format!("invalid base URL '{}': {e}", self.base_url))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(WorkbrewError::configuration(format!(
                "base URL must be http or https, got '{}'",
                base.scheme()
            )));
        }

        if self.timeout.is_zero() {
            return Err(WorkbrewError::configuration("timeout must be greater than zero"));
        }
        if self.retry_wait > self.retry_max_wait {
            return Err(WorkbrewError::configuration(format!(
                "retry wait {:?} exceeds retry max wait {:?}",
                self.retry_wait, self.retry_max_wait
            )));
        }
        if self.user_agent.is_empty() {
            return Err(WorkbrewError::configuration("user agent cannot be empty"));
        }

        for (name, value) in &self.global_headers {
            parse_header(name, value).map_err(|e| WorkbrewError::configuration(e.to_string()))?;
        }

        Ok(())
    }

    /// `{base_url}/workspaces/{workspace}` without a trailing slash
    pub fn workspace_url(&self) -> String {
        format!(
            "{}/workspaces/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(self.workspace.trim())
        )
    }
}

impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConfig")
            .field("base_url", &self.base_url)
            .field("workspace", &self.workspace)
            .field("api_key", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("retry_count", &self.retry_count)
            .field("retry_wait", &self.retry_wait)
            .field("retry_max_wait", &self.retry_max_wait)
            .field("proxy", &self.proxy)
            .field("user_agent", &self.user_agent)
            .field("global_headers", &self.global_headers)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("root_certificate", &self.root_certificate)
            .field("max_redirects", &self.max_redirects)
            .field("pool_idle_timeout", &self.pool_idle_timeout)
            .finish()
    }
}

// Default value functions for serde
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_wait() -> Duration {
    Duration::from_millis(500)
}

fn default_retry_max_wait() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("workbrew-rust-sdk/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_redirects() -> usize {
    10
}

fn default_pool_idle_timeout() -> Duration {
    Duration::from_secs(90)
}

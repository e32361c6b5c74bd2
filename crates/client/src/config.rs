//! Client configuration
//!
//! [`ClientConfig`] is immutable after client construction and owned by the
//! transport. It can be assembled with the builder or loaded from the
//! environment.
//!
//! ## Environment Variables
//! - `STRATA_API_KEY`: API key used for the `Authorization` header
//! - `STRATA_API_SERVER`: control-plane endpoint (`host`, `host:port`, or a
//!   full `http(s)://host:port` URL)
//! - `STRATA_IMPORT_SERVER`: data-plane endpoint for uploads/imports
//! - `STRATA_PROXY`: HTTP proxy URL
//! - `STRATA_INSECURE`: disable TLS (true/false), for local development

use std::path::PathBuf;
use std::time::Duration;

use strata_domain::{ClientError, Result};

/// Default control-plane endpoint.
pub const DEFAULT_HOST: &str = "api.strata.io";
/// Default data-plane endpoint for uploads and imports.
pub const DEFAULT_IMPORT_HOST: &str = "import.strata.io";

pub(crate) const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_secs(5);
pub(crate) const DEFAULT_MAX_CUMULATIVE_RETRY_DELAY: Duration = Duration::from_secs(600);

/// Endpoint configuration for a [`crate::Client`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Control-plane host.
    pub host: String,
    /// Port; defaults to the scheme's well-known port when `None`.
    pub port: Option<u16>,
    /// Whether to use HTTPS.
    pub use_tls: bool,
    /// Path prefix prepended to every request path (normally empty).
    pub base_path: String,
    /// API key; requests go out unauthenticated when `None`.
    pub api_key: Option<String>,
    /// Data-plane host used for uploads and imports.
    pub import_host: String,
    /// HTTP proxy URL.
    pub proxy: Option<String>,
    /// Caller-supplied CA bundle; the platform roots are used when `None`.
    pub ca_file: Option<PathBuf>,
    pub connect_timeout: Duration,
    /// Bounds a single HTTP round-trip, not a logical call with retries.
    pub request_timeout: Duration,
    /// First backoff delay; doubles on each subsequent retry.
    pub retry_base_delay: Duration,
    /// Cumulative sleep budget across retries of one logical call.
    /// `Duration::ZERO` disables retrying entirely.
    pub max_cumulative_retry_delay: Duration,
    /// Whether POST requests may be retried at all.
    pub retry_post_requests: bool,
    /// Extra headers attached to every request.
    pub headers: Vec<(String, String)>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: None,
            use_tls: true,
            base_path: String::new(),
            api_key: None,
            import_host: DEFAULT_IMPORT_HOST.to_string(),
            proxy: None,
            ca_file: None,
            connect_timeout: Duration::from_secs(60),
            request_timeout: Duration::from_secs(600),
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
            max_cumulative_retry_delay: DEFAULT_MAX_CUMULATIVE_RETRY_DELAY,
            retry_post_requests: false,
            headers: Vec::new(),
            user_agent: concat!("strata-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Start building a configuration.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Load configuration from `STRATA_*` environment variables.
    ///
    /// Unset variables fall back to defaults; only a malformed value is an
    /// error.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(key) = std::env::var("STRATA_API_KEY") {
            if !key.is_empty() {
                config.api_key = Some(key);
            }
        }
        if let Ok(server) = std::env::var("STRATA_API_SERVER") {
            let endpoint = parse_endpoint(&server)?;
            config.host = endpoint.host;
            config.port = endpoint.port;
            if let Some(tls) = endpoint.use_tls {
                config.use_tls = tls;
            }
        }
        if let Ok(server) = std::env::var("STRATA_IMPORT_SERVER") {
            let endpoint = parse_endpoint(&server)?;
            config.import_host = match endpoint.port {
                Some(port) => format!("{}:{}", endpoint.host, port),
                None => endpoint.host,
            };
        }
        if let Ok(proxy) = std::env::var("STRATA_PROXY") {
            if !proxy.is_empty() {
                config.proxy = Some(proxy);
            }
        }
        if env_bool("STRATA_INSECURE", false) {
            config.use_tls = false;
        }

        Ok(config)
    }

    /// Scheme implied by the TLS flag.
    pub fn scheme(&self) -> &'static str {
        if self.use_tls {
            "https"
        } else {
            "http"
        }
    }

    /// `host[:port]` authority for the control plane.
    pub fn authority(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.clone(),
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = Some(port);
        self
    }

    pub fn use_tls(mut self, enabled: bool) -> Self {
        self.config.use_tls = enabled;
        self
    }

    pub fn base_path(mut self, path: impl Into<String>) -> Self {
        self.config.base_path = path.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn import_host(mut self, host: impl Into<String>) -> Self {
        self.config.import_host = host.into();
        self
    }

    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.config.proxy = Some(proxy.into());
        self
    }

    pub fn ca_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ca_file = Some(path.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.config.retry_base_delay = delay;
        self
    }

    /// Total sleep budget across retries; `Duration::ZERO` disables retries.
    pub fn max_cumulative_retry_delay(mut self, ceiling: Duration) -> Self {
        self.config.max_cumulative_retry_delay = ceiling;
        self
    }

    pub fn retry_post_requests(mut self, enabled: bool) -> Self {
        self.config.retry_post_requests = enabled;
        self
    }

    /// Attach a custom header to every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.push((name.into(), value.into()));
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

struct ParsedEndpoint {
    host: String,
    port: Option<u16>,
    use_tls: Option<bool>,
}

/// Parse `host`, `host:port`, or `scheme://host[:port]`.
fn parse_endpoint(value: &str) -> Result<ParsedEndpoint> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ClientError::Config("endpoint must not be empty".to_string()));
    }

    let (use_tls, rest) = if let Some(rest) = value.strip_prefix("https://") {
        (Some(true), rest)
    } else if let Some(rest) = value.strip_prefix("http://") {
        (Some(false), rest)
    } else if value.contains("://") {
        return Err(ClientError::Config(format!("unsupported endpoint scheme: {value:?}")));
    } else {
        (None, value)
    };

    let rest = rest.trim_end_matches('/');
    match rest.split_once(':') {
        Some((host, port)) => {
            let port = port.parse::<u16>().map_err(|e| {
                ClientError::Config(format!("invalid endpoint port in {value:?}: {e}"))
            })?;
            Ok(ParsedEndpoint { host: host.to_string(), port: Some(port), use_tls })
        }
        None => Ok(ParsedEndpoint { host: rest.to_string(), port: None, use_tls }),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

//! HTTP transport core
//!
//! Performs one HTTP call with the configured policy and returns a
//! normalized [`RawResponse`], or raises a typed error. Everything above
//! this layer (the per-resource endpoints) is parameter marshaling.
//!
//! ## Retry policy
//! Applies to GET and POST, never PUT. Exponential backoff starts at the
//! configured base delay and doubles per retry; retrying stops once the
//! cumulative sleep would exceed the ceiling, and a zero ceiling disables
//! it entirely. GET retries 5xx responses and connection faults; POST does
//! the same only when `retry_post_requests` is set. A streaming GET is
//! never retried, because fragments may already have reached the caller.

mod response;
mod retry;

pub use response::RawResponse;
use retry::RetryState;

use bytes::Bytes;
use chrono::Utc;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT_ENCODING, AUTHORIZATION, CONTENT_LENGTH,
    CONTENT_TYPE, DATE,
};
use strata_domain::{ClientError, Result};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::decode;

/// Authorization scheme prefix for the API key header.
const AUTH_SCHEME: &str = "ApiKey";

/// HTTP transport with retry, authentication, and decompression.
///
/// Holds no mutable state; retry state is call-local. Cloned cheaply via
/// the owning [`crate::Client`]'s `Arc`.
pub struct Transport {
    http: reqwest::Client,
    config: ClientConfig,
    auth_header: Option<HeaderValue>,
}

impl Transport {
    /// Build a transport from an immutable configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let auth_header = match &config.api_key {
            Some(key) => Some(
                HeaderValue::from_str(&format!("{AUTH_SCHEME} {key}"))
                    .map_err(|e| ClientError::Config(format!("API key is not header-safe: {e}")))?,
            ),
            None => None,
        };

        let http = build_http_client(&config)?
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config, auth_header })
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Execute a GET request, buffering and decompressing the body.
    ///
    /// The query string is built by percent-encoding each key and value and
    /// joining pairs with `&`. A recognized `Content-Encoding` on the
    /// response is inflated in full before return.
    pub async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<RawResponse> {
        let url = self.url(None, path, params);
        let mut retry = self.new_retry_state();

        loop {
            match self.send_get(&url).await {
                Ok(resp) if resp.is_server_error() => {
                    if let Some(delay) = retry.next_backoff() {
                        warn!(%url, status = resp.status(), ?delay, "server error, retrying GET");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return inflate_response(resp);
                }
                Ok(resp) => return inflate_response(resp),
                Err(err) if is_connection_fault(&err) => {
                    if let Some(delay) = retry.next_backoff() {
                        warn!(%url, error = %err, ?delay, "connection fault, retrying GET");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(network_error("GET", &url, &err));
                }
                Err(err) => return Err(network_error("GET", &url, &err)),
            }
        }
    }

    /// Open a GET request for incremental body consumption.
    ///
    /// Status and headers are available immediately; body fragments are
    /// pulled one at a time via [`StreamingGet::next_chunk`]. Once
    /// streaming has begun nothing is retried, because fragments may
    /// already have reached the caller; connection faults surface
    /// immediately, 5xx included.
    pub async fn get_streaming(&self, path: &str, params: &[(&str, String)]) -> Result<StreamingGet> {
        let url = self.url(None, path, params);
        debug!(%url, "opening streaming GET request");

        let resp = self
            .http
            .get(&url)
            .headers(self.call_headers())
            .header(ACCEPT_ENCODING, "deflate, gzip")
            .send()
            .await
            .map_err(|e| network_error("GET", &url, &e))?;

        Ok(StreamingGet { resp, url, received: 0 })
    }

    /// Execute a GET request, forwarding raw body fragments to `on_chunk`.
    ///
    /// The handler receives each pre-decompression fragment together with
    /// the running total of bytes received so far. The returned response
    /// has an empty body on success; a non-2xx response is buffered (error
    /// bodies are small) and returned for classification without invoking
    /// the handler.
    pub async fn get_stream<F>(
        &self,
        path: &str,
        params: &[(&str, String)],
        mut on_chunk: F,
    ) -> Result<RawResponse>
    where
        F: FnMut(&[u8], u64) -> Result<()>,
    {
        let mut stream = self.get_streaming(path, params).await?;
        if !stream.is_success() {
            return stream.into_error_response().await;
        }

        let status = stream.status();
        let headers = stream.headers().clone();
        while let Some(chunk) = stream.next_chunk().await? {
            on_chunk(&chunk, stream.received())?;
        }
        Ok(RawResponse::new(status, headers, Vec::new()))
    }

    /// Execute a POST request with an optional form-encoded body.
    ///
    /// With no params an explicit zero-length body is sent. The response is
    /// never transparently decompressed (control-plane responses are small
    /// JSON). Retried only when `retry_post_requests` is configured.
    pub async fn post(&self, path: &str, params: Option<&[(&str, String)]>) -> Result<RawResponse> {
        let url = self.url(None, path, &[]);
        let mut retry = self.new_retry_state();
        let retryable = self.config.retry_post_requests;

        loop {
            match self.send_post(&url, params).await {
                Ok(resp) if resp.is_server_error() && retryable => {
                    if let Some(delay) = retry.next_backoff() {
                        warn!(%url, status = resp.status(), ?delay, "server error, retrying POST");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Ok(resp);
                }
                Ok(resp) => return Ok(resp),
                Err(err) if is_connection_fault(&err) && retryable => {
                    if let Some(delay) = retry.next_backoff() {
                        warn!(%url, error = %err, ?delay, "connection fault, retrying POST");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(network_error("POST", &url, &err));
                }
                Err(err) => return Err(network_error("POST", &url, &err)),
            }
        }
    }

    /// Execute a PUT request with a raw byte body of exactly `size` bytes.
    ///
    /// Used only for bulk upload/import, which lives on the data-plane host
    /// (`host_override`, falling back to the configured import host). The
    /// connection is torn down after the call rather than pooled: uploads
    /// are large and infrequent, and a stale pooled connection is worth
    /// more than the reuse. Never retried.
    pub async fn put(
        &self,
        path: &str,
        body: Bytes,
        size: u64,
        host_override: Option<&str>,
    ) -> Result<RawResponse> {
        let host = host_override.unwrap_or(&self.config.import_host);
        let url = self.url(Some(host), path, &[]);
        debug!(%url, size, "sending PUT request");

        // One-shot client: zero idle pool, so the connection closes on drop.
        let client = build_http_client(&self.config)?
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        let resp = client
            .put(&url)
            .headers(self.call_headers())
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, size)
            .body(body)
            .send()
            .await
            .map_err(|e| network_error("PUT", &url, &e))?;

        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp.bytes().await.map_err(|e| network_error("PUT", &url, &e))?;
        Ok(RawResponse::new(status, headers, body.to_vec()))
    }

    async fn send_get(&self, url: &str) -> std::result::Result<RawResponse, reqwest::Error> {
        debug!(%url, "sending GET request");
        let resp = self
            .http
            .get(url)
            .headers(self.call_headers())
            .header(ACCEPT_ENCODING, "deflate, gzip")
            .send()
            .await?;

        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;
        debug!(%url, status, bytes = body.len(), "received GET response");
        Ok(RawResponse::new(status, headers, body.to_vec()))
    }

    async fn send_post(
        &self,
        url: &str,
        params: Option<&[(&str, String)]>,
    ) -> std::result::Result<RawResponse, reqwest::Error> {
        debug!(%url, "sending POST request");
        let builder = self.http.post(url).headers(self.call_headers());
        let builder = match params {
            Some(params) => builder.form(params),
            None => builder.header(CONTENT_LENGTH, 0).body(Vec::new()),
        };
        let resp = builder.send().await?;

        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;
        debug!(%url, status, bytes = body.len(), "received POST response");
        Ok(RawResponse::new(status, headers, body.to_vec()))
    }

    fn new_retry_state(&self) -> RetryState {
        RetryState::new(self.config.retry_base_delay, self.config.max_cumulative_retry_delay)
    }

    /// Per-call headers: `Authorization` (when a key is configured) and a
    /// fresh `Date`.
    fn call_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(auth) = &self.auth_header {
            headers.insert(AUTHORIZATION, auth.clone());
        }
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        if let Ok(value) = HeaderValue::from_str(&date) {
            headers.insert(DATE, value);
        }
        headers
    }

    /// Build `scheme://authority[/base_path]/path?query`.
    fn url(&self, host_override: Option<&str>, path: &str, params: &[(&str, String)]) -> String {
        let authority = match host_override {
            Some(host) => host.to_string(),
            None => self.config.authority(),
        };
        let mut url =
            format!("{}://{}{}{}", self.config.scheme(), authority, self.config.base_path, path);
        if !params.is_empty() {
            url.push('?');
            url.push_str(&encode_params(params));
        }
        url
    }
}

/// An in-flight GET response whose body has not been consumed.
///
/// Produced by [`Transport::get_streaming`]. The caller inspects status
/// and headers, then either drains fragments with
/// [`next_chunk`](Self::next_chunk) or, for a failed request, buffers the
/// error body with [`into_error_response`](Self::into_error_response).
pub struct StreamingGet {
    resp: reqwest::Response,
    url: String,
    received: u64,
}

impl StreamingGet {
    pub fn status(&self) -> u16 {
        self.resp.status().as_u16()
    }

    pub fn is_success(&self) -> bool {
        self.resp.status().is_success()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.resp.headers()
    }

    /// Value of the `Content-Encoding` header, if present and valid ASCII.
    pub fn content_encoding(&self) -> Option<&str> {
        self.resp.headers().get(reqwest::header::CONTENT_ENCODING).and_then(|v| v.to_str().ok())
    }

    /// Pull the next raw (pre-decompression) fragment, or `None` at end of
    /// body.
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        let chunk =
            self.resp.chunk().await.map_err(|e| network_error("GET", &self.url, &e))?;
        if let Some(chunk) = &chunk {
            self.received += chunk.len() as u64;
        }
        Ok(chunk)
    }

    /// Total raw bytes received so far.
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Buffer the remaining body and return a [`RawResponse`], for handing
    /// a failed request to the error classifier.
    pub async fn into_error_response(self) -> Result<RawResponse> {
        let status = self.resp.status().as_u16();
        let headers = self.resp.headers().clone();
        let body =
            self.resp.bytes().await.map_err(|e| network_error("GET", &self.url, &e))?;
        Ok(RawResponse::new(status, headers, body.to_vec()))
    }
}

/// Percent-encode each key/value and join pairs with `&`.
pub(crate) fn encode_params(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-encode a user-supplied path segment.
pub(crate) fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Shared reqwest builder: TLS floor, peer verification, CA bundle, proxy,
/// timeouts, custom headers.
fn build_http_client(config: &ClientConfig) -> Result<reqwest::ClientBuilder> {
    // TLS 1.2 floor is a fixed hardening rule, not configurable per call.
    let mut builder = reqwest::Client::builder()
        .min_tls_version(reqwest::tls::Version::TLS_1_2)
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(config.user_agent.clone());

    if let Some(proxy) = &config.proxy {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| ClientError::Config(format!("invalid proxy {proxy:?}: {e}")))?;
        builder = builder.proxy(proxy);
    }

    if let Some(ca_file) = &config.ca_file {
        let pem = std::fs::read(ca_file).map_err(|e| {
            ClientError::Config(format!("failed to read CA file {}: {e}", ca_file.display()))
        })?;
        let cert = reqwest::Certificate::from_pem(&pem)
            .map_err(|e| ClientError::Config(format!("invalid CA certificate: {e}")))?;
        builder = builder.add_root_certificate(cert);
    }

    if !config.headers.is_empty() {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = name
                .parse::<HeaderName>()
                .map_err(|e| ClientError::Config(format!("invalid header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ClientError::Config(format!("invalid header value: {e}")))?;
            headers.insert(name, value);
        }
        builder = builder.default_headers(headers);
    }

    Ok(builder)
}

/// Undo a recognized transfer compression on a fully buffered body.
fn inflate_response(resp: RawResponse) -> Result<RawResponse> {
    let body = decode::inflate_all(resp.content_encoding(), resp.body())?;
    Ok(RawResponse::new(resp.status(), resp.headers().clone(), body))
}

/// Whether a transport error is a connection-level fault worth retrying:
/// refused/reset connections, timeouts, TLS and DNS failures, or an
/// unexpected end of stream while reading the body.
fn is_connection_fault(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
}

fn network_error(method: &str, url: &str, err: &reqwest::Error) -> ClientError {
    ClientError::Network(format!("{method} {url} failed: {err}"))
}

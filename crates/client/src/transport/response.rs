//! Normalized HTTP response
//!
//! The transport returns a [`RawResponse`] for every completed HTTP
//! exchange, success or not; interpreting a non-2xx status is the caller's
//! job (via the error classifier).

use reqwest::header::{HeaderMap, CONTENT_ENCODING};
use strata_domain::{ClientError, Result};

/// A buffered HTTP response: status, headers, and body bytes.
///
/// For streaming GETs the body is empty; the fragments were handed to the
/// caller's chunk handler instead.
#[derive(Debug)]
pub struct RawResponse {
    status: u16,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl RawResponse {
    pub(crate) fn new(status: u16, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self { status, headers, body }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Value of the `Content-Encoding` header, if present and valid ASCII.
    pub fn content_encoding(&self) -> Option<&str> {
        self.headers.get(CONTENT_ENCODING).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Body as UTF-8 text, lossily converted.
    ///
    /// Error bodies occasionally carry bytes in other encodings; for
    /// diagnostics a lossy conversion beats a decode failure.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ClientError::Decode(format!("invalid JSON response body: {e}")))
    }
}

//! Error classification
//!
//! Turns a non-2xx [`RawResponse`] into a typed [`ClientError`]. The
//! status code picks the error kind; the message is extracted from the
//! JSON error body when the service sent one, falling back to the raw
//! body and then to the bare status code.

use strata_domain::{ClientError, ErrorKind, Result};

use crate::transport::RawResponse;

/// Classify a failed response under a caller-supplied context string.
///
/// `expected` names the error kind any client-error status means for
/// this particular call and takes precedence over the status map (a 400
/// from the password-authentication endpoint is an authentication
/// failure, not a generic API error).
pub(crate) fn classify(
    resp: &RawResponse,
    context: &str,
    expected: Option<ErrorKind>,
) -> ClientError {
    let body = resp.text();
    let detail = error_message(&body)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("HTTP status {}", resp.status())
            } else {
                trimmed.to_string()
            }
        });
    let message = format!("{context}: {detail}");

    let kind = match (expected, resp.status()) {
        (Some(kind), status) if (400..500).contains(&status) => kind,
        (_, 401) => ErrorKind::Auth,
        (_, 403) => ErrorKind::Forbidden,
        (_, 404) => ErrorKind::NotFound,
        (_, 409) => ErrorKind::AlreadyExists,
        _ => ErrorKind::Api,
    };

    ClientError::from_kind(kind, resp.status(), message, body)
}

/// Return `Ok(())` for a 2xx response, a classified error otherwise.
pub(crate) fn ensure_success(resp: &RawResponse, context: &str) -> Result<()> {
    if resp.is_success() {
        Ok(())
    } else {
        Err(classify(resp, context, None))
    }
}

/// Like [`ensure_success`], with an expected kind for unmapped 4xx codes.
pub(crate) fn ensure_success_as(
    resp: &RawResponse,
    context: &str,
    expected: ErrorKind,
) -> Result<()> {
    if resp.is_success() {
        Ok(())
    } else {
        Err(classify(resp, context, Some(expected)))
    }
}

/// Pull a human-readable message out of a JSON error body.
///
/// The service uses both `{"message": ...}` and `{"error": ...}` shapes.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|v| v.as_str())
        .or_else(|| value.get("error").and_then(|v| v.as_str()))
        .map(str::to_string)
}

//! Error types used throughout the client
//!
//! Every failure surfaces as a [`ClientError`]; there is no boolean or
//! sentinel error path. Transport retries are internal and invisible here.

use std::time::Duration;

use thiserror::Error;

/// Error kinds derived from HTTP status codes.
///
/// Used by the error classifier, and by call sites that know which client
/// error a given endpoint produces (e.g. `authenticate` maps any 4xx to
/// `Auth` regardless of the exact status).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    Forbidden,
    AlreadyExists,
    NotFound,
    Api,
}

/// Main error type for Strata client operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// Client-side validation failure; the request was never sent.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Connection-level fault (refused, reset, timeout, TLS, DNS) that
    /// survived the retry policy.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {message}")]
    Auth { message: String, body: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String, body: String },

    #[error("Already exists: {message}")]
    AlreadyExists { message: String, body: String },

    #[error("Not found: {message}")]
    NotFound { message: String, body: String },

    /// Any other non-2xx response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String, body: String },

    /// Raised only by the job polling loop.
    #[error("Timed out after {timeout:?} waiting for job completion (poll interval {poll_interval:?})")]
    Timeout { timeout: Duration, poll_interval: Duration },

    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed response body (JSON or record stream).
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ClientError {
    /// Construct a status-derived error of the given kind.
    pub fn from_kind(kind: ErrorKind, status: u16, message: String, body: String) -> Self {
        match kind {
            ErrorKind::Auth => Self::Auth { message, body },
            ErrorKind::Forbidden => Self::Forbidden { message, body },
            ErrorKind::AlreadyExists => Self::AlreadyExists { message, body },
            ErrorKind::NotFound => Self::NotFound { message, body },
            ErrorKind::Api => Self::Api { status, message, body },
        }
    }

    /// The kind of a status-derived error, if this is one.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Auth { .. } => Some(ErrorKind::Auth),
            Self::Forbidden { .. } => Some(ErrorKind::Forbidden),
            Self::AlreadyExists { .. } => Some(ErrorKind::AlreadyExists),
            Self::NotFound { .. } => Some(ErrorKind::NotFound),
            Self::Api { .. } => Some(ErrorKind::Api),
            _ => None,
        }
    }

    /// The raw response body attached to a status-derived error, if any.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Auth { body, .. }
            | Self::Forbidden { body, .. }
            | Self::AlreadyExists { body, .. }
            | Self::NotFound { body, .. }
            | Self::Api { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Result type alias for Strata client operations
pub type Result<T> = std::result::Result<T, ClientError>;

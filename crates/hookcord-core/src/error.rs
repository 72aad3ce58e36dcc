//! Errors shared across crates.
//!
//! Route and option errors belong to `hookcord-framework`, startup errors to
//! `hookcord-runtime`.

use thiserror::Error;

// =============================================================================
// Signature Errors
// =============================================================================

/// Errors produced while validating a signed interaction request.
///
/// Every variant maps to an HTTP 401 response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// A required signature header was absent.
    #[error("missing header: {0}")]
    MissingHeader(&'static str),

    /// The signature header was not 64 hex-encoded bytes.
    #[error("malformed signature")]
    MalformedSignature,

    /// The configured public key was not 32 hex-encoded bytes.
    #[error("malformed public key: {0}")]
    MalformedKey(String),

    /// The signature did not verify against the timestamp and body.
    #[error("invalid request signature")]
    Invalid,
}

// =============================================================================
// Platform API Errors
// =============================================================================

/// Errors returned by calls to the remote platform's REST API.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The addressed resource no longer exists (HTTP 404).
    ///
    /// For message edits this means the interaction has expired or was
    /// deleted; the stream feeding it should be cancelled.
    #[error("resource not found")]
    NotFound,

    /// The platform answered with a non-success status other than 404.
    #[error("platform answered {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, timeout or body-read failure.
    #[error("platform unreachable: {0}")]
    Request(String),

    /// The edit payload could not be encoded as JSON.
    #[error("cannot encode payload: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =============================================================================
// Listener / client setup
// =============================================================================

/// Failures setting up the HTTP listener or the outbound client.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("cannot listen on {addr}: {reason}")]
    Bind { addr: String, reason: String },

    /// The HTTP client rejected its settings (TLS backend, timeouts).
    #[error("HTTP client setup failed: {0}")]
    InvalidConfig(String),

    #[error("socket error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

pub type SignatureResult<T> = Result<T, SignatureError>;
pub type ApiResult<T> = Result<T, ApiError>;
pub type TransportResult<T> = Result<T, TransportError>;

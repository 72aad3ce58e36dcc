//! Runtime error types.

use hookcord_core::{ApiError, SignatureError, TransportError};
use hookcord_framework::RouteError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while building or running the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A route pattern was rejected at registration.
    #[error("Route error: {0}")]
    Route(#[from] RouteError),

    /// The configured public key is unusable.
    #[error("Signature key error: {0}")]
    Signature(#[from] SignatureError),

    /// The listener or REST client could not be set up.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A platform call failed.
    #[error("Platform API error: {0}")]
    Api(#[from] ApiError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

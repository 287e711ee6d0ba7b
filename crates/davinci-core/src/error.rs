//! Error types for gateway operations.

use thiserror::Error;

/// Errors reported by a [`Gateway`](crate::Gateway) implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The referenced message, channel or interaction does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The bot lacks the permission required for the operation.
    #[error("missing permission: {0}")]
    Forbidden(String),

    /// The platform rejected or failed the request.
    #[error("gateway request failed: {0}")]
    Request(String),

    /// The gateway connection is not available.
    #[error("gateway is not connected")]
    NotConnected,
}

impl GatewayError {
    /// Creates a request error.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    /// Creates a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

//! Error types for image handling.

use thiserror::Error;

/// Fetching image bytes failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("image request failed with HTTP status {0}")]
    Status(u16),

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("image request failed: {0}")]
    Transport(String),
}

/// Transforming image bytes failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),
}

/// No file extension could be derived from a URL.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no file extension in '{url}'")]
pub struct ExtensionError {
    pub url: String,
}

/// Any failure of the image pipeline.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The message carries no image reference.
    #[error("no image found on the message")]
    NoImage,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Extension(#[from] ExtensionError),

    /// The blocking transform task did not complete.
    #[error("transform task failed: {0}")]
    Join(String),
}

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

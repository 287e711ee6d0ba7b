//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while starting the bot.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The bookmark store could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] davinci_storage::StorageError),

    /// The image fetcher could not be built.
    #[error("Media error: {0}")]
    Media(#[from] davinci_media::FetchError),

    /// Two commands claimed the same name or alias.
    #[error("Command registration failed: {0}")]
    Registry(#[from] davinci_framework::RegistryError),

    /// Shutdown signal handlers could not be installed.
    #[error("Signal handler error: {0}")]
    Signal(#[from] std::io::Error),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors from installing the global subscriber.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to install subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),

    #[error("Failed to open log file: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),
}

//! Error types for the Da Vinci framework.

use thiserror::Error;

use davinci_core::GatewayError;

/// A boxed error from any layer below a handler.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building a command registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A name or alias collides with one already registered.
    #[error("'{name}' is already registered by command '{existing}'")]
    DuplicateName {
        /// The colliding name or alias.
        name: String,
        /// Primary name of the command that already owns it.
        existing: String,
    },

    /// No command matches the token.
    #[error("no command named '{0}'")]
    NotFound(String),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors returned by command, suggestion and button handlers.
///
/// Any error that reaches the router is logged with the handler identity and
/// answered with one generic failure notice, unless it is
/// [`Reported`](HandlerError::Reported).
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A gateway call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A service the handler needs was not registered in the runtime context.
    #[error("service not registered: {0}")]
    ServiceNotFound(&'static str),

    /// The handler already told the user something went wrong; the router
    /// only logs the inner error.
    #[error("{source}")]
    Reported {
        #[source]
        source: Box<HandlerError>,
    },

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),

    /// Any other failure (media, storage, ...).
    #[error(transparent)]
    Other(BoxError),
}

impl HandlerError {
    /// Wraps an arbitrary error.
    pub fn other(err: impl Into<BoxError>) -> Self {
        Self::Other(err.into())
    }

    /// Marks an error as already reported to the user.
    pub fn reported(err: impl Into<HandlerError>) -> Self {
        match err.into() {
            reported @ Self::Reported { .. } => reported,
            source => Self::Reported {
                source: Box::new(source),
            },
        }
    }

    /// Returns `true` if the user was already told about this failure.
    pub fn is_reported(&self) -> bool {
        matches!(self, Self::Reported { .. })
    }
}

/// Result type returned by handlers.
pub type HandlerResult<T = ()> = Result<T, HandlerError>;

//! Da Vinci Runtime - startup and the event loop.
//!
//! - Layered configuration ([`ConfigLoader`], [`DavinciConfig`])
//! - Logging setup ([`LoggingBuilder`], [`logging::init_from_config`])
//! - Service wiring and the event loop ([`DavinciRuntime`])
//!
//! ```rust,ignore
//! use davinci_runtime::DavinciRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (tx, rx) = tokio::sync::mpsc::channel(64);
//!     let runtime = DavinciRuntime::builder(gateway).build()?;
//!     // feed `tx` from the platform connection
//!     runtime.run(rx).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{ConfigError, ConfigLoader, ConfigResult, DavinciConfig, LoggingConfig, Profile};
pub use error::{LoggingError, RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{DavinciRuntime, RuntimeBuilder};

pub use tracing;
pub use tracing_subscriber;

/// Logging macros.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}

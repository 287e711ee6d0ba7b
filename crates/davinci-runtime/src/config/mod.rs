//! Configuration for the Da Vinci runtime.
//!
//! Layered loading through figment (see [`ConfigLoader`]) and validation of
//! the values the bot cannot run without.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{
    BotSettings, DavinciConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig,
    SpanEventConfig,
};
pub use validation::validate_config;

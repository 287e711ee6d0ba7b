//! Configuration validation.

use davinci_storage::StorageBackend;

use super::error::{ConfigError, ConfigResult};
use super::schema::{BotSettings, DavinciConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &DavinciConfig) -> ConfigResult<()> {
    validate_bot_settings(&config.bot)?;

    if config.storage.backend == StorageBackend::Sqlite && config.storage.path.is_none() {
        return Err(ConfigError::missing_field("storage.path"));
    }

    if config.media.fetch_timeout_secs == 0 {
        return Err(ConfigError::validation(
            "Image fetch timeout must be greater than 0",
        ));
    }

    validate_logging(&config.logging)
}

fn validate_bot_settings(bot: &BotSettings) -> ConfigResult<()> {
    if bot.prefix.trim().is_empty() {
        return Err(ConfigError::validation("Command prefix cannot be empty"));
    }

    if bot.pagination_timeout_ms == 0 {
        return Err(ConfigError::validation(
            "Pagination timeout must be greater than 0",
        ));
    }

    if bot.help_page_size == 0 || bot.bookmark_page_size == 0 {
        return Err(ConfigError::validation("Page sizes must be greater than 0"));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&DavinciConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_prefix() {
        let mut config = DavinciConfig::default();
        config.bot.prefix = " \t".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_zero_values() {
        let mut config = DavinciConfig::default();
        config.bot.pagination_timeout_ms = 0;
        assert!(validate_config(&config).is_err());

        let mut config = DavinciConfig::default();
        config.bot.bookmark_page_size = 0;
        assert!(validate_config(&config).is_err());

        let mut config = DavinciConfig::default();
        config.media.fetch_timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_sqlite_needs_path() {
        let mut config = DavinciConfig::default();
        config.storage.path = None;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field } if field == "storage.path"));

        config.storage.backend = StorageBackend::Memory;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = DavinciConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());
    }
}

use crate::config::types::{Config, CrawlerConfig, PlatformConfig, StorageConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_storage_config(&config.storage)?;
    validate_platform_config(&config.platform)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if !(1970..=9999).contains(&config.cutoff_year) {
        return Err(ConfigError::Validation(format!(
            "cutoff-year must be between 1970 and 9999, got {}",
            config.cutoff_year
        )));
    }

    if config.bootstrap_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "bootstrap-timeout-secs must be >= 1, got {}",
            config.bootstrap_timeout_secs
        )));
    }

    if config.call_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "call-timeout-secs must be >= 1, got {}",
            config.call_timeout_secs
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.blob_root.is_empty() {
        return Err(ConfigError::Validation(
            "blob-root cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates platform configuration
fn validate_platform_config(config: &PlatformConfig) -> Result<(), ConfigError> {
    if config.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "platform name cannot be empty".to_string(),
        ));
    }

    if config.export_root.is_empty() || config.download_dir.is_empty() {
        return Err(ConfigError::Validation(
            "export-root and download-dir cannot be empty".to_string(),
        ));
    }

    if config.export_root == config.download_dir {
        // Uploads delete downloaded files, which would eat the exports
        return Err(ConfigError::Validation(
            "download-dir must differ from export-root".to_string(),
        ));
    }

    Ok(())
}

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Tracker base URL is an http(s) URL
/// - Request timeout is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let base_url = config.tracker.base_url.trim();
    if base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "tracker.base_url cannot be empty".to_string(),
        ));
    }
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "tracker.base_url must be an http(s) URL, got '{}'",
            base_url
        )));
    }

    if config.tracker.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "tracker.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LoggingConfig, TrackerConfig};

    fn config_with(tracker: TrackerConfig) -> Config {
        Config {
            tracker,
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_empty_base_url_fails() {
        let config = config_with(TrackerConfig {
            base_url: "  ".to_string(),
            ..TrackerConfig::default()
        });
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_non_http_base_url_fails() {
        let config = config_with(TrackerConfig {
            base_url: "ftp://tracker.example".to_string(),
            ..TrackerConfig::default()
        });
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let config = config_with(TrackerConfig {
            timeout_secs: 0,
            ..TrackerConfig::default()
        });
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}

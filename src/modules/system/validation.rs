use crate::models::{ApiConfig, AppConfig, AuthConfig};
use std::fmt;

#[derive(Debug, Clone)]
pub struct ConfigError {
    pub field: String,
    pub message: String,
    pub actual_value: Option<String>,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.actual_value {
            Some(val) => write!(f, "  • {}: {} (got: {})", self.field, self.message, val),
            None => write!(f, "  • {}: {}", self.field, self.message),
        }
    }
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            actual_value: None,
        }
    }

    fn with_value(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            actual_value: Some(value.to_string()),
        }
    }
}

/// Collects every violation instead of stopping at the first one.
pub fn validate_app_config(config: &AppConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    validate_api_config(&config.api, &mut errors);
    validate_auth_config(&config.auth, &mut errors);
    if config.logging.retention_days == 0 {
        errors.push(ConfigError::with_value(
            "logging.retention_days",
            "must be at least 1 day",
            config.logging.retention_days,
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_api_config(config: &ApiConfig, errors: &mut Vec<ConfigError>) {
    if config.request_timeout_secs == 0 {
        errors.push(ConfigError::with_value(
            "api.request_timeout_secs",
            "must be greater than 0",
            config.request_timeout_secs,
        ));
    } else if config.request_timeout_secs > 600 {
        errors.push(ConfigError::with_value(
            "api.request_timeout_secs",
            "should not exceed 600 seconds (10 minutes)",
            config.request_timeout_secs,
        ));
    }

    if !(1..=100_000).contains(&config.report_row_limit) {
        errors.push(ConfigError::with_value(
            "api.report_row_limit",
            "must be between 1 and 100000",
            config.report_row_limit,
        ));
    }

    if let Some(proxy) = config.proxy_url.as_deref() {
        let proxy = proxy.trim();
        if proxy.is_empty() {
            errors.push(ConfigError::new("api.proxy_url", "must not be empty when set"));
        } else if reqwest::Proxy::all(proxy).is_err() {
            errors.push(ConfigError::with_value(
                "api.proxy_url",
                "must be a valid proxy URL (e.g. http://127.0.0.1:8080)",
                proxy,
            ));
        }
    }
}

fn validate_auth_config(config: &AuthConfig, errors: &mut Vec<ConfigError>) {
    if !(0..=3600).contains(&config.refresh_skew_secs) {
        errors.push(ConfigError::with_value(
            "auth.refresh_skew_secs",
            "must be between 0 and 3600",
            config.refresh_skew_secs,
        ));
    }
    if config.credentials_dir.as_os_str().is_empty() {
        errors.push(ConfigError::new("auth.credentials_dir", "must not be empty"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_app_config(&AppConfig::new()).is_ok());
    }

    #[test]
    fn reports_every_violation_together() {
        let mut config = AppConfig::new();
        config.api.request_timeout_secs = 0;
        config.api.report_row_limit = 0;
        config.auth.refresh_skew_secs = -5;
        config.auth.credentials_dir = PathBuf::new();

        let errors = validate_app_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "api.request_timeout_secs",
                "api.report_row_limit",
                "auth.refresh_skew_secs",
                "auth.credentials_dir"
            ]
        );
    }

    #[test]
    fn timeout_upper_bound_and_display() {
        let mut config = AppConfig::new();
        config.api.request_timeout_secs = 601;
        let errors = validate_app_config(&config).unwrap_err();
        assert_eq!(
            errors[0].to_string(),
            "  • api.request_timeout_secs: should not exceed 600 seconds (10 minutes) (got: 601)"
        );
    }

    #[test]
    fn blank_proxy_url_is_rejected() {
        let mut config = AppConfig::new();
        config.api.proxy_url = Some("  ".to_string());
        let errors = validate_app_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "api.proxy_url");
    }
}

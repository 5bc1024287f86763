use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Per-call timeout applied to every outbound GA4 / OAuth request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_report_row_limit")]
    pub report_row_limit: u32,
    /// Optional outbound proxy for all Google API traffic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_report_row_limit() -> u32 {
    500
}

impl ApiConfig {
    pub fn new() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            report_row_limit: default_report_row_limit(),
            proxy_url: None,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Folder scanned for the first `.json` service-account key.
    #[serde(default = "default_credentials_dir")]
    pub credentials_dir: PathBuf,
    #[serde(default = "default_refresh_skew")]
    pub refresh_skew_secs: i64,
}

fn default_credentials_dir() -> PathBuf {
    PathBuf::from("credentials")
}

fn default_refresh_skew() -> i64 {
    60
}

impl AuthConfig {
    pub fn new() -> Self {
        Self {
            credentials_dir: default_credentials_dir(),
            refresh_skew_secs: default_refresh_skew(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,
}

fn default_retention_days() -> u64 {
    7
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            api: ApiConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

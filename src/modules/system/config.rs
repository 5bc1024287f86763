use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{ENV_CREDENTIALS_DIR, ENV_DATA_DIR, ENV_REQUEST_TIMEOUT};
use crate::error::{AppError, AppResult};
use crate::models::AppConfig;

const CONFIG_FILE: &str = "config.json";
const DATA_DIR: &str = ".config/ga4-mcp";

/// `$GA4_MCP_DATA_DIR`, else `~/.config/ga4-mcp`. Created on demand.
pub fn get_data_dir() -> AppResult<PathBuf> {
    let data_dir = match std::env::var(ENV_DATA_DIR) {
        Ok(env_path) if !env_path.trim().is_empty() => PathBuf::from(env_path.trim()),
        _ => dirs::home_dir()
            .map(|home| home.join(DATA_DIR))
            .ok_or_else(|| AppError::Config("failed_to_get_home_dir".to_string()))?,
    };
    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)
            .map_err(|e| AppError::Config(format!("failed_to_create_data_dir: {}", e)))?;
    }
    Ok(data_dir)
}

pub fn load_app_config() -> AppResult<AppConfig> {
    let mut config = load_app_config_from(&get_data_dir()?)?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Reads `<data_dir>/config.json`, writing the defaults when it does not exist yet.
pub fn load_app_config_from(data_dir: &Path) -> AppResult<AppConfig> {
    let config_path = data_dir.join(CONFIG_FILE);

    if !config_path.exists() {
        let config = AppConfig::new();
        if let Err(e) = save_app_config_to(data_dir, &config) {
            tracing::warn!("Failed to write default config: {}", e);
        }
        return Ok(config);
    }

    let content = fs::read_to_string(&config_path)
        .map_err(|e| AppError::Config(format!("failed_to_read_config_file: {}", e)))?;
    serde_json::from_str(&content)
        .map_err(|e| AppError::Config(format!("failed_to_parse_config_file: {}", e)))
}

pub fn save_app_config_to(data_dir: &Path, config: &AppConfig) -> AppResult<()> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| AppError::Config(format!("failed_to_serialize_config: {}", e)))?;
    fs::write(data_dir.join(CONFIG_FILE), content)
        .map_err(|e| AppError::Config(format!("failed_to_save_config: {}", e)))
}

pub fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(raw) = std::env::var(ENV_REQUEST_TIMEOUT) {
        match raw.trim().parse::<u64>() {
            Ok(secs) => {
                tracing::info!("Using request timeout from environment: {}s", secs);
                config.api.request_timeout_secs = secs;
            }
            Err(_) => tracing::warn!(
                "Ignoring {}={:?}: expected a number of seconds",
                ENV_REQUEST_TIMEOUT,
                raw
            ),
        }
    }
    if let Ok(dir) = std::env::var(ENV_CREDENTIALS_DIR) {
        if !dir.trim().is_empty() {
            tracing::info!("Using credentials folder from environment: {}", dir.trim());
            config.auth.credentials_dir = PathBuf::from(dir.trim());
        }
    }
}

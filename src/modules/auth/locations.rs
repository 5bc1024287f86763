use crate::constants::{
    ENV_ACCESS_TOKEN, ENV_APPLICATION_CREDENTIALS, ENV_CLIENT_ID, ENV_CLIENT_SECRET,
    ENV_REFRESH_TOKEN, ENV_SERVICE_ACCOUNT_JSON,
};
use crate::models::AuthConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const PRODUCT_DIR: &str = "ga4-mcp";
const SHARED_DIR: &str = "google-mcp";
const LEGACY_DIR: &str = "gtm-mcp";
const TOKEN_FILE: &str = "tokens.json";
const SERVICE_ACCOUNT_FILE: &str = "service-account.json";
const ADC_FILE: &str = "application_default_credentials.json";

const CREDENTIAL_VARS: [&str; 6] = [
    ENV_ACCESS_TOKEN,
    ENV_REFRESH_TOKEN,
    ENV_CLIENT_ID,
    ENV_CLIENT_SECRET,
    ENV_SERVICE_ACCOUNT_JSON,
    ENV_APPLICATION_CREDENTIALS,
];

/// Every on-disk location a credential may come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPaths {
    pub product_token_file: PathBuf,
    pub shared_token_file: PathBuf,
    pub legacy_token_file: PathBuf,
    pub product_service_account_file: PathBuf,
    pub gcloud_adc_file: PathBuf,
    pub credentials_dir: PathBuf,
}

impl CredentialPaths {
    /// Layout rooted at `home`, using `~/.config/<tool>/...` for every tool.
    pub fn from_home(home: &Path, credentials_dir: impl Into<PathBuf>) -> Self {
        let config = home.join(".config");
        Self {
            product_token_file: config.join(PRODUCT_DIR).join(TOKEN_FILE),
            shared_token_file: config.join(SHARED_DIR).join(TOKEN_FILE),
            legacy_token_file: config.join(LEGACY_DIR).join(TOKEN_FILE),
            product_service_account_file: config.join(PRODUCT_DIR).join(SERVICE_ACCOUNT_FILE),
            gcloud_adc_file: config.join("gcloud").join(ADC_FILE),
            credentials_dir: credentials_dir.into(),
        }
    }

    pub fn discover(config: &AuthConfig) -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let mut paths = Self::from_home(&home, config.credentials_dir.clone());
        if cfg!(windows) {
            if let Some(appdata) = dirs::config_dir() {
                paths.gcloud_adc_file = appdata.join("gcloud").join(ADC_FILE);
            }
        }
        paths
    }

    /// Files that may back the bare-access-token path, highest priority first.
    pub fn access_token_files(&self) -> [&Path; 3] {
        [
            self.shared_token_file.as_path(),
            self.legacy_token_file.as_path(),
            self.product_token_file.as_path(),
        ]
    }
}

/// Snapshot of the credential-related environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialEnv {
    vars: HashMap<String, String>,
}

impl CredentialEnv {
    pub fn from_process() -> Self {
        let vars = CREDENTIAL_VARS
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|v| (key.to_string(), v)))
            .collect();
        Self { vars }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            vars: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Trimmed value, treating blank values as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Where the resolver takes its environment from on each resolution.
#[derive(Debug, Clone)]
pub enum EnvSource {
    Process,
    Fixed(CredentialEnv),
}

impl EnvSource {
    pub fn snapshot(&self) -> CredentialEnv {
        match self {
            Self::Process => CredentialEnv::from_process(),
            Self::Fixed(env) => env.clone(),
        }
    }
}

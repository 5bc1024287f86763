use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

/// Refreshable OAuth user credential (access token plus refresh material).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredential {
    pub access_token: Option<String>,
    pub refresh_token: String,
    pub client_id: String,
    pub client_secret: String,
    pub expiry: Option<DateTime<Utc>>,
    pub token_uri: Option<String>,
}

/// Pre-issued bearer token. Cannot be refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTokenCredential {
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

/// gcloud-issued `authorized_user` credential (Application Default Credentials).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedUserCredential {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default)]
    pub quota_project_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    FullOAuth(OAuthCredential),
    AccessTokenOnly(AccessTokenCredential),
    ServiceAccount(ServiceAccountKey),
    DelegatedAdc(AuthorizedUserCredential),
}

impl Credential {
    pub fn is_refreshable(&self) -> bool {
        matches!(self, Self::FullOAuth(_) | Self::DelegatedAdc(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialOrigin {
    Environment { variable: String },
    File { path: PathBuf },
}

impl CredentialOrigin {
    pub fn env(variable: &str) -> Self {
        Self::Environment {
            variable: variable.to_string(),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into() }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::File { path } => Some(path),
            Self::Environment { .. } => None,
        }
    }
}

impl fmt::Display for CredentialOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment { variable } => write!(f, "env:{}", variable),
            Self::File { path } => write!(f, "file:{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    OauthEnv,
    OauthFile,
    Adc,
    ServiceAccount,
    AccessToken,
}

impl AuthMode {
    pub fn for_credential(credential: &Credential, origin: &CredentialOrigin) -> Self {
        match (credential, origin) {
            (Credential::FullOAuth(_), CredentialOrigin::Environment { .. }) => Self::OauthEnv,
            (Credential::FullOAuth(_), CredentialOrigin::File { .. }) => Self::OauthFile,
            (Credential::DelegatedAdc(_), _) => Self::Adc,
            (Credential::ServiceAccount(_), _) => Self::ServiceAccount,
            (Credential::AccessTokenOnly(_), _) => Self::AccessToken,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OauthEnv => "oauth_env",
            Self::OauthFile => "oauth_file",
            Self::Adc => "adc",
            Self::ServiceAccount => "service_account",
            Self::AccessToken => "access_token",
        }
    }
}

/// `(path, mtime)` of the token file currently backing the bare-access-token path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFileFingerprint {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Loosely-typed view of the token files written by the various OAuth bootstrap tools.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenFile {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
    #[serde(default)]
    pub expiry: Option<serde_json::Value>,
    #[serde(default)]
    pub expiry_date: Option<serde_json::Value>,
    #[serde(default)]
    pub expires_at: Option<serde_json::Value>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl TokenFile {
    pub fn access_token(&self) -> Option<String> {
        non_empty(&self.access_token).or_else(|| non_empty(&self.token))
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        [&self.expiry, &self.expiry_date, &self.expires_at]
            .into_iter()
            .flatten()
            .find_map(parse_expiry)
    }

    pub fn has_refresh_fields(&self) -> bool {
        non_empty(&self.refresh_token).is_some()
            && non_empty(&self.client_id).is_some()
            && non_empty(&self.client_secret).is_some()
    }

    pub fn to_full_oauth(&self) -> Option<OAuthCredential> {
        Some(OAuthCredential {
            access_token: self.access_token(),
            refresh_token: non_empty(&self.refresh_token)?,
            client_id: non_empty(&self.client_id)?,
            client_secret: non_empty(&self.client_secret)?,
            expiry: self.expiry(),
            token_uri: non_empty(&self.token_uri),
        })
    }
}

/// Accepts RFC3339, naive ISO timestamps (UTC), unix seconds or unix milliseconds.
pub fn parse_expiry(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(raw) => {
            let raw = raw.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
                return Some(Utc.from_utc_datetime(&naive));
            }
            raw.parse::<i64>().ok().and_then(timestamp_to_datetime)
        }
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(timestamp_to_datetime),
        _ => None,
    }
}

fn timestamp_to_datetime(ts: i64) -> Option<DateTime<Utc>> {
    if ts > 100_000_000_000 {
        DateTime::from_timestamp_millis(ts)
    } else {
        DateTime::from_timestamp(ts, 0)
    }
}

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No usable Google credentials found")]
    NoCredentialFound { remediation: Vec<String> },

    #[error("Token refresh failed: {0}. Re-authenticate and try again.")]
    RefreshFailed(String),

    #[error("GA4 API error{}: {message}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    UpstreamApi { status: Option<u16>, message: String },

    #[error("Malformed GTM export input: {0}")]
    MalformedExportInput(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::UpstreamApi {
            status,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoCredentialFound { .. } => "no_credential_found",
            Self::RefreshFailed(_) => "refresh_failed",
            Self::UpstreamApi { .. } => "upstream_api_error",
            Self::MalformedExportInput(_) => "malformed_export_input",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Timeout(_) => "timeout",
            Self::Config(_) => "config_error",
            Self::Network(_) => "network_error",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
        }
    }

    /// Whether the caller may reasonably retry the same call unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::UpstreamApi {
                status: Some(status),
                ..
            } => *status == 429 || *status >= 500,
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    pub fn remediation(&self) -> Option<&[String]> {
        match self {
            Self::NoCredentialFound { remediation } => Some(remediation.as_slice()),
            _ => None,
        }
    }

    /// Structured failure body handed back across the tool boundary.
    pub fn to_failure(&self) -> serde_json::Value {
        let mut error = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
            "retryable": self.is_retryable(),
        });
        if let Some(steps) = self.remediation() {
            error["remediation"] = serde_json::json!(steps);
        }
        serde_json::json!({ "error": error })
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_display_includes_status_when_known() {
        let err = AppError::upstream(Some(403), "permission denied");
        assert_eq!(err.to_string(), "GA4 API error (403): permission denied");
        let err = AppError::upstream(None, "boom");
        assert_eq!(err.to_string(), "GA4 API error: boom");
    }

    #[test]
    fn retryable_covers_quota_and_server_errors_only() {
        assert!(AppError::upstream(Some(429), "quota").is_retryable());
        assert!(AppError::upstream(Some(503), "unavailable").is_retryable());
        assert!(!AppError::upstream(Some(400), "bad request").is_retryable());
        assert!(AppError::Timeout("runReport".to_string()).is_retryable());
        assert!(!AppError::RefreshFailed("invalid_grant".to_string()).is_retryable());
    }

    #[test]
    fn failure_body_carries_remediation_for_missing_credentials() {
        let err = AppError::NoCredentialFound {
            remediation: vec!["Set GA4_ACCESS_TOKEN".to_string()],
        };
        let body = err.to_failure();
        assert_eq!(body["error"]["kind"], "no_credential_found");
        assert_eq!(body["error"]["remediation"][0], "Set GA4_ACCESS_TOKEN");
        assert_eq!(body["error"]["retryable"], false);
    }
}

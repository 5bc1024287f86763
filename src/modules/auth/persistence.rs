use crate::error::{AppError, AppResult};
use crate::modules::auth::oauth::TokenResponse;
use chrono::{DateTime, Utc};
use std::path::Path;

fn read_token_json(path: &Path) -> AppResult<serde_json::Map<String, serde_json::Value>> {
    let content = std::fs::read_to_string(path)?;
    match serde_json::from_str::<serde_json::Value>(&content)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(AppError::Config(format!(
            "token file {:?} is not a JSON object",
            path
        ))),
    }
}

fn write_token_json(
    path: &Path,
    content: &serde_json::Map<String, serde_json::Value>,
) -> AppResult<()> {
    let json_str = serde_json::to_string_pretty(content)?;
    std::fs::write(path, json_str)?;
    Ok(())
}

/// Writes a refreshed access token and its expiry back into `path`.
///
/// Every other field is preserved. The expiry is written in whichever
/// encodings the file already uses (`expiry` RFC3339, `expiry_date` millis,
/// `expires_at` seconds), defaulting to `expiry`.
pub fn save_refreshed_token(
    path: &Path,
    token: &TokenResponse,
    now: DateTime<Utc>,
) -> AppResult<DateTime<Utc>> {
    let mut content = read_token_json(path)?;
    let expiry = now + chrono::Duration::seconds(token.expires_in);

    content.insert(
        "access_token".to_string(),
        serde_json::Value::String(token.access_token.clone()),
    );
    if content.contains_key("token") {
        content.insert(
            "token".to_string(),
            serde_json::Value::String(token.access_token.clone()),
        );
    }
    if let Some(rotated) = &token.refresh_token {
        content.insert(
            "refresh_token".to_string(),
            serde_json::Value::String(rotated.clone()),
        );
    }

    let mut wrote_expiry = false;
    if content.contains_key("expiry_date") {
        content.insert(
            "expiry_date".to_string(),
            serde_json::Value::Number(expiry.timestamp_millis().into()),
        );
        wrote_expiry = true;
    }
    if content.contains_key("expires_at") {
        content.insert(
            "expires_at".to_string(),
            serde_json::Value::Number(expiry.timestamp().into()),
        );
        wrote_expiry = true;
    }
    if content.contains_key("expires_in") {
        content.insert(
            "expires_in".to_string(),
            serde_json::Value::Number(token.expires_in.into()),
        );
    }
    if content.contains_key("expiry") || !wrote_expiry {
        content.insert(
            "expiry".to_string(),
            serde_json::Value::String(expiry.to_rfc3339()),
        );
    }

    write_token_json(path, &content)?;
    Ok(expiry)
}

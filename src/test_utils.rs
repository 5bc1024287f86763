#[cfg(test)]
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(test)]
fn global_env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Serializes tests that read or mutate process environment variables.
#[cfg(test)]
pub(crate) fn lock_env() -> std::sync::MutexGuard<'static, ()> {
    global_env_lock()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
pub(crate) struct ScopedEnvVar {
    key: &'static str,
    original: Option<String>,
}

#[cfg(test)]
impl ScopedEnvVar {
    pub(crate) fn set(key: &'static str, value: &str) -> Self {
        let original = std::env::var(key).ok();
        std::env::set_var(key, value);
        Self { key, original }
    }

    pub(crate) fn unset(key: &'static str) -> Self {
        let original = std::env::var(key).ok();
        std::env::remove_var(key);
        Self { key, original }
    }
}

#[cfg(test)]
impl Drop for ScopedEnvVar {
    fn drop(&mut self) {
        if let Some(value) = self.original.as_deref() {
            std::env::set_var(self.key, value);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Fresh directory standing in for a user's home (or any data dir).
#[cfg(test)]
pub(crate) fn temp_home(label: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!(
        ".ga4-mcp-{}-test-{}",
        label,
        uuid::Uuid::new_v4()
    ));
    std::fs::create_dir_all(&root).expect("create temp dir");
    root
}

#[cfg(test)]
pub(crate) fn write_json(path: &Path, value: serde_json::Value) {
    std::fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
    std::fs::write(path, serde_json::to_string_pretty(&value).expect("serialize"))
        .expect("write fixture");
}

/// Token exchange that counts grants and hands out predictable tokens.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct CountingExchange {
    pub refreshes: std::sync::atomic::AtomicUsize,
    pub jwt_exchanges: std::sync::atomic::AtomicUsize,
    pub fail: bool,
    /// Lifetime of refreshed tokens; one hour when unset.
    pub expires_in: Option<i64>,
}

#[cfg(test)]
#[async_trait::async_trait]
impl crate::modules::auth::TokenExchange for CountingExchange {
    async fn refresh(
        &self,
        _request: &crate::modules::auth::RefreshRequest,
    ) -> crate::error::AppResult<crate::modules::auth::TokenResponse> {
        use std::sync::atomic::Ordering;
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            return Err(crate::error::AppError::RefreshFailed(
                "invalid_grant".to_string(),
            ));
        }
        Ok(crate::modules::auth::TokenResponse {
            access_token: format!("ya29.refreshed-{}", n),
            expires_in: self.expires_in.unwrap_or(3600),
            token_type: "Bearer".to_string(),
            refresh_token: None,
        })
    }

    async fn exchange_service_account(
        &self,
        key: &crate::models::ServiceAccountKey,
    ) -> crate::error::AppResult<crate::modules::auth::TokenResponse> {
        use std::sync::atomic::Ordering;
        self.jwt_exchanges.fetch_add(1, Ordering::SeqCst);
        Ok(crate::modules::auth::TokenResponse {
            access_token: format!("ya29.sa-{}", key.client_email),
            expires_in: 3600,
            token_type: "Bearer".to_string(),
            refresh_token: None,
        })
    }
}

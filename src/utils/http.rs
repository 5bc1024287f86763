use crate::models::ApiConfig;
use reqwest::{Client, Proxy};
use std::sync::OnceLock;
use std::time::Duration;

static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

fn create_base_client(timeout_secs: u64, proxy_url: Option<&str>) -> Client {
    let mut builder = Client::builder()
        .use_rustls_tls()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
        .user_agent(crate::constants::USER_AGENT.as_str());

    if let Some(url) = proxy_url.map(str::trim).filter(|u| !u.is_empty()) {
        match Proxy::all(url) {
            Ok(proxy) => {
                builder = builder.proxy(proxy);
                tracing::info!("HTTP shared client enabled upstream proxy: {}", url);
            }
            Err(e) => {
                tracing::error!("invalid_proxy_url: {}, error: {}", url, e);
            }
        }
    }

    builder.build().unwrap_or_else(|e| {
        tracing::warn!("Falling back to default HTTP client: {}", e);
        Client::new()
    })
}

/// Installs the process-wide client. Later calls keep the first client.
pub fn init_shared_client(config: &ApiConfig) -> Client {
    SHARED_CLIENT
        .get_or_init(|| create_base_client(config.request_timeout_secs, config.proxy_url.as_deref()))
        .clone()
}

/// Short prefix of a secret, safe for log lines.
pub fn token_preview(token: &str) -> String {
    let prefix: String = token.chars().take(12).collect();
    format!("{}...", prefix)
}

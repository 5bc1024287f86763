use std::sync::LazyLock;

pub const SERVER_NAME: &str = "ga4-mcp";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DATA_API_BASE: &str = "https://analyticsdata.googleapis.com/v1beta";
pub const ADMIN_API_BASE: &str = "https://analyticsadmin.googleapis.com/v1beta";
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const ANALYTICS_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";

pub const ENV_ACCESS_TOKEN: &str = "GA4_ACCESS_TOKEN";
pub const ENV_REFRESH_TOKEN: &str = "GA4_REFRESH_TOKEN";
pub const ENV_CLIENT_ID: &str = "GA4_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "GA4_CLIENT_SECRET";
pub const ENV_SERVICE_ACCOUNT_JSON: &str = "GA4_SERVICE_ACCOUNT_JSON";
pub const ENV_APPLICATION_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";

pub const ENV_DATA_DIR: &str = "GA4_MCP_DATA_DIR";
pub const ENV_REQUEST_TIMEOUT: &str = "GA4_MCP_REQUEST_TIMEOUT";
pub const ENV_CREDENTIALS_DIR: &str = "GA4_MCP_CREDENTIALS_DIR";

pub static USER_AGENT: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{}/{} {}/{}",
        SERVER_NAME,
        SERVER_VERSION,
        std::env::consts::OS,
        std::env::consts::ARCH
    )
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_names_server_and_platform() {
        assert!(USER_AGENT.starts_with("ga4-mcp/"));
        assert!(USER_AGENT.contains(std::env::consts::OS));
    }
}

use crate::constants::{ANALYTICS_SCOPE, TOKEN_URL};
use crate::error::{AppError, AppResult};
use crate::models::ServiceAccountKey;
use crate::utils::http::token_preview;
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    pub refresh_token: String,
    pub client_id: String,
    pub client_secret: String,
    pub token_uri: Option<String>,
}

/// Grant exchanges against Google's token endpoint.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn refresh(&self, request: &RefreshRequest) -> AppResult<TokenResponse>;

    async fn exchange_service_account(&self, key: &ServiceAccountKey) -> AppResult<TokenResponse>;
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// RS256-signed JWT assertion for the service-account grant.
pub fn build_service_account_assertion(key: &ServiceAccountKey, now: i64) -> AppResult<String> {
    let aud = key.token_uri.as_deref().unwrap_or(TOKEN_URL);
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: ANALYTICS_SCOPE,
        aud,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
        AppError::RefreshFailed(format!(
            "service account {} has an unusable private_key: {}",
            key.client_email, e
        ))
    })?;
    jsonwebtoken::encode(&header, &claims, &encoding_key).map_err(|e| {
        AppError::RefreshFailed(format!("failed to sign service account assertion: {}", e))
    })
}

pub struct GoogleTokenExchange {
    http: Client,
}

impl GoogleTokenExchange {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    async fn post_token_form(
        &self,
        url: &str,
        params: &[(&str, &str)],
        what: &str,
    ) -> AppResult<TokenResponse> {
        let response = self
            .http
            .post(url)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    AppError::RefreshFailed(format!(
                        "{} request failed: {}. Unable to reach the Google authorization server; check network/proxy settings",
                        what, e
                    ))
                } else {
                    AppError::RefreshFailed(format!("{} request failed: {}", what, e))
                }
            })?;

        if response.status().is_success() {
            let token = response
                .json::<TokenResponse>()
                .await
                .map_err(|e| AppError::RefreshFailed(format!("{} response parsing failed: {}", what, e)))?;
            tracing::info!(
                "{} succeeded: access_token {}, expires in {} seconds",
                what,
                token_preview(&token.access_token),
                token.expires_in
            );
            Ok(token)
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            Err(AppError::RefreshFailed(format!(
                "{} rejected ({}): {}",
                what, status, error_text
            )))
        }
    }
}

#[async_trait]
impl TokenExchange for GoogleTokenExchange {
    async fn refresh(&self, request: &RefreshRequest) -> AppResult<TokenResponse> {
        let url = request.token_uri.as_deref().unwrap_or(TOKEN_URL);
        tracing::info!("Refreshing OAuth token for client {}...", request.client_id);
        let params = [
            ("client_id", request.client_id.as_str()),
            ("client_secret", request.client_secret.as_str()),
            ("refresh_token", request.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];
        self.post_token_form(url, &params, "Token refresh").await
    }

    async fn exchange_service_account(&self, key: &ServiceAccountKey) -> AppResult<TokenResponse> {
        let assertion = build_service_account_assertion(key, chrono::Utc::now().timestamp())?;
        let url = key.token_uri.as_deref().unwrap_or(TOKEN_URL);
        tracing::info!("Authorizing service account {}...", key.client_email);
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];
        self.post_token_form(url, &params, "Service account authorization")
            .await
    }
}

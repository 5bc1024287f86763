use crate::error::{AppError, AppResult};
use crate::models::{AuthMode, Credential, CredentialOrigin};
use crate::modules::auth::locations::{CredentialPaths, EnvSource};
use crate::modules::auth::oauth::{RefreshRequest, TokenExchange};
use crate::modules::auth::persistence::save_refreshed_token;
use crate::modules::auth::sources::{
    first_available, CredentialSource, ResolvedCredential, SourceContext,
};
use crate::utils::http::token_preview;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// A resolved credential that has been turned into a usable bearer token.
#[derive(Debug, Clone)]
pub struct ActiveCredential {
    pub credential: Credential,
    pub origin: CredentialOrigin,
    pub source: CredentialSource,
    pub mode: AuthMode,
    pub access_token: String,
    pub expiry: Option<DateTime<Utc>>,
    /// Service-account email when known.
    pub identity: Option<String>,
}

/// True when the token is missing or expires within `skew`.
pub fn needs_refresh(
    has_token: bool,
    expiry: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    skew: Duration,
) -> bool {
    !has_token || expiry.is_some_and(|e| e < now + skew)
}

pub struct CredentialResolver {
    paths: CredentialPaths,
    env: EnvSource,
    exchange: Arc<dyn TokenExchange>,
    refresh_skew: Duration,
}

impl CredentialResolver {
    pub fn new(
        paths: CredentialPaths,
        env: EnvSource,
        exchange: Arc<dyn TokenExchange>,
        refresh_skew_secs: i64,
    ) -> Self {
        Self {
            paths,
            env,
            exchange,
            refresh_skew: Duration::seconds(refresh_skew_secs),
        }
    }

    pub fn paths(&self) -> &CredentialPaths {
        &self.paths
    }

    pub fn refresh_skew(&self) -> Duration {
        self.refresh_skew
    }

    pub fn remediation(&self) -> Vec<String> {
        CredentialSource::PRIORITY
            .iter()
            .map(|source| source.remediation(&self.paths))
            .collect()
    }

    /// Picks the highest-priority source and authorizes it.
    pub async fn resolve(&self) -> AppResult<ActiveCredential> {
        let env = self.env.snapshot();
        let ctx = SourceContext {
            env: &env,
            paths: &self.paths,
        };
        let Some(resolved) = first_available(&ctx) else {
            tracing::warn!("No Google credentials found in any configured source");
            return Err(AppError::NoCredentialFound {
                remediation: self.remediation(),
            });
        };

        tracing::info!(
            source = ?resolved.source,
            origin = %resolved.origin,
            "Resolved Google credentials"
        );
        self.authorize(resolved).await
    }

    async fn authorize(&self, resolved: ResolvedCredential) -> AppResult<ActiveCredential> {
        let ResolvedCredential {
            credential,
            origin,
            source,
        } = resolved;
        let mode = AuthMode::for_credential(&credential, &origin);
        let now = Utc::now();

        let (access_token, expiry, identity) = match &credential {
            Credential::FullOAuth(c) => {
                if needs_refresh(c.access_token.is_some(), c.expiry, now, self.refresh_skew) {
                    let token = self
                        .exchange
                        .refresh(&RefreshRequest {
                            refresh_token: c.refresh_token.clone(),
                            client_id: c.client_id.clone(),
                            client_secret: c.client_secret.clone(),
                            token_uri: c.token_uri.clone(),
                        })
                        .await
                        .map_err(into_refresh_failed)?;
                    let mut expiry = now + Duration::seconds(token.expires_in);
                    if source == CredentialSource::ProductTokenFile {
                        if let Some(path) = origin.path() {
                            match save_refreshed_token(path, &token, now) {
                                Ok(saved) => {
                                    expiry = saved;
                                    tracing::info!("Persisted refreshed token to {:?}", path);
                                }
                                Err(e) => {
                                    tracing::warn!(
                                        "Failed to persist refreshed token to {:?}: {}",
                                        path,
                                        e
                                    );
                                }
                            }
                        }
                    }
                    (token.access_token, Some(expiry), None)
                } else {
                    let token = c.access_token.clone().unwrap_or_default();
                    (token, c.expiry, None)
                }
            }
            Credential::DelegatedAdc(c) => {
                let token = self
                    .exchange
                    .refresh(&RefreshRequest {
                        refresh_token: c.refresh_token.clone(),
                        client_id: c.client_id.clone(),
                        client_secret: c.client_secret.clone(),
                        token_uri: None,
                    })
                    .await
                    .map_err(into_refresh_failed)?;
                let expiry = now + Duration::seconds(token.expires_in);
                (token.access_token, Some(expiry), None)
            }
            Credential::ServiceAccount(key) => {
                let token = self
                    .exchange
                    .exchange_service_account(key)
                    .await
                    .map_err(into_refresh_failed)?;
                let expiry = now + Duration::seconds(token.expires_in);
                (
                    token.access_token,
                    Some(expiry),
                    Some(key.client_email.clone()),
                )
            }
            Credential::AccessTokenOnly(c) => {
                tracing::warn!(
                    "Using a bare access token from {}; it cannot be refreshed and will eventually expire",
                    origin
                );
                (c.access_token.clone(), None, None)
            }
        };

        tracing::debug!(
            mode = mode.as_str(),
            "Authorized with access token {}",
            token_preview(&access_token)
        );

        Ok(ActiveCredential {
            credential,
            origin,
            source,
            mode,
            access_token,
            expiry,
            identity,
        })
    }
}

fn into_refresh_failed(err: AppError) -> AppError {
    match err {
        AppError::RefreshFailed(_) => err,
        other => AppError::RefreshFailed(other.to_string()),
    }
}

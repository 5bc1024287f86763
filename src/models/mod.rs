pub mod config;
pub mod credential;
pub mod validation;

pub use config::{ApiConfig, AppConfig, AuthConfig, LoggingConfig};
pub use credential::{
    AccessTokenCredential, AuthMode, AuthorizedUserCredential, Credential, CredentialOrigin,
    OAuthCredential, ServiceAccountKey, TokenFile, TokenFileFingerprint,
};
pub use validation::{
    GtmEventConfig, ValidationDateRange, ValidationResult, ValidationSummary, Verdict,
};

pub mod locations;
pub mod oauth;
pub mod persistence;
pub mod resolver;
pub mod sources;

pub use locations::{CredentialEnv, CredentialPaths, EnvSource};
pub use oauth::{GoogleTokenExchange, RefreshRequest, TokenExchange, TokenResponse};
pub use resolver::{ActiveCredential, CredentialResolver};
pub use sources::CredentialSource;

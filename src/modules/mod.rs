pub mod auth;
pub mod cache;
pub mod gtm;
pub mod system;
pub mod validation;

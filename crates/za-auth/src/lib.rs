//! # za-auth
//!
//! Zoho Analytics authentication.
//!
//! ## Security
//!
//! - Sensitive data (tokens, secrets) are redacted in Debug output
//! - Tracing skips credential parameters
//! - Persisted tokens are written with owner-only permissions on Unix
//!
//! ## Supported Authentication Methods
//!
//! - **OAuth 2.0 Refresh Token** - a long-lived refresh token is exchanged
//!   for short-lived access tokens, sent as `Authorization: Zoho-oauthtoken`
//! - **Legacy authtoken** - a static token sent as the `authtoken` query
//!   parameter on v1 endpoints
//!
//! ## Example
//!
//! ```rust,ignore
//! use zoho_analytics_auth::{Credentials, DataCentre, FileTokenStorage, TokenManager};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), zoho_analytics_auth::Error> {
//!     let creds = Credentials::from_env()?;
//!     let tokens = TokenManager::new(creds, DataCentre::Eu.accounts_url())
//!         .with_storage(Arc::new(FileTokenStorage::new()));
//!
//!     let access_token = tokens.get_token().await?;
//!     Ok(())
//! }
//! ```

mod credentials;
mod datacentre;
mod error;
mod oauth;
mod storage;
mod token;

pub use credentials::Credentials;
pub use datacentre::DataCentre;
pub use error::{Error, ErrorKind, Result};
pub use oauth::{OAuthClient, OAuthConfig, TokenResponse};
pub use storage::{
    CallbackTokenStorage, FileTokenStorage, MemoryTokenStorage, StoredToken, TokenStorage,
};
pub use token::{TokenManager, DEFAULT_TOKEN_LIFETIME};

/// Default Zoho accounts (authorization) server.
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.zoho.com";

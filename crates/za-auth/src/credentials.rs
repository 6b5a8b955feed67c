//! Credentials for the two Zoho authorization modes.
//!
//! Debug output redacts every secret.

use crate::error::{Error, ErrorKind, Result};

/// Environment variable holding the OAuth client id.
pub const ENV_CLIENT_ID: &str = "ZOHOANALYTICS_CLIENTID";
/// Environment variable holding the OAuth client secret.
pub const ENV_CLIENT_SECRET: &str = "ZOHOANALYTICS_CLIENTSECRET";
/// Environment variable holding the OAuth refresh token.
pub const ENV_REFRESH_TOKEN: &str = "ZOHOANALYTICS_REFRESHTOKEN";
/// Environment variable holding a legacy authtoken.
pub const ENV_AUTHTOKEN: &str = "ZOHOANALYTICS_AUTHTOKEN";

/// Credentials used to authorize API calls.
///
/// A client holds exactly one variant, so the OAuth and legacy modes can
/// never be half-configured at the same time.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// OAuth 2.0 self-client or server-based client with a refresh token.
    OAuth {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
    /// Legacy authtoken.
    AuthToken(String),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::OAuth { client_id, .. } => f
                .debug_struct("OAuth")
                .field("client_id", client_id)
                .field("client_secret", &"[REDACTED]")
                .field("refresh_token", &"[REDACTED]")
                .finish(),
            Credentials::AuthToken(_) => f.debug_tuple("AuthToken").field(&"[REDACTED]").finish(),
        }
    }
}

impl Credentials {
    /// OAuth credentials.
    pub fn oauth(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Credentials::OAuth {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Legacy authtoken credentials.
    pub fn auth_token(token: impl Into<String>) -> Self {
        Credentials::AuthToken(token.into())
    }

    /// Returns true for OAuth credentials.
    pub fn is_oauth(&self) -> bool {
        matches!(self, Credentials::OAuth { .. })
    }

    /// Load credentials from environment variables.
    ///
    /// When a refresh token is present OAuth is used and the client id and
    /// secret become mandatory; otherwise `ZOHOANALYTICS_AUTHTOKEN` is used.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load credentials from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(refresh_token) = get(ENV_REFRESH_TOKEN) {
            let client_id = get(ENV_CLIENT_ID)
                .ok_or_else(|| Error::new(ErrorKind::EnvVar(ENV_CLIENT_ID.to_string())))?;
            let client_secret = get(ENV_CLIENT_SECRET)
                .ok_or_else(|| Error::new(ErrorKind::EnvVar(ENV_CLIENT_SECRET.to_string())))?;
            return Ok(Self::oauth(client_id, client_secret, refresh_token));
        }

        get(ENV_AUTHTOKEN).map(Self::auth_token).ok_or_else(|| {
            Error::new(ErrorKind::EnvVar(format!(
                "{} or {}",
                ENV_REFRESH_TOKEN, ENV_AUTHTOKEN
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_oauth_from_lookup() {
        let creds = Credentials::from_lookup(lookup(&[
            (ENV_CLIENT_ID, "1000.CLIENT"),
            (ENV_CLIENT_SECRET, "secret"),
            (ENV_REFRESH_TOKEN, "1000.refresh"),
        ]))
        .unwrap();

        assert!(creds.is_oauth());
        assert_eq!(
            creds,
            Credentials::oauth("1000.CLIENT", "secret", "1000.refresh")
        );
    }

    #[test]
    fn test_oauth_wins_over_authtoken() {
        let creds = Credentials::from_lookup(lookup(&[
            (ENV_CLIENT_ID, "id"),
            (ENV_CLIENT_SECRET, "secret"),
            (ENV_REFRESH_TOKEN, "refresh"),
            (ENV_AUTHTOKEN, "legacy"),
        ]))
        .unwrap();
        assert!(creds.is_oauth());
    }

    #[test]
    fn test_refresh_token_without_client_id_fails() {
        let err = Credentials::from_lookup(lookup(&[
            (ENV_REFRESH_TOKEN, "refresh"),
            (ENV_AUTHTOKEN, "legacy"),
        ]))
        .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::EnvVar(ref v) if v == ENV_CLIENT_ID));
    }

    #[test]
    fn test_legacy_from_lookup() {
        let creds = Credentials::from_lookup(lookup(&[(ENV_AUTHTOKEN, "legacy")])).unwrap();
        assert_eq!(creds, Credentials::auth_token("legacy"));
        assert!(!creds.is_oauth());
    }

    #[test]
    fn test_nothing_configured() {
        let err = Credentials::from_lookup(lookup(&[(ENV_REFRESH_TOKEN, "  ")])).unwrap_err();
        assert!(err.is_credentials_error());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::oauth("id", "very-secret", "refresh-value");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("id"));
        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("refresh-value"));

        let debug = format!("{:?}", Credentials::auth_token("legacy-secret"));
        assert!(!debug.contains("legacy-secret"));
    }
}

//! OAuth 2.0 refresh-token exchange against the Zoho accounts server.
//!
//! Zoho answers a rejected refresh token with HTTP 200 and a body such as
//! `{"error":"invalid_code"}`, so the body is checked for an access token
//! rather than trusting the status alone.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{Error, ErrorKind, Result};

/// OAuth 2.0 configuration for a Zoho API client.
///
/// The client secret is redacted in Debug output.
#[derive(Clone)]
pub struct OAuthConfig {
    /// Client id issued by the Zoho API console.
    pub client_id: String,
    client_secret: String,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl OAuthConfig {
    /// Create a new OAuth config.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

/// OAuth client performing the refresh-token grant.
#[derive(Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OAuthClient {
    /// Create a new OAuth client.
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured reqwest client (proxies, timeouts).
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = http_client;
        self
    }

    /// Get the OAuth config.
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Exchange a refresh token for a fresh access token.
    ///
    /// The refresh_token parameter is not logged.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
        accounts_url: &str,
    ) -> Result<TokenResponse> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        let body = serde_urlencoded::to_string(params)?;

        let response = self
            .http_client
            .post(format!(
                "{}/oauth/v2/token",
                accounts_url.trim_end_matches('/')
            ))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        handle_token_response(status.as_u16(), &bytes)
    }
}

/// Interpret the body of a token endpoint response.
fn handle_token_response(status: u16, body: &[u8]) -> Result<TokenResponse> {
    if status >= 500 {
        return Err(Error::new(ErrorKind::Http(format!(
            "token endpoint returned HTTP {}",
            status
        ))));
    }

    let value: serde_json::Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(err) if (200..300).contains(&status) => return Err(err.into()),
        Err(_) => {
            return Err(Error::new(ErrorKind::Http(format!(
                "token endpoint returned HTTP {}",
                status
            ))))
        }
    };

    if value.get("access_token").and_then(|v| v.as_str()).is_some() {
        let token: TokenResponse = serde_json::from_value(value)?;
        debug!(expires_in = ?token.expires_in, "Access token issued");
        return Ok(token);
    }

    let error = value
        .get("error")
        .and_then(|v| v.as_str())
        .unwrap_or("missing_access_token")
        .to_string();
    warn!(status, error = %error, "Token endpoint returned no access token");

    if (200..300).contains(&status) {
        Err(Error::new(ErrorKind::InvalidCredentials(format!(
            "no access_token in token response ({}); check the client id, secret and refresh token",
            error
        ))))
    } else {
        let description = value
            .get("error_description")
            .and_then(|v| v.as_str())
            .unwrap_or("token request rejected")
            .to_string();
        Err(Error::new(ErrorKind::OAuth { error, description }))
    }
}

/// Successful token endpoint response.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token.
    pub access_token: String,
    /// Lifetime in seconds, as reported by the server.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// API domain for the account's data centre.
    #[serde(default)]
    pub api_domain: Option<String>,
    /// Token type (`Bearer`).
    #[serde(default)]
    pub token_type: Option<String>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("api_domain", &self.api_domain)
            .field("token_type", &self.token_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> OAuthClient {
        OAuthClient::new(OAuthConfig::new("1000.CLIENT", "client-secret"))
    }

    #[tokio::test]
    async fn test_refresh_token_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/v2/token"))
            .and(header("Content-Type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("client_id=1000.CLIENT"))
            .and(body_string_contains("client_secret=client-secret"))
            .and(body_string_contains("refresh_token=1000.refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "1000.access",
                "expires_in": 3600,
                "api_domain": "https://www.zohoapis.com",
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let token = client()
            .refresh_token("1000.refresh", &mock_server.uri())
            .await
            .unwrap();

        assert_eq!(token.access_token, "1000.access");
        assert_eq!(token.expires_in, Some(3600));
        assert_eq!(token.token_type.as_deref(), Some("Bearer"));
    }

    #[tokio::test]
    async fn test_invalid_code_is_credentials_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/v2/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "error": "invalid_code" })),
            )
            .mount(&mock_server)
            .await;

        let err = client()
            .refresh_token("stale", &mock_server.uri())
            .await
            .unwrap_err();

        assert!(matches!(err.kind, ErrorKind::InvalidCredentials(ref m) if m.contains("invalid_code")));
        assert!(err.is_credentials_error());
    }

    #[tokio::test]
    async fn test_http_error_with_oauth_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/v2/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_client",
                "error_description": "unknown client"
            })))
            .mount(&mock_server)
            .await;

        let err = client()
            .refresh_token("refresh", &mock_server.uri())
            .await
            .unwrap_err();

        match err.kind {
            ErrorKind::OAuth { error, description } => {
                assert_eq!(error, "invalid_client");
                assert_eq!(description, "unknown client");
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }

    #[test]
    fn test_debug_redacts() {
        let config = OAuthConfig::new("id", "secret-value");
        assert!(!format!("{:?}", config).contains("secret-value"));

        let token = TokenResponse {
            access_token: "1000.secret".to_string(),
            expires_in: None,
            api_domain: None,
            token_type: None,
        };
        assert!(!format!("{:?}", token).contains("1000.secret"));
    }
}

//! Access token lifecycle.
//!
//! Zoho access tokens live for an hour. The manager treats them as stale
//! after [`DEFAULT_TOKEN_LIFETIME`] and refreshes proactively; callers that
//! see an invalid-token error from the API call [`TokenManager::force_refresh`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use zoho_analytics_client::Authorization;

use crate::credentials::Credentials;
use crate::error::{Error, ErrorKind, Result};
use crate::oauth::{OAuthClient, OAuthConfig};
use crate::storage::{StoredToken, TokenStorage};

/// Age after which a cached access token is refreshed.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(50 * 60);

#[derive(Debug, Default)]
struct TokenState {
    token: Option<StoredToken>,
    loaded: bool,
}

/// Owns the credentials and at most one cached access token.
///
/// Refreshes are serialised through an async mutex, so concurrent callers
/// never trigger more than one exchange for the same stale token.
#[derive(Debug)]
pub struct TokenManager {
    credentials: Credentials,
    accounts_url: String,
    oauth: Option<OAuthClient>,
    storage: Option<Arc<dyn TokenStorage>>,
    lifetime: Duration,
    state: Mutex<TokenState>,
    refresh_count: AtomicU64,
}

impl TokenManager {
    /// Create a manager for the given credentials and accounts server.
    pub fn new(credentials: Credentials, accounts_url: impl Into<String>) -> Self {
        let oauth = match &credentials {
            Credentials::OAuth {
                client_id,
                client_secret,
                ..
            } => Some(OAuthClient::new(OAuthConfig::new(
                client_id.clone(),
                client_secret.clone(),
            ))),
            Credentials::AuthToken(_) => None,
        };

        Self {
            credentials,
            accounts_url: accounts_url.into().trim_end_matches('/').to_string(),
            oauth,
            storage: None,
            lifetime: DEFAULT_TOKEN_LIFETIME,
            state: Mutex::new(TokenState::default()),
            refresh_count: AtomicU64::new(0),
        }
    }

    /// Persist tokens through the given storage. A stored token still
    /// within its lifetime is reused instead of contacting the server.
    pub fn with_storage(mut self, storage: Arc<dyn TokenStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Override the token lifetime.
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Use a preconfigured reqwest client for token exchanges.
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.oauth = self.oauth.map(|oauth| oauth.with_http_client(http_client));
        self
    }

    /// The configured credentials.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The accounts server URL.
    pub fn accounts_url(&self) -> &str {
        &self.accounts_url
    }

    /// The configured token storage, if any.
    pub fn storage(&self) -> Option<&Arc<dyn TokenStorage>> {
        self.storage.as_ref()
    }

    /// Returns true in OAuth mode.
    pub fn is_oauth(&self) -> bool {
        self.credentials.is_oauth()
    }

    /// Number of token exchanges performed so far.
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count.load(Ordering::SeqCst)
    }

    /// Get a usable token, refreshing it if it is missing or stale.
    ///
    /// In legacy mode this returns the authtoken without any network call.
    pub async fn get_token(&self) -> Result<String> {
        let refresh_token = match &self.credentials {
            Credentials::AuthToken(token) => return Ok(token.clone()),
            Credentials::OAuth { refresh_token, .. } => refresh_token,
        };

        let mut state = self.state.lock().await;

        if !state.loaded {
            state.loaded = true;
            state.token = self.load_persisted();
        }

        if let Some(ref token) = state.token {
            if token.age_seconds() < self.lifetime.as_secs_f64() {
                return Ok(token.access_token.clone());
            }
            debug!(age_seconds = token.age_seconds(), "Cached access token is stale");
        }

        self.refresh_locked(&mut state, refresh_token).await
    }

    /// Unconditionally exchange the refresh token for a new access token.
    ///
    /// Legacy authtokens cannot be refreshed and yield an
    /// [`ErrorKind::InvalidCredentials`] error.
    pub async fn force_refresh(&self) -> Result<String> {
        let refresh_token = match &self.credentials {
            Credentials::AuthToken(_) => {
                return Err(Error::new(ErrorKind::InvalidCredentials(
                    "legacy authtokens cannot be refreshed".to_string(),
                )))
            }
            Credentials::OAuth { refresh_token, .. } => refresh_token,
        };

        let mut state = self.state.lock().await;
        state.loaded = true;
        self.refresh_locked(&mut state, refresh_token).await
    }

    /// The authorization to attach to the next request.
    pub async fn authorization(&self) -> Result<Authorization> {
        match &self.credentials {
            Credentials::AuthToken(token) => Ok(Authorization::AuthToken(token.clone())),
            Credentials::OAuth { .. } => Ok(Authorization::OAuth(self.get_token().await?)),
        }
    }

    /// Drop the cached token and delete the persisted copy.
    pub async fn clear(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.token = None;
        state.loaded = true;
        if let Some(ref storage) = self.storage {
            storage.delete()?;
        }
        Ok(())
    }

    #[instrument(skip(self, state, refresh_token), fields(accounts_url = %self.accounts_url))]
    async fn refresh_locked(&self, state: &mut TokenState, refresh_token: &str) -> Result<String> {
        let oauth = self.oauth.as_ref().ok_or_else(|| {
            Error::new(ErrorKind::Config("OAuth client not configured".to_string()))
        })?;

        let response = oauth.refresh_token(refresh_token, &self.accounts_url).await?;
        self.refresh_count.fetch_add(1, Ordering::SeqCst);

        let token = StoredToken::issued_now(response.access_token);
        self.persist(&token);
        let access_token = token.access_token.clone();
        state.token = Some(token);

        info!("Access token refreshed");
        Ok(access_token)
    }

    fn load_persisted(&self) -> Option<StoredToken> {
        let storage = self.storage.as_ref()?;
        match storage.load() {
            Ok(token) => {
                if token.is_some() {
                    debug!("Loaded persisted access token");
                }
                token
            }
            Err(err) => {
                warn!(error = %err, "Failed to load persisted access token");
                None
            }
        }
    }

    fn persist(&self, token: &StoredToken) {
        if let Some(ref storage) = self.storage {
            if let Err(err) = storage.save(token) {
                warn!(error = %err, "Failed to persist access token");
            }
        }
    }
}

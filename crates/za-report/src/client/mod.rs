//! Zoho Analytics report client.
//!
//! The client owns the HTTP transport and a [`TokenManager`] and routes
//! every call through the retrying dispatcher. Endpoint wrappers live in
//! the submodules, one `impl` block each.

use std::sync::Arc;
use std::time::Duration;

use zoho_analytics_auth::{Credentials, DataCentre, FileTokenStorage, TokenManager, TokenStorage};
use zoho_analytics_client::{ClientConfig, ZaHttpClient};

use crate::config::DispatchConfig;
use crate::error::{Error, Result};
use crate::request;

mod columns;
mod databases;
mod dispatch;
mod rows;
mod users;
mod v2;

pub use columns::LookupErrorPolicy;
pub use rows::DEFAULT_DATE_FORMAT;
pub use v2::{DEST_ORG_ID_HEADER, ORG_ID_HEADER};

/// Zoho Analytics report client.
///
/// # Example
///
/// ```rust,ignore
/// use zoho_analytics_report::{ReportClient, OutputFormat};
///
/// let client = ReportClient::from_env()?;
/// let uri = client.table_uri("owner@example.com", "Sales", "Orders");
/// let mut out = Vec::new();
/// client.export_data(&uri, OutputFormat::Csv, &mut out, None).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ReportClient {
    http: ZaHttpClient,
    tokens: Arc<TokenManager>,
    analytics_url: String,
    dispatch: DispatchConfig,
}

impl ReportClient {
    /// Create a client for the US data centre.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::builder().credentials(credentials).build()
    }

    /// Create a client from the `ZOHOANALYTICS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::builder()
            .credentials(Credentials::from_env()?)
            .build()
    }

    /// Create a client builder.
    pub fn builder() -> ReportClientBuilder {
        ReportClientBuilder::default()
    }

    /// The analytics server URL.
    pub fn analytics_url(&self) -> &str {
        &self.analytics_url
    }

    /// The token manager.
    pub fn token_manager(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// The dispatcher configuration.
    pub fn dispatch_config(&self) -> &DispatchConfig {
        &self.dispatch
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &ZaHttpClient {
        &self.http
    }

    /// URI of a user's account.
    pub fn user_uri(&self, owner: &str) -> String {
        request::user_uri(&self.analytics_url, owner)
    }

    /// URI of a workspace.
    pub fn db_uri(&self, owner: &str, workspace: &str) -> String {
        request::db_uri(&self.analytics_url, owner, workspace)
    }

    /// URI of a table or report.
    pub fn table_uri(&self, owner: &str, workspace: &str, view: &str) -> String {
        request::table_uri(&self.analytics_url, owner, workspace, view)
    }

    /// URL of a `/restapi/v2` endpoint.
    pub fn v2_url(&self, path: &str) -> String {
        format!(
            "{}/restapi/v2/{}",
            self.analytics_url,
            path.trim_start_matches('/')
        )
    }
}

/// Builder for [`ReportClient`].
#[derive(Debug, Default)]
pub struct ReportClientBuilder {
    credentials: Option<Credentials>,
    data_centre: DataCentre,
    analytics_url: Option<String>,
    accounts_url: Option<String>,
    storage: Option<Arc<dyn TokenStorage>>,
    token_lifetime: Option<Duration>,
    token_manager: Option<Arc<TokenManager>>,
    client_config: ClientConfig,
    dispatch: DispatchConfig,
}

impl ReportClientBuilder {
    /// Set the credentials.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Select the data centre for both hosts.
    pub fn data_centre(mut self, data_centre: DataCentre) -> Self {
        self.data_centre = data_centre;
        self
    }

    /// Override the analytics server URL.
    pub fn analytics_url(mut self, url: impl Into<String>) -> Self {
        self.analytics_url = Some(url.into());
        self
    }

    /// Override the accounts server URL.
    pub fn accounts_url(mut self, url: impl Into<String>) -> Self {
        self.accounts_url = Some(url.into());
        self
    }

    /// Persist access tokens through the given storage.
    ///
    /// OAuth clients default to [`FileTokenStorage`] at `access_token.json`
    /// in the working directory; pass a
    /// [`MemoryTokenStorage`](zoho_analytics_auth::MemoryTokenStorage) to keep tokens
    /// in process only.
    pub fn token_storage(mut self, storage: Arc<dyn TokenStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Override the access token lifetime.
    pub fn token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = Some(lifetime);
        self
    }

    /// Share an existing token manager. Credentials, accounts URL,
    /// storage and lifetime settings are then ignored.
    pub fn token_manager(mut self, tokens: Arc<TokenManager>) -> Self {
        self.token_manager = Some(tokens);
        self
    }

    /// HTTP transport configuration.
    pub fn client_config(mut self, config: ClientConfig) -> Self {
        self.client_config = config;
        self
    }

    /// Dispatcher configuration.
    pub fn dispatch_config(mut self, config: DispatchConfig) -> Self {
        self.dispatch = config;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ReportClient> {
        let http = ZaHttpClient::new(self.client_config)?;

        let tokens = match self.token_manager {
            Some(tokens) => tokens,
            None => {
                let credentials = self
                    .credentials
                    .ok_or_else(|| Error::invalid_input("credentials are required"))?;
                let accounts_url = self
                    .accounts_url
                    .unwrap_or_else(|| self.data_centre.accounts_url());
                let storage = match self.storage {
                    Some(storage) => Some(storage),
                    None if credentials.is_oauth() => {
                        Some(Arc::new(FileTokenStorage::new()) as Arc<dyn TokenStorage>)
                    }
                    None => None,
                };
                let mut tokens = TokenManager::new(credentials, accounts_url);
                if let Some(storage) = storage {
                    tokens = tokens.with_storage(storage);
                }
                if let Some(lifetime) = self.token_lifetime {
                    tokens = tokens.with_lifetime(lifetime);
                }
                Arc::new(tokens)
            }
        };

        let analytics_url = self
            .analytics_url
            .unwrap_or_else(|| self.data_centre.analytics_url())
            .trim_end_matches('/')
            .to_string();

        Ok(ReportClient {
            http,
            tokens,
            analytics_url,
            dispatch: self.dispatch,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::DispatchBackoff;
    use zoho_analytics_auth::MemoryTokenStorage;
    use zoho_analytics_client::RetryConfig;

    /// A legacy-token client against a mock server, without transport retries
    /// and with no dispatcher backoff.
    pub fn legacy_client(server_uri: &str) -> ReportClient {
        ReportClient::builder()
            .credentials(Credentials::auth_token("legacy-token"))
            .analytics_url(server_uri)
            .client_config(ClientConfig::builder().without_retry().build())
            .dispatch_config(DispatchConfig::default().with_backoff(DispatchBackoff::none()))
            .build()
            .unwrap()
    }

    /// An OAuth client whose accounts and analytics hosts are the mock server.
    pub fn oauth_client(server_uri: &str) -> ReportClient {
        ReportClient::builder()
            .credentials(Credentials::oauth("1000.CLIENT", "secret", "1000.refresh"))
            .analytics_url(server_uri)
            .accounts_url(server_uri)
            .token_storage(Arc::new(MemoryTokenStorage::new()))
            .client_config(
                ClientConfig::builder()
                    .with_retry(RetryConfig::no_retry())
                    .build(),
            )
            .dispatch_config(DispatchConfig::default().with_backoff(DispatchBackoff::none()))
            .build()
            .unwrap()
    }
}

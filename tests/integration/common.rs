use std::sync::Arc;
use std::time::Duration;

use wiremock::ResponseTemplate;
use zoho_analytics::client::ClientConfig;
use zoho_analytics::report::{DispatchBackoff, DispatchConfig};
use zoho_analytics::auth::MemoryTokenStorage;
use zoho_analytics::{Credentials, EnhancedClient, ReportClient};

pub const OWNER: &str = "owner@example.com";
pub const OWNER_PATH: &str = "/api/owner%40example.com";

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn dispatch(retries: u32) -> DispatchConfig {
    DispatchConfig::default()
        .with_default_retries(retries)
        .with_backoff(DispatchBackoff::none())
}

/// A report client using a legacy auth token, no transport retries and no
/// dispatcher backoff.
pub fn legacy_client(server_uri: &str, retries: u32) -> ReportClient {
    init_tracing();
    ReportClient::builder()
        .credentials(Credentials::auth_token("legacy-token"))
        .analytics_url(server_uri)
        .client_config(ClientConfig::builder().without_retry().build())
        .dispatch_config(dispatch(retries))
        .build()
        .expect("client should build")
}

/// A report client refreshing OAuth tokens against the same mock server.
pub fn oauth_client(server_uri: &str, retries: u32) -> ReportClient {
    init_tracing();
    ReportClient::builder()
        .credentials(Credentials::oauth("1000.CLIENT", "secret", "1000.refresh"))
        .analytics_url(server_uri)
        .accounts_url(server_uri)
        .token_storage(Arc::new(MemoryTokenStorage::new()))
        .client_config(ClientConfig::builder().without_retry().build())
        .dispatch_config(dispatch(retries))
        .build()
        .expect("client should build")
}

pub fn enhanced_client(server_uri: &str) -> EnhancedClient {
    EnhancedClient::new(legacy_client(server_uri, 3), OWNER, "Sales")
        .with_upload_backoff(Duration::ZERO)
}

/// A v1 JSON error body with the given vendor code.
pub fn v1_error(status: u16, code: i64) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(serde_json::json!({
        "response": {
            "uri": "/api/owner@example.com",
            "action": "GETUSERS",
            "error": {"code": code, "message": format!("error {}", code)}
        }
    }))
}

pub fn users_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "response": {"result": ["a@example.com", "b@example.com"]}
    }))
}

//! Token lifecycle as seen through the report client.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use super::common::{legacy_client, oauth_client, users_ok, v1_error, OWNER, OWNER_PATH};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_token_endpoint(server: &MockServer) -> Arc<AtomicU32> {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    Mock::given(method("POST"))
        .and(path("/oauth/v2/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(move |_: &wiremock::Request| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": format!("1000.token{}", n),
                "expires_in": 3600
            }))
        })
        .mount(server)
        .await;
    calls
}

#[tokio::test]
async fn test_token_is_reused_across_calls() {
    let server = MockServer::start().await;
    let token_calls = mount_token_endpoint(&server).await;
    Mock::given(method("POST"))
        .and(path(OWNER_PATH))
        .and(header("Authorization", "Zoho-oauthtoken 1000.token0"))
        .respond_with(users_ok())
        .expect(3)
        .mount(&server)
        .await;

    let client = oauth_client(&server.uri(), 2);
    for _ in 0..3 {
        client.get_users(&client.user_uri(OWNER)).await.unwrap();
    }
    assert_eq!(token_calls.load(Ordering::SeqCst), 1);
    assert_eq!(client.token_manager().refresh_count(), 1);
}

#[tokio::test]
async fn test_invalid_token_triggers_one_refresh() {
    let server = MockServer::start().await;
    let token_calls = mount_token_endpoint(&server).await;
    Mock::given(method("POST"))
        .and(path(OWNER_PATH))
        .and(header("Authorization", "Zoho-oauthtoken 1000.token0"))
        .respond_with(v1_error(401, 8535))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(OWNER_PATH))
        .and(header("Authorization", "Zoho-oauthtoken 1000.token1"))
        .respond_with(users_ok())
        .expect(1)
        .mount(&server)
        .await;

    let client = oauth_client(&server.uri(), 3);
    let users = client.get_users(&client.user_uri(OWNER)).await.unwrap();
    assert_eq!(users[0], "a@example.com");
    assert_eq!(token_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_legacy_token_never_hits_accounts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/v2/token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(OWNER_PATH))
        .and(query_param("authtoken", "legacy-token"))
        .respond_with(users_ok())
        .expect(1)
        .mount(&server)
        .await;

    let client = legacy_client(&server.uri(), 2);
    client.get_users(&client.user_uri(OWNER)).await.unwrap();
    assert!(!client.token_manager().is_oauth());
}

//! The retrying dispatcher.

use std::io::Write;

use tracing::{debug, error, instrument, warn};
use zoho_analytics_client::security::log;
use zoho_analytics_client::vendor::{self, codes, VendorErrorClass};
use zoho_analytics_client::Response;

use crate::error::{Error, ErrorKind, Result};
use crate::parse::{parse_response, ActionResult};
use crate::request::ApiRequest;

/// What to do after a failed attempt.
enum Outcome {
    /// Retry after the backoff delay.
    Backoff(String),
    /// Retry at once.
    Immediate(String),
    /// Give up with this error.
    Fail(Error),
}

impl super::ReportClient {
    /// Execute one logical call with the retry budget `retries`
    /// (`0` uses the configured default), parsing a successful response
    /// according to the request's action tag.
    ///
    /// Export bodies are written to `sink` when one is given.
    #[instrument(
        skip(self, request, sink),
        fields(action = %request.action(), url = %request.http().url())
    )]
    pub async fn send_request(
        &self,
        request: &ApiRequest,
        sink: Option<&mut (dyn Write + Send)>,
        retries: u32,
    ) -> Result<ActionResult> {
        let budget = self.dispatch.budget(retries);
        let mut sink = sink;
        let mut attempt = 0;
        let mut last = String::from("no attempt made");
        let mut last_transport_error: Option<Error> = None;

        while attempt < budget {
            attempt += 1;

            let outcome = match self.tokens.authorization().await {
                Ok(authorization) => {
                    let http = request.http().clone().authorization(authorization);
                    match self.http.execute(&http).await {
                        Ok(response) if matches!(response.status(), 200 | 204) => {
                            debug!(attempt, status = response.status(), "Request succeeded");
                            return parse_response(request.action(), response.body(), sink.take());
                        }
                        Ok(response) => self.classify(&response, attempt < budget).await,
                        Err(err) => {
                            let text = err.to_string();
                            last_transport_error = Some(err.into());
                            Outcome::Backoff(text)
                        }
                    }
                }
                Err(err) if err.is_transient() => {
                    let text = err.to_string();
                    last_transport_error = Some(err.into());
                    Outcome::Backoff(text)
                }
                Err(err) => Outcome::Fail(err.into()),
            };

            match outcome {
                Outcome::Fail(err) => {
                    error!(attempt, error = %err, "Request failed");
                    return Err(err);
                }
                Outcome::Immediate(reason) => {
                    warn!(attempt, budget, reason = %reason, "Retrying at once");
                    last = reason;
                }
                Outcome::Backoff(reason) => {
                    warn!(attempt, budget, reason = %reason, "Retrying after backoff");
                    last = reason;
                    if attempt < budget {
                        tokio::time::sleep(self.dispatch.backoff.delay(attempt)).await;
                    }
                }
            }
        }

        let err = ErrorKind::RetriesExhausted {
            attempts: attempt,
            last,
            payload: request.payload_summary(),
        };
        error!(attempts = attempt, "Retry budget exhausted");
        Err(match last_transport_error {
            Some(source) => Error::with_source(err, source),
            None => Error::new(err),
        })
    }

    /// Decide how to handle a non-success response. An expired token is
    /// only refreshed when `can_retry` is set.
    async fn classify(&self, response: &Response, can_retry: bool) -> Outcome {
        let status = response.status();
        let body = response.body();
        let code = vendor::extract_error_code(body);
        let message = vendor::extract_error_message(body)
            .unwrap_or_else(|| log::sanitize(&response.text_lossy()));

        match status {
            400 | 401 | 403 => {
                let Some(code) = code else {
                    return Outcome::Backoff(format!("HTTP {} without error code: {}", status, message));
                };
                match VendorErrorClass::classify(code) {
                    VendorErrorClass::InvalidToken if !can_retry => {
                        Outcome::Backoff(format!("HTTP {} code {}: {}", status, code, message))
                    }
                    VendorErrorClass::InvalidToken => {
                        if let Err(err) = self.tokens.force_refresh().await {
                            warn!(error = %err, "Token refresh failed");
                        }
                        Outcome::Immediate(format!("HTTP {} code {}: {}", status, code, message))
                    }
                    VendorErrorClass::Transient | VendorErrorClass::Unknown => {
                        Outcome::Backoff(format!("HTTP {} code {}: {}", status, code, message))
                    }
                    VendorErrorClass::QuotaExceeded => {
                        Outcome::Fail(Error::new(ErrorKind::UnrecoverableRateLimit { code, message }))
                    }
                    VendorErrorClass::BadData => Outcome::Fail(Error::new(ErrorKind::BadData {
                        code: Some(code),
                        message,
                    })),
                    VendorErrorClass::Fatal => Outcome::Fail(Error::new(ErrorKind::Server {
                        code: Some(code),
                        status,
                        message,
                    })),
                }
            }
            414 => Outcome::Fail(Error::new(ErrorKind::BadData {
                code: None,
                message: "request URI too long".to_string(),
            })),
            500 if code == Some(codes::UNEXPECTED_ERROR) => {
                Outcome::Fail(Error::new(ErrorKind::BadData { code, message }))
            }
            _ => Outcome::Backoff(format!("HTTP {}: {}", status, message)),
        }
    }

    /// Execute a call that returns no data.
    pub(crate) async fn send_unit(&self, request: &ApiRequest) -> Result<()> {
        self.send_request(request, None, 0).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{legacy_client, oauth_client};
    use crate::action::Action;
    use crate::error::ErrorKind;
    use crate::request::ApiRequest;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn v1_error(code: i64) -> ResponseTemplate {
        ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "response": {
                "uri": "/api/owner@example.com",
                "action": "GETUSERS",
                "error": {"code": code, "message": format!("error {}", code)}
            }
        }))
    }

    fn users_ok() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": {"result": ["a@example.com"]}
        }))
    }

    fn users_request(server: &MockServer) -> ApiRequest {
        ApiRequest::v1_default(format!("{}/api/owner%40example.com", server.uri()), Action::GetUsers)
    }

    #[tokio::test]
    async fn test_transient_failures_use_whole_budget() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .expect(4)
            .mount(&server)
            .await;

        let client = legacy_client(&server.uri());
        let err = client
            .send_request(&users_request(&server), None, 4)
            .await
            .unwrap_err();

        match &err.kind {
            ErrorKind::RetriesExhausted { attempts, last, .. } => {
                assert_eq!(*attempts, 4);
                assert!(last.contains("502"));
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
        assert!(err.to_string().contains("4 attempts"));
    }

    #[tokio::test]
    async fn test_legacy_authtoken_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/owner%40example.com"))
            .and(query_param("authtoken", "legacy-token"))
            .and(query_param("ZOHO_ACTION", "GETUSERS"))
            .respond_with(users_ok())
            .expect(1)
            .mount(&server)
            .await;

        let client = legacy_client(&server.uri());
        let result = client
            .send_request(&users_request(&server), None, 0)
            .await
            .unwrap();
        assert_eq!(result.into_json().unwrap()[0], "a@example.com");
    }

    #[tokio::test]
    async fn test_token_endpoint_outage_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/v2/token"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/oauth/v2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "1000.fresh"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/owner%40example.com"))
            .and(header("Authorization", "Zoho-oauthtoken 1000.fresh"))
            .respond_with(users_ok())
            .expect(1)
            .mount(&server)
            .await;

        let client = oauth_client(&server.uri());
        client
            .send_request(&users_request(&server), None, 5)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejected_credentials_fail_at_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/v2/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"error": "invalid_code"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/owner%40example.com"))
            .respond_with(users_ok())
            .expect(0)
            .mount(&server)
            .await;

        let client = oauth_client(&server.uri());
        let err = client
            .send_request(&users_request(&server), None, 5)
            .await
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Auth(_)));
    }

    #[tokio::test]
    async fn test_invalid_token_on_last_attempt_skips_refresh() {
        let server = MockServer::start().await;
        let token_calls = Arc::new(AtomicU32::new(0));
        let token_calls_clone = token_calls.clone();
        Mock::given(method("POST"))
            .and(path("/oauth/v2/token"))
            .respond_with(move |_: &wiremock::Request| {
                token_calls_clone.fetch_add(1, Ordering::SeqCst);
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "access_token": "1000.token"
                }))
            })
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/owner%40example.com"))
            .respond_with(v1_error(8535))
            .expect(1)
            .mount(&server)
            .await;

        let client = oauth_client(&server.uri());
        let err = client
            .send_request(&users_request(&server), None, 1)
            .await
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::RetriesExhausted { attempts: 1, .. }));
        assert_eq!(token_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_token_refreshes_once_then_retries() {
        let server = MockServer::start().await;
        let token_calls = Arc::new(AtomicU32::new(0));
        let token_calls_clone = token_calls.clone();

        Mock::given(method("POST"))
            .and(path("/oauth/v2/token"))
            .respond_with(move |_: &wiremock::Request| {
                let n = token_calls_clone.fetch_add(1, Ordering::SeqCst);
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "access_token": format!("1000.token{}", n)
                }))
            })
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/owner%40example.com"))
            .and(header("Authorization", "Zoho-oauthtoken 1000.token0"))
            .respond_with(v1_error(8535))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/owner%40example.com"))
            .and(header("Authorization", "Zoho-oauthtoken 1000.token1"))
            .respond_with(users_ok())
            .expect(1)
            .mount(&server)
            .await;

        let client = oauth_client(&server.uri());
        client
            .send_request(&users_request(&server), None, 3)
            .await
            .unwrap();

        assert_eq!(token_calls.load(Ordering::SeqCst), 2);
        assert_eq!(client.token_manager().refresh_count(), 2);
    }

    #[tokio::test]
    async fn test_quota_codes_fail_immediately() {
        for code in [6001, 6043, 6044] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(v1_error(code))
                .expect(1)
                .mount(&server)
                .await;

            let client = legacy_client(&server.uri());
            let err = client
                .send_request(&users_request(&server), None, 5)
                .await
                .unwrap_err();
            assert!(matches!(err.kind, ErrorKind::UnrecoverableRateLimit { code: c, .. } if c == code));
        }
    }

    #[tokio::test]
    async fn test_bad_data_and_fatal_codes() {
        for (code, bad_data) in [(7232, true), (8534, true), (7103, false), (8046, false)] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(v1_error(code))
                .expect(1)
                .mount(&server)
                .await;

            let client = legacy_client(&server.uri());
            let err = client
                .send_request(&users_request(&server), None, 5)
                .await
                .unwrap_err();
            if bad_data {
                assert!(matches!(err.kind, ErrorKind::BadData { .. }), "{code}");
            } else {
                assert!(matches!(err.kind, ErrorKind::Server { .. }), "{code}");
            }
            assert_eq!(err.vendor_code(), Some(code));
        }
    }

    #[tokio::test]
    async fn test_transient_code_is_retried() {
        let server = MockServer::start().await;
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        Mock::given(method("POST"))
            .respond_with(move |_: &wiremock::Request| {
                if calls_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                    v1_error(6045)
                } else {
                    users_ok()
                }
            })
            .mount(&server)
            .await;

        let client = legacy_client(&server.uri());
        client
            .send_request(&users_request(&server), None, 3)
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_v2_error_code_and_regex_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/restapi/v2/orgs"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "status": "failure",
                "data": {"errorCode": 7389, "errorMessage": "Organization not found"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/owner%40example.com"))
            .respond_with(ResponseTemplate::new(403).set_body_string(r#"oops "code":6043 truncated"#))
            .mount(&server)
            .await;

        let client = legacy_client(&server.uri());
        let request = ApiRequest::v2(
            zoho_analytics_client::RequestMethod::Get,
            client.v2_url("orgs"),
        );
        let err = client.send_request(&request, None, 2).await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Server { code: Some(7389), status: 400, .. }));

        let err = client
            .send_request(&users_request(&server), None, 2)
            .await
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnrecoverableRateLimit { code: 6043, .. }));
    }

    #[tokio::test]
    async fn test_uri_too_long_and_unexpected_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/long"))
            .respond_with(ResponseTemplate::new(414))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/unexpected"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "response": {"error": {"code": 7005, "message": "Unexpected error"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = legacy_client(&server.uri());
        let long = ApiRequest::v1_default(format!("{}/api/long", server.uri()), Action::GetUsers);
        let err = client.send_request(&long, None, 3).await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::BadData { code: None, .. }));

        let unexpected =
            ApiRequest::v1_default(format!("{}/api/unexpected", server.uri()), Action::GetUsers);
        let err = client.send_request(&unexpected, None, 3).await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::BadData { code: Some(7005), .. }));
    }

    #[tokio::test]
    async fn test_transport_errors_exhaust_with_source() {
        // Nothing listens on port 9 of the loopback interface.
        let client = legacy_client("http://127.0.0.1:9");
        let request = ApiRequest::v1_default("http://127.0.0.1:9/api/o", Action::GetUsers);
        let err = client.send_request(&request, None, 2).await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::RetriesExhausted { attempts: 2, .. }));
        assert!(err.source.is_some());
    }
}

//! Dispatcher behaviour: retry budgets and error classification.

use super::common::{legacy_client, users_ok, v1_error, OWNER, OWNER_PATH};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zoho_analytics::report::ErrorKind;
use zoho_analytics::{ImportOptions, OutputFormat};

#[tokio::test]
async fn test_transient_failures_use_whole_budget() {
    for budget in [1, 3] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(OWNER_PATH))
            .respond_with(ResponseTemplate::new(503))
            .expect(budget as u64)
            .mount(&server)
            .await;

        let client = legacy_client(&server.uri(), budget);
        let err = client
            .get_users(&client.user_uri(OWNER))
            .await
            .expect_err("every attempt fails");
        assert!(
            matches!(err.kind, ErrorKind::RetriesExhausted { attempts, .. } if attempts == budget),
            "unexpected error: {err}"
        );
    }
}

#[tokio::test]
async fn test_transient_vendor_code_then_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(v1_error(400, 10001))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(users_ok())
        .mount(&server)
        .await;

    let client = legacy_client(&server.uri(), 3);
    let users = client.get_users(&client.user_uri(OWNER)).await.unwrap();
    assert_eq!(users[1], "b@example.com");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_quota_codes_are_not_retried() {
    for code in [6001, 6043, 6044] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(v1_error(400, code))
            .expect(1)
            .mount(&server)
            .await;

        let client = legacy_client(&server.uri(), 5);
        let err = client.get_users(&client.user_uri(OWNER)).await.unwrap_err();
        assert!(err.is_rate_limited());
        assert!(!err.is_retryable());
        assert_eq!(err.vendor_code(), Some(code));
    }
}

#[tokio::test]
async fn test_fatal_code_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(v1_error(400, 7103))
        .expect(1)
        .mount(&server)
        .await;

    let client = legacy_client(&server.uri(), 5);
    let err = client.get_users(&client.user_uri(OWNER)).await.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Server { code: Some(7103), status: 400, .. }));
}

#[tokio::test]
async fn test_import_then_sql_export() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(query_param("ZOHO_ACTION", "IMPORT"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<response><result><importSummary>\
             <totalColumnCount>2</totalColumnCount><selectedColumnCount>2</selectedColumnCount>\
             <totalRowCount>2</totalRowCount><successRowCount>2</successRowCount>\
             <warnings>0</warnings><importOperation>updated</importOperation>\
             </importSummary></result></response>",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(query_param("ZOHO_ACTION", "EXPORT"))
        .and(query_param("ZOHO_OUTPUT_FORMAT", "CSV"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Id,Region\n1,East\n2,West\n"))
        .expect(1)
        .mount(&server)
        .await;

    let client = legacy_client(&server.uri(), 2);
    let uri = client.table_uri(OWNER, "Sales", "Orders");
    let result = client
        .import_data(&uri, "Id,Region\n1,East\n2,West\n", &ImportOptions::default())
        .await
        .unwrap();
    assert_eq!(result.success_row_count, 2);
    assert_eq!(result.operation, "updated");

    let mut sink = Vec::new();
    let written = client
        .export_data_using_sql(&uri, OutputFormat::Csv, "select * from \"Orders\"", &mut sink)
        .await
        .unwrap();
    assert_eq!(written, sink.len());
    assert!(String::from_utf8(sink).unwrap().ends_with("2,West\n"));
}

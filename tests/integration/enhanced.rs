//! Enhanced client operations end to end.

use std::sync::Arc;
use std::time::Duration;

use super::common::enhanced_client;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zoho_analytics::enhanced::{ErrorKind, MemoryCache, TableDesign, MAX_CRITERIA_LENGTH};

fn json_ok(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({"response": {"result": result}}))
}

#[tokio::test]
async fn test_wide_table_is_created_in_chunks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/owner%40example.com/Sales"))
        .and(query_param("ZOHO_ACTION", "CREATETABLE"))
        .respond_with(json_ok(serde_json::json!({"message": "Table created"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/owner%40example.com/Sales/Wide"))
        .and(query_param("ZOHO_ACTION", "ADDCOLUMN"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<response><result><message>Column created</message></result></response>",
        ))
        .expect(5)
        .mount(&server)
        .await;

    let mut design = TableDesign::new("Wide");
    for i in 0..8 {
        design = design.column(format!("c{}", i), "PLAIN");
    }
    let client = enhanced_client(&server.uri()).with_column_threshold(3);
    client.create_table(&design).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let create = requests
        .iter()
        .find(|r| r.url.query().is_some_and(|q| q.contains("CREATETABLE")))
        .unwrap();
    let (_, table_design) = create
        .url
        .query_pairs()
        .find(|(k, _)| *k == "ZOHO_TABLE_DESIGN")
        .unwrap();
    let table_design: serde_json::Value = serde_json::from_str(&table_design).unwrap();
    assert_eq!(table_design["COLUMNS"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_long_criteria_fails_before_any_request() {
    let server = MockServer::start().await;
    let client = enhanced_client(&server.uri());
    let criteria = format!("\"Region\" in ('{}')", "x".repeat(MAX_CRITERIA_LENGTH));

    let err = client.delete_rows("Orders", &criteria).await.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidInput(_)));
    let err = client.pre_delete_rows("Orders", &criteria).await.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidInput(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_counted_delete_matches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(query_param("ZOHO_ACTION", "EXPORT"))
        .respond_with(ResponseTemplate::new(200).set_body_string("count(*)\n3\n"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(query_param("ZOHO_ACTION", "DELETE"))
        .and(query_param("ZOHO_CRITERIA", "\"Region\"='East'"))
        .respond_with(json_ok(serde_json::json!({"deletedrows": "3", "message": "Deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = enhanced_client(&server.uri());
    let deleted = client
        .delete_rows_verified("Orders", "\"Region\"='East'")
        .await
        .unwrap();
    assert_eq!(deleted, 3);
}

#[tokio::test]
async fn test_cached_export_hits_server_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(query_param("ZOHO_ACTION", "EXPORT"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Id,Region\n1,East\n"))
        .expect(1)
        .mount(&server)
        .await;

    let cache = Arc::new(MemoryCache::new());
    let client = enhanced_client(&server.uri()).with_cache(cache.clone(), Duration::from_secs(60));
    let sql = "select * from \"Orders\"";
    for _ in 0..3 {
        let rows = client.data_export_using_sql(sql, "Orders").await.unwrap();
        assert_eq!(rows.get(0).unwrap().get("Region"), Some("East"));
    }
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_workspace_switch_changes_uris() {
    let server = MockServer::start().await;
    let client = enhanced_client(&server.uri());
    let archive = client.for_workspace("Archive 2024");
    assert!(archive.db_uri().ends_with("/api/owner%40example.com/Archive%202024"));
    assert_eq!(client.workspace(), "Sales");
}

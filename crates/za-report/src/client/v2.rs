//! `/restapi/v2` endpoints.
//!
//! Parameters travel as a JSON document in the `CONFIG` query parameter,
//! for every verb. Organisation-scoped calls carry `ZANALYTICS-ORGID`.

use bytes::Bytes;
use serde_json::{json, Value};
use tracing::instrument;
use zoho_analytics_client::{MultipartFile, RequestMethod};

use crate::config::IMPORT_TIMEOUT;
use crate::error::Result;
use crate::parse::{json_count, json_string};
use crate::request::ApiRequest;
use crate::results::ImportMode;

/// Header naming the organisation a call acts on.
pub const ORG_ID_HEADER: &str = "ZANALYTICS-ORGID";
/// Header naming the destination organisation of a copy.
pub const DEST_ORG_ID_HEADER: &str = "ZANALYTICS-DEST-ORGID";

impl super::ReportClient {
    fn v2_request(
        &self,
        method: RequestMethod,
        path: &str,
        org_id: Option<&str>,
        config: Option<&Value>,
    ) -> ApiRequest {
        let mut request = ApiRequest::v2(method, self.v2_url(path));
        if let Some(config) = config {
            request = request.query("CONFIG", config.to_string());
        }
        if let Some(org_id) = org_id {
            request = request.map_http(|http| http.header(ORG_ID_HEADER, org_id));
        }
        request
    }

    async fn v2_data(&self, request: ApiRequest) -> Result<Value> {
        self.send_request(&request, None, 0).await?.into_json()
    }

    /// Organisations the user can access.
    #[instrument(skip(self))]
    pub async fn get_orgs(&self) -> Result<Value> {
        let data = self
            .v2_data(self.v2_request(RequestMethod::Get, "orgs", None, None))
            .await?;
        Ok(data["orgs"].clone())
    }

    /// Owned and shared workspaces.
    #[instrument(skip(self))]
    pub async fn get_workspaces(&self) -> Result<Value> {
        self.v2_data(self.v2_request(RequestMethod::Get, "workspaces", None, None))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_workspace_details(&self, workspace_id: &str) -> Result<Value> {
        let path = format!("workspaces/{}", workspace_id);
        let data = self
            .v2_data(self.v2_request(RequestMethod::Get, &path, None, None))
            .await?;
        Ok(data["workspaces"].clone())
    }

    /// Create an empty workspace. Returns its id.
    #[instrument(skip(self))]
    pub async fn create_workspace(&self, org_id: &str, name: &str) -> Result<String> {
        let config = json!({ "workspaceName": name });
        let data = self
            .v2_data(self.v2_request(RequestMethod::Post, "workspaces/", Some(org_id), Some(&config)))
            .await?;
        json_string(&data, "workspaceId")
    }

    #[instrument(skip(self))]
    pub async fn delete_workspace(&self, org_id: &str, workspace_id: &str) -> Result<()> {
        let path = format!("workspaces/{}", workspace_id);
        self.send_unit(&self.v2_request(RequestMethod::Delete, &path, Some(org_id), None))
            .await
    }

    /// The secret key of a workspace.
    #[instrument(skip(self))]
    pub async fn get_workspace_secret_key(&self, org_id: &str, workspace_id: &str) -> Result<String> {
        let path = format!("workspaces/{}/secretkey", workspace_id);
        let data = self
            .v2_data(self.v2_request(RequestMethod::Get, &path, Some(org_id), None))
            .await?;
        json_string(&data, "workspaceKey")
    }

    /// Copy a workspace, into `dest_org_id` when given. Returns the id of
    /// the copy.
    #[instrument(skip(self))]
    pub async fn copy_workspace(
        &self,
        org_id: &str,
        workspace_id: &str,
        new_name: &str,
        dest_org_id: Option<&str>,
    ) -> Result<String> {
        let path = format!("workspaces/{}", workspace_id);
        let config = json!({ "newWorkspaceName": new_name });
        let mut request = self.v2_request(RequestMethod::Post, &path, Some(org_id), Some(&config));
        if let Some(dest) = dest_org_id.filter(|d| !d.is_empty()) {
            request = request.map_http(|http| http.header(DEST_ORG_ID_HEADER, dest));
        }
        json_string(&self.v2_data(request).await?, "workspaceId")
    }

    /// Views of a workspace.
    #[instrument(skip(self))]
    pub async fn get_views(&self, org_id: &str, workspace_id: &str) -> Result<Value> {
        let path = format!("workspaces/{}/views", workspace_id);
        let data = self
            .v2_data(self.v2_request(RequestMethod::Get, &path, Some(org_id), None))
            .await?;
        Ok(data["views"].clone())
    }

    #[instrument(skip(self))]
    pub async fn get_view_details(&self, view_id: &str) -> Result<Value> {
        let path = format!("views/{}", view_id);
        let data = self
            .v2_data(self.v2_request(RequestMethod::Get, &path, None, None))
            .await?;
        Ok(data["views"].clone())
    }

    /// Details of a workspace, or of one of its views, looked up by name.
    #[instrument(skip(self))]
    pub async fn get_meta_details(
        &self,
        org_id: &str,
        workspace_name: &str,
        view_name: Option<&str>,
    ) -> Result<Value> {
        let mut config = json!({ "workspaceName": workspace_name });
        if let Some(view_name) = view_name {
            config["viewName"] = json!(view_name);
        }
        self.v2_data(self.v2_request(RequestMethod::Get, "metadetails", Some(org_id), Some(&config)))
            .await
    }

    /// Add a row. `columns` maps column names to values.
    #[instrument(skip(self, columns))]
    pub async fn add_row_v2(
        &self,
        org_id: &str,
        workspace_id: &str,
        view_id: &str,
        columns: &Value,
    ) -> Result<Value> {
        let path = format!("workspaces/{}/views/{}/rows", workspace_id, view_id);
        let config = json!({ "columns": columns });
        self.v2_data(self.v2_request(RequestMethod::Post, &path, Some(org_id), Some(&config)))
            .await
    }

    /// Update rows matching `criteria`, or all rows when `None`.
    #[instrument(skip(self, columns))]
    pub async fn update_rows_v2(
        &self,
        org_id: &str,
        workspace_id: &str,
        view_id: &str,
        columns: &Value,
        criteria: Option<&str>,
    ) -> Result<Value> {
        let path = format!("workspaces/{}/views/{}/rows", workspace_id, view_id);
        let mut config = json!({ "columns": columns });
        if let Some(criteria) = criteria {
            config["criteria"] = json!(criteria);
        }
        self.v2_data(self.v2_request(RequestMethod::Put, &path, Some(org_id), Some(&config)))
            .await
    }

    /// Delete rows matching `criteria`, or all rows when `None`. Returns
    /// the number of deleted rows.
    #[instrument(skip(self))]
    pub async fn delete_rows_v2(
        &self,
        org_id: &str,
        workspace_id: &str,
        view_id: &str,
        criteria: Option<&str>,
    ) -> Result<u64> {
        let path = format!("workspaces/{}/views/{}/rows", workspace_id, view_id);
        let config = match criteria {
            Some(criteria) => json!({ "criteria": criteria }),
            None => json!({}),
        };
        let data = self
            .v2_data(self.v2_request(RequestMethod::Delete, &path, Some(org_id), Some(&config)))
            .await?;
        json_count(&data, "deletedRows")
    }

    /// Import a CSV file into a view as a multipart `FILE` upload.
    #[instrument(skip(self, content), fields(bytes = content.len()))]
    pub async fn import_file_v2(
        &self,
        org_id: &str,
        workspace_id: &str,
        view_id: &str,
        mode: ImportMode,
        file_name: &str,
        content: Bytes,
    ) -> Result<Value> {
        let path = format!("workspaces/{}/views/{}/data", workspace_id, view_id);
        let config = json!({
            "fileType": "csv",
            "autoIdentify": "true",
            "importType": mode.as_str().to_lowercase(),
        });
        let file = MultipartFile::new("FILE", file_name, content).with_mime("text/csv");
        let request = self
            .v2_request(RequestMethod::Post, &path, Some(org_id), Some(&config))
            .map_http(|http| http.multipart(Vec::new(), file).timeout(IMPORT_TIMEOUT));
        self.v2_data(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::legacy_client;
    use crate::results::ImportMode;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn data(value: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "summary": "ok",
            "data": value
        }))
    }

    #[tokio::test]
    async fn test_get_orgs_and_workspaces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/restapi/v2/orgs"))
            .respond_with(data(serde_json::json!({"orgs": [{"orgId": "1"}]})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/restapi/v2/workspaces"))
            .respond_with(data(serde_json::json!({"ownedWorkspaces": [], "sharedWorkspaces": []})))
            .mount(&server)
            .await;

        let client = legacy_client(&server.uri());
        let orgs = client.get_orgs().await.unwrap();
        assert_eq!(orgs[0]["orgId"], "1");
        let workspaces = client.get_workspaces().await.unwrap();
        assert!(workspaces["ownedWorkspaces"].is_array());
    }

    #[tokio::test]
    async fn test_create_workspace_sends_config_and_org_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/restapi/v2/workspaces/"))
            .and(header("ZANALYTICS-ORGID", "555"))
            .and(query_param("CONFIG", r#"{"workspaceName":"Sales"}"#))
            .respond_with(data(serde_json::json!({"workspaceId": 1767024000000003001u64})))
            .expect(1)
            .mount(&server)
            .await;

        let client = legacy_client(&server.uri());
        let id = client.create_workspace("555", "Sales").await.unwrap();
        assert_eq!(id, "1767024000000003001");
    }

    #[tokio::test]
    async fn test_copy_workspace_dest_org() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/restapi/v2/workspaces/42"))
            .and(header("ZANALYTICS-ORGID", "555"))
            .and(header("ZANALYTICS-DEST-ORGID", "777"))
            .respond_with(data(serde_json::json!({"workspaceId": "43"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = legacy_client(&server.uri());
        let id = client
            .copy_workspace("555", "42", "Sales Copy", Some("777"))
            .await
            .unwrap();
        assert_eq!(id, "43");
    }

    #[tokio::test]
    async fn test_delete_workspace_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/restapi/v2/workspaces/42"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = legacy_client(&server.uri());
        client.delete_workspace("555", "42").await.unwrap();
    }

    #[tokio::test]
    async fn test_row_operations() {
        let server = MockServer::start().await;
        let rows = "/restapi/v2/workspaces/42/views/9/rows";
        Mock::given(method("POST"))
            .and(path(rows))
            .and(query_param("CONFIG", r#"{"columns":{"Region":"East"}}"#))
            .respond_with(data(serde_json::json!({"Region": "East"})))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(rows))
            .respond_with(data(serde_json::json!({"updatedColumns": ["Region"], "updatedRows": 2})))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(rows))
            .and(query_param("CONFIG", r#"{"criteria":"\"Region\"='East'"}"#))
            .respond_with(data(serde_json::json!({"deletedRows": 5})))
            .mount(&server)
            .await;

        let client = legacy_client(&server.uri());
        let columns = serde_json::json!({"Region": "East"});
        let added = client.add_row_v2("555", "42", "9", &columns).await.unwrap();
        assert_eq!(added["Region"], "East");

        let updated = client
            .update_rows_v2("555", "42", "9", &columns, Some("\"Id\"=1"))
            .await
            .unwrap();
        assert_eq!(updated["updatedRows"], 2);

        let deleted = client
            .delete_rows_v2("555", "42", "9", Some("\"Region\"='East'"))
            .await
            .unwrap();
        assert_eq!(deleted, 5);
    }

    #[tokio::test]
    async fn test_meta_details_and_views() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/restapi/v2/metadetails"))
            .respond_with(data(serde_json::json!({"views": {"viewId": "9"}})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/restapi/v2/workspaces/42/views"))
            .respond_with(data(serde_json::json!({"views": [{"viewId": "9"}]})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/restapi/v2/workspaces/42/secretkey"))
            .respond_with(data(serde_json::json!({"workspaceKey": "secret"})))
            .mount(&server)
            .await;

        let client = legacy_client(&server.uri());
        let meta = client
            .get_meta_details("555", "Sales", Some("Orders"))
            .await
            .unwrap();
        assert_eq!(meta["views"]["viewId"], "9");

        let requests = server.received_requests().await.unwrap();
        let config: serde_json::Value = requests[0]
            .url
            .query_pairs()
            .find(|(k, _)| k == "CONFIG")
            .map(|(_, v)| serde_json::from_str(&v).unwrap())
            .unwrap();
        assert_eq!(config, serde_json::json!({"workspaceName": "Sales", "viewName": "Orders"}));
        let views = client.get_views("555", "42").await.unwrap();
        assert_eq!(views[0]["viewId"], "9");
        assert_eq!(
            client.get_workspace_secret_key("555", "42").await.unwrap(),
            "secret"
        );
    }

    #[tokio::test]
    async fn test_import_file_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/restapi/v2/workspaces/42/views/9/data"))
            .and(body_string_contains("name=\"FILE\""))
            .and(body_string_contains("Id,Region"))
            .respond_with(data(serde_json::json!({"importSummary": {"successRowCount": 1}})))
            .expect(1)
            .mount(&server)
            .await;

        let client = legacy_client(&server.uri());
        let result = client
            .import_file_v2(
                "555",
                "42",
                "9",
                ImportMode::Append,
                "orders.csv",
                bytes::Bytes::from_static(b"Id,Region\n1,East\n"),
            )
            .await
            .unwrap();
        assert_eq!(result["importSummary"]["successRowCount"], 1);

        let requests = server.received_requests().await.unwrap();
        let config: String = requests[0]
            .url
            .query_pairs()
            .find(|(k, _)| k == "CONFIG")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert!(config.contains("\"importType\":\"append\""));
    }
}

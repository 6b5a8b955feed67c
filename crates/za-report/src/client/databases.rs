use serde_json::Value;
use tracing::instrument;

use crate::action::Action;
use crate::error::Result;
use crate::request::ApiRequest;
use crate::results::ObjectInfo;

impl super::ReportClient {
    /// Copy a workspace, possibly from another account. Returns the id of
    /// the new workspace.
    #[instrument(skip(self, copy_db_key))]
    pub async fn copy_database(
        &self,
        db_uri: &str,
        new_name: &str,
        copy_db_key: Option<&str>,
    ) -> Result<String> {
        let mut fields = vec![("ZOHO_DATABASE_NAME", new_name)];
        if let Some(key) = copy_db_key {
            fields.push(("ZOHO_COPY_DB_KEY", key));
        }
        let request =
            ApiRequest::v1_default(db_uri, Action::CopyDatabase).map_http(|http| http.form(fields));
        self.send_request(&request, None, 0).await?.into_text()
    }

    /// Delete a workspace by name.
    #[instrument(skip(self))]
    pub async fn delete_database(&self, user_uri: &str, name: &str) -> Result<()> {
        let request = ApiRequest::v1_default(user_uri, Action::DeleteDatabase)
            .query("ZOHO_DATABASE_NAME", name);
        self.send_unit(&request).await
    }

    /// Create a table from a JSON table design.
    #[instrument(skip(self, design))]
    pub async fn create_table(&self, db_uri: &str, design: &Value) -> Result<Value> {
        let request = ApiRequest::v1_default(db_uri, Action::CreateTable)
            .query("ZOHO_TABLE_DESIGN", serde_json::to_string(design)?);
        self.send_request(&request, None, 0).await?.into_json()
    }

    /// Fetch workspace metadata such as `ZOHO_CATALOG_LIST` or
    /// `ZOHO_CATALOG_INFO`.
    #[instrument(skip(self))]
    pub async fn get_database_metadata(&self, uri: &str, metadata: &str) -> Result<Value> {
        let request =
            ApiRequest::v1_default(uri, Action::DatabaseMetadata).query("ZOHO_METADATA", metadata);
        self.send_request(&request, None, 0).await?.into_json()
    }

    /// Name of the workspace with the given id.
    #[instrument(skip(self))]
    pub async fn get_database_name(&self, user_uri: &str, dbid: &str) -> Result<String> {
        let request = ApiRequest::v1_default(user_uri, Action::GetDatabaseName).query("DBID", dbid);
        self.send_request(&request, None, 0).await?.into_text()
    }

    /// Whether a workspace with the given name exists.
    #[instrument(skip(self))]
    pub async fn is_db_exist(&self, user_uri: &str, name: &str) -> Result<bool> {
        let request = ApiRequest::v1_default(user_uri, Action::IsDbExist).query("ZOHO_DB_NAME", name);
        self.send_request(&request, None, 0).await?.into_bool()
    }

    /// The key other accounts need to copy this workspace.
    #[instrument(skip(self))]
    pub async fn get_copy_db_key(&self, db_uri: &str, regenerate: bool) -> Result<String> {
        let mut request = ApiRequest::v1_default(db_uri, Action::GetCopyDbKey);
        if regenerate {
            request = request.map_http(|http| http.form([("ZOHO_REGENERATE_KEY", "true")]));
        }
        self.send_request(&request, None, 0).await?.into_text()
    }

    /// Name of the view with the given id.
    #[instrument(skip(self))]
    pub async fn get_view_name(&self, user_uri: &str, objid: &str) -> Result<String> {
        let request = ApiRequest::v1_default(user_uri, Action::GetViewName).query("OBJID", objid);
        self.send_request(&request, None, 0).await?.into_text()
    }

    /// View and workspace ids of a table or report.
    #[instrument(skip(self))]
    pub async fn get_info(&self, table_uri: &str) -> Result<ObjectInfo> {
        let request = ApiRequest::v1_default(table_uri, Action::GetInfo);
        self.send_request(&request, None, 0).await?.into_info()
    }

    /// URL of a view.
    #[instrument(skip(self))]
    pub async fn get_view_url(&self, table_uri: &str) -> Result<String> {
        let request = ApiRequest::v1_default(table_uri, Action::GetViewUrl);
        self.send_request(&request, None, 0).await?.into_text()
    }

    /// Embeddable URL of a view, optionally filtered by `criteria`.
    #[instrument(skip(self))]
    pub async fn get_embed_url(&self, table_uri: &str, criteria: Option<&str>) -> Result<String> {
        let mut request = ApiRequest::v1_default(table_uri, Action::GetEmbedUrl);
        if let Some(criteria) = criteria {
            request = request.map_http(|http| http.form([("ZOHO_CRITERIA", criteria)]));
        }
        self.send_request(&request, None, 0).await?.into_text()
    }

    /// Rename a view and set its description.
    #[instrument(skip(self))]
    pub async fn rename_view(
        &self,
        db_uri: &str,
        view_name: &str,
        new_name: &str,
        description: &str,
    ) -> Result<()> {
        let request = ApiRequest::v1_default(db_uri, Action::RenameView).map_http(|http| {
            http.query_pairs([
                ("ZOHO_VIEWNAME", view_name),
                ("ZOHO_NEW_VIEWNAME", new_name),
                ("ZOHO_NEW_VIEWDESC", description),
            ])
        });
        self.send_unit(&request).await
    }

    /// Copy reports into another workspace. `views` is comma separated;
    /// `copy_db_key` is the target workspace's copy key.
    #[instrument(skip(self, copy_db_key))]
    pub async fn copy_reports(
        &self,
        db_uri: &str,
        views: &str,
        target_db: &str,
        copy_db_key: &str,
    ) -> Result<()> {
        let request = ApiRequest::v1_default(db_uri, Action::CopyReports).map_http(|http| {
            http.query_pairs([
                ("ZOHO_VIEWTOCOPY", views),
                ("ZOHO_DATABASE_NAME", target_db),
                ("ZOHO_COPY_DB_KEY", copy_db_key),
            ])
        });
        self.send_unit(&request).await
    }

    /// Copy formula columns of a table into another workspace.
    #[instrument(skip(self, copy_db_key))]
    pub async fn copy_formula(
        &self,
        table_uri: &str,
        formulas: &str,
        target_db: &str,
        copy_db_key: &str,
    ) -> Result<()> {
        let request = ApiRequest::v1_default(table_uri, Action::CopyFormula).map_http(|http| {
            http.query_pairs([
                ("ZOHO_FORMULATOCOPY", formulas),
                ("ZOHO_DATABASE_NAME", target_db),
                ("ZOHO_COPY_DB_KEY", copy_db_key),
            ])
        });
        self.send_unit(&request).await
    }

    /// Generate reports from a table or a column. `source` is `TABLE` or
    /// `COLUMN`.
    #[instrument(skip(self))]
    pub async fn auto_gen_reports(&self, table_uri: &str, source: &str) -> Result<Value> {
        let request =
            ApiRequest::v1_default(table_uri, Action::AutoGenReports).query("ZOHO_SOURCE", source);
        self.send_request(&request, None, 0).await?.into_json()
    }

    /// Create views for a table modelled on the views of `ref_view`.
    #[instrument(skip(self))]
    pub async fn create_similar_views(
        &self,
        table_uri: &str,
        ref_view: &str,
        folder: &str,
        copy_custom_formula: bool,
        copy_agg_formula: bool,
    ) -> Result<Value> {
        let request = ApiRequest::v1_default(table_uri, Action::CreateSimilarViews)
            .query("ZOHO_REFVIEW", ref_view)
            .query("ZOHO_FOLDERNAME", folder)
            .query("ISCOPYCUSTOMFORMULA", copy_custom_formula.to_string())
            .query("ISCOPYAGGFORMULA", copy_agg_formula.to_string());
        self.send_request(&request, None, 0).await?.into_json()
    }

    /// Expose a workspace under a white-label domain.
    #[instrument(skip(self))]
    pub async fn enable_domain_db(&self, user_uri: &str, db_name: &str, domain: &str) -> Result<Value> {
        self.toggle_domain_db(user_uri, Action::EnableDomainDb, db_name, domain)
            .await
    }

    #[instrument(skip(self))]
    pub async fn disable_domain_db(
        &self,
        user_uri: &str,
        db_name: &str,
        domain: &str,
    ) -> Result<Value> {
        self.toggle_domain_db(user_uri, Action::DisableDomainDb, db_name, domain)
            .await
    }

    async fn toggle_domain_db(
        &self,
        user_uri: &str,
        action: Action,
        db_name: &str,
        domain: &str,
    ) -> Result<Value> {
        let request = ApiRequest::v1_default(user_uri, action)
            .query("DBNAME", db_name)
            .query("DOMAINNAME", domain);
        self.send_request(&request, None, 0).await?.into_json()
    }
}

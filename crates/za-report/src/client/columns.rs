use serde_json::Value;
use tracing::instrument;

use crate::action::Action;
use crate::error::Result;
use crate::request::ApiRequest;

/// What Zoho does with values that fail lookup conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupErrorPolicy {
    /// Fail the whole operation.
    #[default]
    Abort,
    /// Store an empty value.
    Empty,
}

impl LookupErrorPolicy {
    /// The `ZOHO_IFERRORONCONVERSION` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupErrorPolicy::Abort => "ABORT",
            LookupErrorPolicy::Empty => "EMPTY",
        }
    }
}

impl super::ReportClient {
    /// Add a column of the given Zoho data type to a table.
    #[instrument(skip(self))]
    pub async fn add_column(&self, table_uri: &str, name: &str, data_type: &str) -> Result<()> {
        let request = ApiRequest::v1_default(table_uri, Action::AddColumn)
            .query("ZOHO_COLUMNNAME", name)
            .query("ZOHO_DATATYPE", data_type);
        self.send_unit(&request).await
    }

    #[instrument(skip(self))]
    pub async fn delete_column(&self, table_uri: &str, name: &str) -> Result<()> {
        let request =
            ApiRequest::v1_default(table_uri, Action::DeleteColumn).query("ZOHO_COLUMNNAME", name);
        self.send_unit(&request).await
    }

    #[instrument(skip(self))]
    pub async fn rename_column(&self, table_uri: &str, old_name: &str, new_name: &str) -> Result<()> {
        let request = ApiRequest::v1_default(table_uri, Action::RenameColumn)
            .query("OLDCOLUMNNAME", old_name)
            .query("NEWCOLUMNNAME", new_name);
        self.send_unit(&request).await
    }

    /// Hide columns from a table. Returns the per-column status list.
    #[instrument(skip(self))]
    pub async fn hide_columns(&self, table_uri: &str, names: &[&str]) -> Result<Value> {
        self.toggle_columns(table_uri, Action::HideColumn, names).await
    }

    /// Show previously hidden columns. Returns the per-column status list.
    #[instrument(skip(self))]
    pub async fn show_columns(&self, table_uri: &str, names: &[&str]) -> Result<Value> {
        self.toggle_columns(table_uri, Action::ShowColumn, names).await
    }

    async fn toggle_columns(&self, table_uri: &str, action: Action, names: &[&str]) -> Result<Value> {
        let request = ApiRequest::v1_default(table_uri, action).map_http(|http| {
            http.query_pairs(names.iter().map(|name| ("ZOHO_COLUMNNAME", *name)))
        });
        self.send_request(&request, None, 0).await?.into_json()
    }

    /// Turn `column` into a lookup of `referred_table.referred_column`.
    #[instrument(skip(self))]
    pub async fn add_lookup(
        &self,
        table_uri: &str,
        column: &str,
        referred_table: &str,
        referred_column: &str,
        on_error: LookupErrorPolicy,
    ) -> Result<()> {
        let request = ApiRequest::v1_default(table_uri, Action::AddLookup).map_http(|http| {
            http.query_pairs([
                ("ZOHO_COLUMNNAME", column),
                ("ZOHO_REFERREDTABLE", referred_table),
                ("ZOHO_REFERREDCOLUMN", referred_column),
                ("ZOHO_IFERRORONCONVERSION", on_error.as_str()),
            ])
        });
        self.send_unit(&request).await
    }

    #[instrument(skip(self))]
    pub async fn remove_lookup(&self, table_uri: &str, column: &str) -> Result<()> {
        let request =
            ApiRequest::v1_default(table_uri, Action::RemoveLookup).query("ZOHO_COLUMNNAME", column);
        self.send_unit(&request).await
    }
}

use std::collections::HashMap;
use std::io::Write;

use bytes::Bytes;
use tracing::{info, instrument};

use crate::action::{Action, OutputFormat};
use crate::config::IMPORT_TIMEOUT;
use crate::error::{Error, Result};
use crate::parse::ActionResult;
use crate::request::ApiRequest;
use crate::results::{ImportMode, ImportOptions, ImportResult};

/// Date format assumed for imported data unless overridden.
pub const DEFAULT_DATE_FORMAT: &str = "yyyy-MM-dd";

impl super::ReportClient {
    /// Add a single row to a table. Returns the column values echoed by
    /// the server, with empty values as `None`.
    #[instrument(skip(self, columns))]
    pub async fn add_row<I, K, V>(
        &self,
        uri: &str,
        columns: I,
    ) -> Result<HashMap<String, Option<String>>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let request = ApiRequest::v1_default(uri, Action::AddRow).map_http(|http| http.form(columns));
        self.send_request(&request, None, 0).await?.into_row()
    }

    /// Update the rows matching `criteria` with the given column values.
    /// Returns the number of updated rows.
    #[instrument(skip(self, columns))]
    pub async fn update_data<I, K, V>(&self, uri: &str, columns: I, criteria: &str) -> Result<u64>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut fields: Vec<(String, String)> = columns
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        fields.push(("ZOHO_CRITERIA".to_string(), criteria.to_string()));

        let request = ApiRequest::v1_default(uri, Action::Update).map_http(|http| http.form(fields));
        self.send_request(&request, None, 0).await?.into_count()
    }

    /// Delete the rows matching `criteria`, or every row when `None`.
    /// Returns the number of deleted rows.
    #[instrument(skip(self))]
    pub async fn delete_data(&self, uri: &str, criteria: Option<&str>, retries: u32) -> Result<u64> {
        let mut request = ApiRequest::v1_default(uri, Action::Delete);
        if let Some(criteria) = criteria {
            request = request.query("ZOHO_CRITERIA", criteria);
        }
        self.send_request(&request, None, retries).await?.into_count()
    }

    /// Import CSV content into a table.
    #[instrument(skip(self, content), fields(bytes = content.len(), mode = ?options.mode))]
    pub async fn import_data(
        &self,
        uri: &str,
        content: &str,
        options: &ImportOptions,
    ) -> Result<ImportResult> {
        let mut fields = vec![
            ("ZOHO_AUTO_IDENTIFY", "true".to_string()),
            ("ZOHO_ON_IMPORT_ERROR", "ABORT".to_string()),
            ("ZOHO_CREATE_TABLE", "false".to_string()),
            ("ZOHO_IMPORT_TYPE", options.mode.as_str().to_string()),
            (
                "ZOHO_DATE_FORMAT",
                options
                    .date_format
                    .clone()
                    .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string()),
            ),
            ("ZOHO_IMPORT_DATA", content.to_string()),
        ];
        match (&options.matching_columns, options.mode) {
            (Some(columns), _) => fields.push(("ZOHO_MATCHING_COLUMNS", columns.clone())),
            (None, ImportMode::UpdateAdd) => {
                return Err(Error::invalid_input(
                    "UPDATEADD imports require matching columns",
                ));
            }
            (None, _) => {}
        }

        let request = ApiRequest::v1_default(uri, Action::Import)
            .map_http(|http| http.form(fields).timeout(IMPORT_TIMEOUT));
        let result = self
            .send_request(&request, None, options.retries)
            .await?
            .into_import()?;

        info!(
            total_rows = result.total_row_count,
            success_rows = result.success_row_count,
            warnings = result.warning_count,
            "Import finished"
        );
        Ok(result)
    }

    /// Export a table or report to `sink`, optionally filtered by
    /// `criteria`. Returns the number of bytes written.
    #[instrument(skip(self, sink))]
    pub async fn export_data(
        &self,
        uri: &str,
        format: OutputFormat,
        sink: &mut (dyn Write + Send),
        criteria: Option<&str>,
    ) -> Result<usize> {
        let mut request = ApiRequest::v1(uri, Action::Export, format);
        if let Some(criteria) = criteria {
            request = request.map_http(|http| http.form([("ZOHO_CRITERIA", criteria)]));
        }
        exported(self.send_request(&request, Some(sink), 0).await?)
    }

    /// Export the result of an SQL query against a workspace to `sink`.
    /// Returns the number of bytes written.
    #[instrument(skip(self, sink))]
    pub async fn export_data_using_sql(
        &self,
        uri: &str,
        format: OutputFormat,
        sql: &str,
        sink: &mut (dyn Write + Send),
    ) -> Result<usize> {
        let request = ApiRequest::v1(uri, Action::Export, format).query("ZOHO_SQLQUERY", sql);
        exported(self.send_request(&request, Some(sink), 0).await?)
    }

    /// Export the result of an SQL query and return the body in memory.
    #[instrument(skip(self))]
    pub async fn export_bytes_using_sql(
        &self,
        uri: &str,
        format: OutputFormat,
        sql: &str,
        retries: u32,
    ) -> Result<Bytes> {
        let request = ApiRequest::v1(uri, Action::Export, format).query("ZOHO_SQLQUERY", sql);
        self.send_request(&request, None, retries).await?.into_body()
    }
}

fn exported(result: ActionResult) -> Result<usize> {
    match result {
        ActionResult::Exported { bytes } => Ok(bytes),
        other => Err(Error::parse(format!("unexpected export result: {:?}", other))),
    }
}

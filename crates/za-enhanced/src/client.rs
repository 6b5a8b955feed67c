//! The enhanced client.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};
use zoho_analytics_report::{
    Credentials, ErrorKind as ReportKind, ImportOptions, ImportResult, OutputFormat, ReportClient,
};

use crate::cache::{ExportCache, DEFAULT_CACHE_TTL};
use crate::clean::CleanOptions;
use crate::design::TableDesign;
use crate::error::{Error, ErrorKind, Result};
use crate::export::ExportedRows;
use crate::metadata::{process_table_meta_data, SchemaMetadata};

/// Columns sent in a single `CREATETABLE` call; longer designs make the
/// request URI too long.
pub const DEFAULT_COLUMN_THRESHOLD: usize = 70;

/// Longest criteria accepted by delete calls.
pub const MAX_CRITERIA_LENGTH: usize = 5000;

/// Delay step between uploads rejected by the short-term rate limit.
pub const DEFAULT_UPLOAD_BACKOFF: Duration = Duration::from_secs(10);

/// Login email of the workspace owner.
pub const ENV_LOGIN_EMAIL: &str = "ZOHOANALYTICS_LOGINEMAIL";
/// Default workspace name.
pub const ENV_WORKSPACE: &str = "ZOHOANALYTICS_DATABASENAME";
/// Accounts server override.
pub const ENV_ACCOUNTS_URL: &str = "ZOHO_SERVER_URL";
/// Analytics server override.
pub const ENV_ANALYTICS_URL: &str = "ZOHO_REPORT_SERVER_URL";

const CATALOG_INFO: &str = "ZOHO_CATALOG_INFO";
const INVALID_NUMBER: &str = "Invalid NUMBER value";

/// Higher-level operations on one owner's workspace.
///
/// # Example
///
/// ```rust,ignore
/// use zoho_analytics_enhanced::{EnhancedClient, MemoryCache};
///
/// let client = EnhancedClient::from_env()?
///     .with_cache(Arc::new(MemoryCache::new()), Duration::from_secs(600));
/// let rows = client
///     .data_export_using_sql("select * from \"Orders\"", "Orders")
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct EnhancedClient {
    report: ReportClient,
    owner: String,
    workspace: String,
    column_threshold: usize,
    clean: CleanOptions,
    cache: Option<Arc<dyn ExportCache>>,
    cache_ttl: Duration,
    upload_backoff: Duration,
}

impl EnhancedClient {
    /// Wrap a report client for `owner`'s `workspace`.
    pub fn new(report: ReportClient, owner: impl Into<String>, workspace: impl Into<String>) -> Self {
        Self {
            report,
            owner: owner.into(),
            workspace: workspace.into(),
            column_threshold: DEFAULT_COLUMN_THRESHOLD,
            clean: CleanOptions::default(),
            cache: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            upload_backoff: DEFAULT_UPLOAD_BACKOFF,
        }
    }

    /// Build from `ZOHOANALYTICS_*` credentials plus the login email and
    /// workspace variables. `ZOHO_SERVER_URL` and `ZOHO_REPORT_SERVER_URL`
    /// override the hosts when set.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let required = |name: &str| {
            var(name).ok_or_else(|| {
                Error::new(ErrorKind::InvalidInput(format!(
                    "environment variable {} is not set",
                    name
                )))
            })
        };

        let credentials = Credentials::from_env()
            .map_err(|e| Error::from(zoho_analytics_report::Error::from(e)))?;
        let mut builder = ReportClient::builder().credentials(credentials);
        if let Some(url) = var(ENV_ACCOUNTS_URL) {
            builder = builder.accounts_url(url);
        }
        if let Some(url) = var(ENV_ANALYTICS_URL) {
            builder = builder.analytics_url(url);
        }

        Ok(Self::new(
            builder.build()?,
            required(ENV_LOGIN_EMAIL)?,
            required(ENV_WORKSPACE)?,
        ))
    }

    /// Set the column threshold for table creation. A threshold of `0` is
    /// raised to `1`.
    pub fn with_column_threshold(mut self, threshold: usize) -> Self {
        self.column_threshold = threshold.max(1);
        self
    }

    pub fn with_clean_options(mut self, clean: CleanOptions) -> Self {
        self.clean = clean;
        self
    }

    /// Cache SQL exports in `cache` for `ttl`.
    pub fn with_cache(mut self, cache: Arc<dyn ExportCache>, ttl: Duration) -> Self {
        self.cache = Some(cache);
        self.cache_ttl = ttl;
        self
    }

    /// Delay step between rate-limited upload attempts.
    pub fn with_upload_backoff(mut self, backoff: Duration) -> Self {
        self.upload_backoff = backoff;
        self
    }

    /// The same client acting on another workspace.
    pub fn for_workspace(&self, workspace: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
            ..self.clone()
        }
    }

    pub fn report(&self) -> &ReportClient {
        &self.report
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    pub fn column_threshold(&self) -> usize {
        self.column_threshold
    }

    /// URI of the workspace.
    pub fn db_uri(&self) -> String {
        self.report.db_uri(&self.owner, &self.workspace)
    }

    /// URI of a table in the workspace.
    pub fn table_uri(&self, table: &str) -> String {
        self.report.table_uri(&self.owner, &self.workspace, table)
    }

    /// Create a table. Designs wider than the column threshold are created
    /// with the first columns and completed one `ADDCOLUMN` call at a time.
    #[instrument(skip(self, design), fields(table = %design.table_name, columns = design.columns.len()))]
    pub async fn create_table(&self, design: &TableDesign) -> Result<Value> {
        if design.columns.is_empty() {
            return Err(Error::new(ErrorKind::InvalidInput(format!(
                "table design for {} has no columns",
                design.table_name
            ))));
        }

        let db_uri = self.db_uri();
        let (head, rest) = design.split_at(self.column_threshold);
        let result = self
            .report
            .create_table(&db_uri, &design_value(&head)?)
            .await?;

        if !rest.is_empty() {
            let table_uri = self.table_uri(&design.table_name);
            for column in rest {
                self.report
                    .add_column(&table_uri, &column.column_name, &column.data_type)
                    .await?;
            }
            info!(added = rest.len(), "Added remaining columns");
        }
        Ok(result)
    }

    /// Import CSV content into `table`.
    ///
    /// The content is cleaned first. Imports rejected by the short-term
    /// rate limit are retried within the options' retry budget, waiting
    /// longer after each attempt; daily limits fail at once.
    #[instrument(skip(self, content, options), fields(bytes = content.len(), mode = ?options.mode))]
    pub async fn data_upload(
        &self,
        content: &str,
        table: &str,
        options: &ImportOptions,
    ) -> Result<ImportResult> {
        let content = self.clean.apply(content);
        let uri = self.table_uri(table);
        let budget = self.report.dispatch_config().budget(options.retries);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let err = match self.report.import_data(&uri, &content, options).await {
                Ok(result) => {
                    debug!(
                        table,
                        rows = result.total_row_count,
                        warnings = result.warning_count,
                        "Processed rows"
                    );
                    return Ok(result);
                }
                Err(err) => err,
            };

            let delay = match &err.kind {
                ReportKind::RateLimited { .. } if attempt < budget => {
                    self.upload_backoff * attempt
                }
                ReportKind::Parse(message) if message.contains(INVALID_NUMBER) => {
                    error!(error = %err, "Data does not match the table definition");
                    return Err(err.into());
                }
                ReportKind::Parse(_) if attempt < budget => {
                    self.upload_backoff.min(Duration::from_secs(1))
                }
                ReportKind::UnrecoverableRateLimit { .. } => {
                    error!(error = %err, "Zoho API limit exceeded, not retrying");
                    return Err(err.into());
                }
                _ => return Err(err.into()),
            };

            warn!(attempt, budget, error = %err, "Retrying upload");
            tokio::time::sleep(delay).await;
        }
    }

    /// Rows returned by an SQL query, served from the cache when one is
    /// configured and holds the query.
    ///
    /// Zoho requires a table or report in the URI but does not restrict the
    /// query to it.
    #[instrument(skip(self))]
    pub async fn data_export_using_sql(&self, sql: &str, table: &str) -> Result<ExportedRows> {
        let text = self.export_csv(sql, table, true).await?;
        ExportedRows::from_csv(&text)
    }

    /// Like [`data_export_using_sql`](Self::data_export_using_sql), with
    /// rows deserialized by header name.
    pub async fn data_export_as<T: DeserializeOwned>(&self, sql: &str, table: &str) -> Result<Vec<T>> {
        self.data_export_using_sql(sql, table).await?.deserialize()
    }

    /// Delete the rows of `table` matching `criteria`. Returns the number
    /// of deleted rows.
    #[instrument(skip(self, criteria))]
    pub async fn delete_rows(&self, table: &str, criteria: &str) -> Result<u64> {
        check_criteria(criteria)?;
        let deleted = self
            .report
            .delete_data(&self.table_uri(table), Some(criteria), 0)
            .await?;
        info!(deleted, "Deleted rows");
        Ok(deleted)
    }

    /// Count the rows of `table` matching `criteria`, bypassing the cache.
    #[instrument(skip(self, criteria))]
    pub async fn pre_delete_rows(&self, table: &str, criteria: &str) -> Result<u64> {
        check_criteria(criteria)?;
        let sql = format!("select count(*) from \"{}\" where {}", table, criteria);
        let rows = ExportedRows::from_csv(&self.export_csv(&sql, table, false).await?)?;
        let count = rows
            .get(0)
            .and_then(|row| row.at(0))
            .ok_or_else(|| Error::new(ErrorKind::Csv("count query returned no rows".into())))?;
        parse_count(count)
    }

    /// Count, delete, and fail when the two numbers differ.
    #[instrument(skip(self, criteria))]
    pub async fn delete_rows_verified(&self, table: &str, criteria: &str) -> Result<u64> {
        let expected = self.pre_delete_rows(table, criteria).await?;
        let deleted = self.delete_rows(table, criteria).await?;
        if expected != deleted {
            return Err(Error::new(ErrorKind::CountMismatch { expected, deleted }));
        }
        Ok(deleted)
    }

    /// The raw `ZOHO_CATALOG_INFO` of the workspace.
    #[instrument(skip(self))]
    pub async fn get_database_catalog(&self) -> Result<Value> {
        Ok(self
            .report
            .get_database_metadata(&self.db_uri(), CATALOG_INFO)
            .await?)
    }

    /// Tables of the workspace indexed by table and column name.
    pub async fn get_table_metadata(&self) -> Result<SchemaMetadata> {
        process_table_meta_data(&self.get_database_catalog().await?)
    }

    async fn export_csv(&self, sql: &str, table: &str, use_cache: bool) -> Result<String> {
        let cache = self.cache.as_ref().filter(|_| use_cache);
        if let Some(hit) = cache.and_then(|c| c.get(sql)) {
            debug!("Export served from cache");
            return Ok(hit);
        }

        let body = self
            .report
            .export_bytes_using_sql(&self.table_uri(table), OutputFormat::Csv, sql, 0)
            .await?;
        let text = String::from_utf8_lossy(&body).into_owned();

        if let Some(cache) = cache {
            cache.set(sql, text.clone(), self.cache_ttl);
        }
        Ok(text)
    }
}

fn check_criteria(criteria: &str) -> Result<()> {
    let length = criteria.chars().count();
    if length > MAX_CRITERIA_LENGTH {
        return Err(Error::new(ErrorKind::InvalidInput(format!(
            "criteria is {} characters long, the limit is {}",
            length, MAX_CRITERIA_LENGTH
        ))));
    }
    Ok(())
}

fn parse_count(text: &str) -> Result<u64> {
    let text = text.trim();
    text.parse::<u64>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().filter(|n| *n >= 0.0).map(|n| n as u64))
        .ok_or_else(|| Error::new(ErrorKind::Csv(format!("'{}' is not a row count", text))))
}

fn design_value(design: &TableDesign) -> Result<Value> {
    serde_json::to_value(design).map_err(|e| Error {
        kind: ErrorKind::InvalidInput(e.to_string()),
        source: Some(Box::new(e)),
    })
}

//! # zoho-analytics
//!
//! A Zoho Analytics API client library for Rust.
//!
//! Covers the v1 `/api/{owner}/{workspace}/{view}` actions and the v2
//! `/restapi/v2` organization and workspace endpoints, with OAuth token
//! management, vendor error classification and retries.
//!
//! ## Security
//!
//! - Tokens and secrets are redacted in Debug output
//! - Tracing skips credential parameters
//! - Logged response bodies are truncated and sanitized
//!
//! ## Crates
//!
//! - **zoho-analytics-client** - HTTP transport with retry, compression and vendor error codes
//! - **zoho-analytics-auth** - OAuth refresh-token flow, legacy auth tokens, token storage
//! - **zoho-analytics-report** - The retrying dispatcher and every v1/v2 operation
//! - **zoho-analytics-enhanced** - Chunked table creation, cleaned uploads, cached exports
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use zoho_analytics::{ImportOptions, ReportClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // ZOHOANALYTICS_CLIENTID, ZOHOANALYTICS_CLIENTSECRET, ZOHOANALYTICS_REFRESHTOKEN
//!     let client = ReportClient::from_env()?;
//!
//!     let uri = client.table_uri("owner@example.com", "Sales", "Orders");
//!     let result = client
//!         .import_data(&uri, "Id,Region\n1,East\n", &ImportOptions::default())
//!         .await?;
//!     println!("imported {} rows", result.success_row_count);
//!
//!     Ok(())
//! }
//! ```

#[cfg(feature = "auth")]
pub use zoho_analytics_auth as auth;
#[cfg(feature = "client")]
pub use zoho_analytics_client as client;
#[cfg(feature = "enhanced")]
pub use zoho_analytics_enhanced as enhanced;
#[cfg(feature = "report")]
pub use zoho_analytics_report as report;

#[cfg(feature = "auth")]
pub use zoho_analytics_auth::{Credentials, DataCentre, TokenManager};
#[cfg(feature = "client")]
pub use zoho_analytics_client::{ClientConfig, ZaHttpClient};
#[cfg(feature = "enhanced")]
pub use zoho_analytics_enhanced::EnhancedClient;
#[cfg(feature = "report")]
pub use zoho_analytics_report::{ImportMode, ImportOptions, OutputFormat, ReportClient};

//! # za-report
//!
//! Zoho Analytics report client.
//!
//! Every call goes through one retrying dispatcher
//! ([`ReportClient::send_request`]) which authorizes the request, sends it
//! through the [`zoho_analytics_client`] transport, classifies failures by
//! vendor error code and parses successful bodies according to the
//! request's [`Action`] tag.
//!
//! - v1 endpoints (`/api/{owner}/{workspace}/{view}`) return XML or JSON
//!   depending on the action
//! - v2 endpoints (`/restapi/v2/...`) return JSON with a `data` member
//!
//! ## Example
//!
//! ```rust,ignore
//! use zoho_analytics_report::{ImportOptions, ReportClient};
//!
//! let client = ReportClient::from_env()?;
//! let uri = client.table_uri("owner@example.com", "Sales", "Orders");
//! let result = client
//!     .import_data(&uri, "Id,Region\n1,East\n", &ImportOptions::default())
//!     .await?;
//! println!("imported {} rows", result.success_row_count);
//! ```

mod action;
mod client;
mod config;
mod error;
pub mod parse;
mod request;
mod results;

pub use action::{Action, OutputFormat};
pub use client::{
    LookupErrorPolicy, ReportClient, ReportClientBuilder, DEFAULT_DATE_FORMAT,
    DEST_ORG_ID_HEADER, ORG_ID_HEADER,
};
pub use config::{DispatchBackoff, DispatchConfig, DEFAULT_RETRIES, IMPORT_TIMEOUT};
pub use error::{Error, ErrorKind, Result};
pub use parse::{ActionResult, XmlDocument, XmlElement};
pub use request::{db_uri, table_uri, user_uri, ApiRequest, API_VERSION};
pub use results::{
    GroupShare, ImportMode, ImportOptions, ImportResult, ObjectInfo, PermissionMap, PlanInfo,
    ShareInfo, TrialInfo, ViewPermission,
};

// Re-export auth types callers need to build a client.
pub use zoho_analytics_auth::{Credentials, DataCentre, TokenManager, TokenStorage};

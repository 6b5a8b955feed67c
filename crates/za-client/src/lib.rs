//! # za-client
//!
//! Core HTTP transport for the Zoho Analytics APIs.
//!
//! This crate provides the foundational pieces every other crate builds on:
//! - Connection pooling and per-request timeouts
//! - Transport-level retry with exponential backoff for 500/502/503/504
//!   and connection failures
//! - Fully buffered responses so callers can inspect status, headers and
//!   body uniformly
//! - Vendor error-code extraction (structured parse first, pattern scan as
//!   a fallback) and classification into retry categories
//! - URL segment encoding and log sanitizing helpers
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Application Layer                        │
//! │  (za-report dispatcher, za-enhanced convenience layer)      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ZaHttpClient                             │
//! │  - Raw HTTP with connection-level retry and compression     │
//! │  - Authorization header or legacy authtoken parameter       │
//! │  - Buffered Response                                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use zoho_analytics_client::{ClientConfig, ZaHttpClient};
//!
//! let client = ZaHttpClient::new(ClientConfig::default())?;
//! let response = client
//!     .execute(client.get("https://analyticsapi.zoho.com/restapi/v2/orgs").oauth_token(token))
//!     .await?;
//! println!("{}", response.status());
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;
mod retry;
pub mod security;
pub mod vendor;

pub use client::ZaHttpClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use request::{Authorization, MultipartFile, RequestBody, RequestBuilder, RequestMethod};
pub use response::Response;
pub use retry::{BackoffStrategy, RetryConfig, RetryPolicy};
pub use vendor::VendorErrorClass;

/// Default Zoho Analytics API server.
pub const DEFAULT_ANALYTICS_URL: &str = "https://analyticsapi.zoho.com";

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("zoho-analytics-rs/", env!("CARGO_PKG_VERSION"));

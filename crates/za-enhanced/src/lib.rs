//! # za-enhanced
//!
//! Convenience operations on top of [`zoho_analytics_report`], bound to one
//! owner and workspace:
//!
//! - table creation that works around the request URI length limit for
//!   wide designs
//! - CSV uploads with content cleaning and rate-limit backoff
//! - SQL exports parsed into rows, optionally cached
//! - counted and verified row deletion
//! - workspace catalog processing
//!
//! ## Example
//!
//! ```rust,ignore
//! use zoho_analytics_enhanced::{EnhancedClient, TableDesign};
//! use zoho_analytics_report::ImportOptions;
//!
//! let client = EnhancedClient::from_env()?;
//! client
//!     .create_table(&TableDesign::new("Orders").column("Id", "NUMBER"))
//!     .await?;
//! client
//!     .data_upload("Id\n1\n2\n", "Orders", &ImportOptions::default())
//!     .await?;
//! let deleted = client.delete_rows_verified("Orders", "\"Id\" = 1").await?;
//! ```

mod cache;
mod clean;
mod client;
mod design;
mod error;
mod export;
mod metadata;

pub use cache::{ExportCache, MemoryCache, DEFAULT_CACHE_TTL};
pub use clean::{CleanOptions, EmojiHandling};
pub use client::{
    EnhancedClient, DEFAULT_COLUMN_THRESHOLD, DEFAULT_UPLOAD_BACKOFF, ENV_ACCOUNTS_URL,
    ENV_ANALYTICS_URL, ENV_LOGIN_EMAIL, ENV_WORKSPACE, MAX_CRITERIA_LENGTH,
};
pub use design::{ColumnDesign, TableDesign};
pub use error::{Error, ErrorKind, Result};
pub use export::{ExportedRows, Row};
pub use metadata::{
    catalog_name, process_table_meta_data, ColumnMetadata, SchemaMetadata, TableMetadata,
};

//! Workspace catalog processing.
//!
//! `ZOHO_CATALOG_INFO` returns every view of a workspace with its columns.
//! [`process_table_meta_data`] keeps the plain tables and indexes them as
//! table name → column name → [`ColumnMetadata`].

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, ErrorKind, Result};

/// Catalog entry for one column.
///
/// Zoho sends numbers and flags either as JSON numbers/booleans or as
/// strings; both forms are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnMetadata {
    pub column_formula: Option<String>,
    pub column_name: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub column_size: i64,
    /// Numeric type code.
    #[serde(deserialize_with = "lenient_string")]
    pub data_type: String,
    pub date_format: Option<String>,
    #[serde(deserialize_with = "lenient_i64")]
    pub decimal_digits: i64,
    #[serde(deserialize_with = "lenient_bool")]
    pub nullable: bool,
    #[serde(deserialize_with = "lenient_i64")]
    pub ordinal_position: i64,
    pub pkcolumn_name: Option<String>,
    pub pktable_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub remarks: String,
    /// Descriptive type name such as `PLAIN` or `NUMBER`.
    pub type_name: String,
}

/// Column name → column metadata.
pub type TableMetadata = BTreeMap<String, ColumnMetadata>;

/// Table name → table metadata.
pub type SchemaMetadata = BTreeMap<String, TableMetadata>;

/// Index the tables of a `ZOHO_CATALOG_INFO` result. Views that are not
/// plain tables (reports, query tables, dashboards) are skipped.
pub fn process_table_meta_data(catalog: &Value) -> Result<SchemaMetadata> {
    let views = catalog["views"]
        .as_array()
        .ok_or_else(|| metadata_error("catalog has no 'views' list"))?;

    let mut schema = SchemaMetadata::new();
    for view in views {
        if view["tableType"].as_str() != Some("TABLE") {
            continue;
        }
        let table_name = view["tableName"]
            .as_str()
            .ok_or_else(|| metadata_error("table entry has no 'tableName'"))?;

        let mut table = TableMetadata::new();
        for column in view["columns"].as_array().into_iter().flatten() {
            let column = ColumnMetadata::deserialize(column)?;
            table.insert(column.column_name.clone(), column);
        }
        schema.insert(table_name.to_string(), table);
    }
    Ok(schema)
}

/// The workspace name (`tableCat`) of a catalog.
pub fn catalog_name(catalog: &Value) -> Option<&str> {
    catalog["tableCat"].as_str()
}

fn metadata_error(message: &str) -> Error {
    Error::new(ErrorKind::Metadata(message.to_string()))
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

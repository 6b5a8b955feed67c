//! Zoho vendor error codes.
//!
//! Zoho reports failures as a small integer embedded in the response body.
//! v1 endpoints answer with `{"response": {"error": {"code": 7103, "message": ...}}}`
//! (or an XML `<code>` element), v2 endpoints with
//! `{"status": "failure", "data": {"errorCode": 8535, "errorMessage": ...}}`.
//!
//! [`extract_error_code`] tries a structured parse first and only falls back
//! to a pattern scan when the body is not valid JSON.

use regex_lite::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Known vendor error codes.
pub mod codes {
    /// Plan row count exceeded.
    pub const ROW_LIMIT_EXCEEDED: i64 = 6001;
    /// Daily API quota exceeded.
    pub const DAILY_LIMIT_EXCEEDED: i64 = 6043;
    /// Daily API quota exceeded (units).
    pub const DAILY_UNITS_EXCEEDED: i64 = 6044;
    /// Per-minute API rate limit exceeded.
    pub const RATE_LIMIT_EXCEEDED: i64 = 6045;
    /// Unexpected server error.
    pub const UNEXPECTED_ERROR: i64 = 7005;
    /// Workspace not found.
    pub const WORKSPACE_NOT_FOUND: i64 = 7103;
    /// No view with the given name in the workspace.
    pub const VIEW_NOT_FOUND: i64 = 7179;
    /// Invalid value for the column data type.
    pub const INVALID_DATA_TYPE_VALUE: i64 = 7232;
    /// Schema conflict (column or lookup mismatch).
    pub const SCHEMA_CONFLICT: i64 = 7280;
    /// Permission denied for the workspace.
    pub const PERMISSION_DENIED: i64 = 7301;
    /// Table schema is still being updated.
    pub const SCHEMA_UPDATE_IN_PROGRESS: i64 = 7387;
    /// Organisation does not exist.
    pub const ORG_NOT_FOUND: i64 = 7389;
    /// Operation not allowed for this user.
    pub const OPERATION_NOT_ALLOWED: i64 = 8023;
    /// SQL query could not be parsed.
    pub const SQL_PARSE_ERROR: i64 = 8046;
    /// Required parameter missing or malformed.
    pub const MALFORMED_PARAMETER: i64 = 8504;
    /// Malformed email address.
    pub const MALFORMED_EMAIL: i64 = 8509;
    /// Invalid value for a parameter.
    pub const INVALID_PARAMETER_VALUE: i64 = 8516;
    /// CONFIG is not valid JSON.
    pub const INVALID_JSON: i64 = 8534;
    /// Access token invalid or expired.
    pub const INVALID_OAUTH_TOKEN: i64 = 8535;
    /// Token lacks the required OAuth scope.
    pub const INVALID_OAUTH_SCOPE: i64 = 8540;
    /// Another import is still running on the table.
    pub const IMPORT_IN_PROGRESS: i64 = 10001;
}

/// What the dispatcher should do about a vendor error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorErrorClass {
    /// Refresh the access token, then retry.
    InvalidToken,
    /// Wait, then retry.
    Transient,
    /// Quota that waiting within a call will not restore.
    QuotaExceeded,
    /// The request payload is malformed.
    BadData,
    /// Schema, permission or SQL errors.
    Fatal,
    /// Unrecognized code.
    Unknown,
}

impl VendorErrorClass {
    /// Classify a vendor error code.
    pub fn classify(code: i64) -> Self {
        use codes::*;
        match code {
            INVALID_OAUTH_TOKEN => VendorErrorClass::InvalidToken,
            RATE_LIMIT_EXCEEDED | IMPORT_IN_PROGRESS | SCHEMA_UPDATE_IN_PROGRESS => {
                VendorErrorClass::Transient
            }
            ROW_LIMIT_EXCEEDED | DAILY_LIMIT_EXCEEDED | DAILY_UNITS_EXCEEDED => {
                VendorErrorClass::QuotaExceeded
            }
            INVALID_DATA_TYPE_VALUE | MALFORMED_PARAMETER | MALFORMED_EMAIL
            | INVALID_PARAMETER_VALUE | INVALID_JSON | UNEXPECTED_ERROR => {
                VendorErrorClass::BadData
            }
            WORKSPACE_NOT_FOUND | VIEW_NOT_FOUND | SCHEMA_CONFLICT | PERMISSION_DENIED
            | ORG_NOT_FOUND | OPERATION_NOT_ALLOWED | SQL_PARSE_ERROR | INVALID_OAUTH_SCOPE => {
                VendorErrorClass::Fatal
            }
            _ => VendorErrorClass::Unknown,
        }
    }

    /// Returns true if the dispatcher retries this class.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VendorErrorClass::InvalidToken | VendorErrorClass::Transient | VendorErrorClass::Unknown
        )
    }
}

static JSON_CODE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#""(?:error)?[cC]ode"\s*:\s*"?(\d+)"#).ok());
static XML_CODE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"<code>\s*(\d+)\s*</code>").ok());

/// Extract the vendor error code from a response body.
pub fn extract_error_code(body: &[u8]) -> Option<i64> {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => structured_code(&value),
        Err(_) => scan_code(&String::from_utf8_lossy(body)),
    }
}

/// Extract the vendor error message from a JSON response body.
pub fn extract_error_message(body: &[u8]) -> Option<String> {
    let value = serde_json::from_slice::<Value>(body).ok()?;
    let message = [
        &value["response"]["error"]["message"],
        &value["data"]["errorMessage"],
        &value["errorMessage"],
        &value["message"],
    ]
    .into_iter()
    .find_map(|v| v.as_str().map(str::to_string));
    message
}

fn structured_code(value: &Value) -> Option<i64> {
    [
        &value["response"]["error"]["code"],
        &value["data"]["errorCode"],
        &value["errorCode"],
        &value["code"],
    ]
    .into_iter()
    .find_map(as_code)
}

fn as_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scan_code(text: &str) -> Option<i64> {
    [JSON_CODE.as_ref(), XML_CODE.as_ref()]
        .into_iter()
        .flatten()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

//! Typed results of v1 actions.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;
use zoho_analytics_client::security::log;
use zoho_analytics_client::vendor::codes;

use crate::error::{Error, ErrorKind, Result};
use crate::parse::XmlDocument;

/// How imported rows are merged into the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ImportMode {
    /// Add the rows to the existing data.
    Append,
    /// Delete all existing rows, then add.
    #[default]
    TruncateAdd,
    /// Update rows matching `ZOHO_MATCHING_COLUMNS`, add the rest.
    UpdateAdd,
}

impl ImportMode {
    /// The `ZOHO_IMPORT_TYPE` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::Append => "APPEND",
            ImportMode::TruncateAdd => "TRUNCATEADD",
            ImportMode::UpdateAdd => "UPDATEADD",
        }
    }
}

/// Options for a v1 CSV import.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Merge mode.
    pub mode: ImportMode,
    /// Comma separated column names, required for [`ImportMode::UpdateAdd`].
    pub matching_columns: Option<String>,
    /// Date format of the data; `yyyy-MM-dd` when unset.
    pub date_format: Option<String>,
    /// Retry budget for the call; `0` uses the client default.
    pub retries: u32,
}

impl ImportOptions {
    /// Options with the given mode.
    pub fn new(mode: ImportMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Set the matching columns.
    pub fn with_matching_columns(mut self, columns: impl Into<String>) -> Self {
        self.matching_columns = Some(columns.into());
        self
    }

    /// Set the date format.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    /// Set the retry budget.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}

/// Summary of a completed import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    /// Columns present in the imported data.
    pub total_column_count: u64,
    /// Columns actually imported.
    pub selected_column_count: u64,
    /// Rows present in the imported data.
    pub total_row_count: u64,
    /// Rows imported without errors.
    pub success_row_count: u64,
    /// Rows imported with warnings.
    pub warning_count: u64,
    /// The first 100 import errors, as reported by the server.
    pub import_errors: String,
    /// `created` or `updated`.
    pub operation: String,
    /// Column name to Zoho data type.
    pub column_types: HashMap<String, String>,
    /// Imported columns in server order.
    pub imported_columns: Vec<String>,
}

impl ImportResult {
    /// Parse an `IMPORT` XML response.
    ///
    /// A `<code>` element carrying a rate limit or data type error is turned
    /// into the matching error kind. Any other unparseable body is a `Parse`
    /// error whose message ends with the sanitized response.
    pub fn from_xml(body: &[u8]) -> Result<Self> {
        Self::parse_summary(body).map_err(|err| {
            if let ErrorKind::Parse(message) = &err.kind {
                let message = format!(
                    "{}; response: {}",
                    message,
                    log::sanitize(&String::from_utf8_lossy(body))
                );
                return Error::parse(message);
            }
            err
        })
    }

    fn parse_summary(body: &[u8]) -> Result<Self> {
        let doc = XmlDocument::parse(body)?;

        if let Some(code) = doc.text("code").ok().and_then(|c| c.trim().parse::<i64>().ok()) {
            let message = doc
                .text("message")
                .unwrap_or_else(|_| log::truncate(&String::from_utf8_lossy(body), log::MAX_LENGTH));
            match code {
                codes::ROW_LIMIT_EXCEEDED | codes::DAILY_LIMIT_EXCEEDED | codes::DAILY_UNITS_EXCEEDED => {
                    return Err(Error::new(ErrorKind::UnrecoverableRateLimit { code, message }))
                }
                codes::RATE_LIMIT_EXCEEDED => {
                    return Err(Error::new(ErrorKind::RateLimited { code, message }))
                }
                codes::INVALID_DATA_TYPE_VALUE => {
                    return Err(Error::new(ErrorKind::BadData {
                        code: Some(code),
                        message,
                    }))
                }
                _ => {}
            }
        }

        let mut column_types = HashMap::new();
        let mut imported_columns = Vec::new();
        for column in doc.all("column") {
            let name = column.text.clone();
            column_types.insert(name.clone(), column.attribute("datatype").unwrap_or("").to_string());
            imported_columns.push(name);
        }

        Ok(Self {
            total_column_count: doc.count("totalColumnCount")?,
            selected_column_count: doc.count("selectedColumnCount")?,
            total_row_count: doc.count("totalRowCount")?,
            success_row_count: doc.count("successRowCount")?,
            warning_count: doc.count("warnings")?,
            import_errors: doc.text("importErrors").unwrap_or_default(),
            operation: doc.text("importOperation").unwrap_or_default(),
            column_types,
            imported_columns,
        })
    }
}

/// Trial details of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialInfo {
    pub plan: String,
    pub status: bool,
    pub end_date: String,
}

/// Subscription plan of the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanInfo {
    pub plan: String,
    pub addon: String,
    pub billing_date: String,
    pub rows_allowed: u64,
    pub rows_used: u64,
    pub trial_availed: bool,
    /// Present unless `TrialAvailed` is `false`.
    pub trial: Option<TrialInfo>,
}

impl PlanInfo {
    /// Parse a `GETUSERPLANDETAILS` XML response.
    pub fn from_xml(body: &[u8]) -> Result<Self> {
        let doc = XmlDocument::parse(body)?;
        let trial_availed = doc.text("TrialAvailed")?;

        let trial = if trial_availed.trim() != "false" {
            Some(TrialInfo {
                plan: doc.text("TrialPlan")?,
                status: !doc.text("TrialStatus")?.trim().is_empty(),
                end_date: doc.text("TrialEndDate")?,
            })
        } else {
            None
        };

        Ok(Self {
            plan: doc.text("plan")?,
            addon: doc.text("addon")?,
            billing_date: doc.text("billingDate")?,
            rows_allowed: doc.count("rowsAllowed")?,
            rows_used: doc.count("rowsUsed")?,
            trial_availed: trial_availed.trim() != "false",
            trial,
        })
    }
}

/// Object ids returned by `GETINFO`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectInfo {
    /// Id of the view.
    pub objid: String,
    /// Id of the workspace.
    pub dbid: String,
}

/// Permissions on one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewPermission {
    pub shared_by: String,
    pub permissions: Value,
}

/// View name to permissions.
pub type PermissionMap = BTreeMap<String, ViewPermission>;

/// A sharing group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupShare {
    pub name: String,
    pub description: String,
    pub members: Value,
}

/// Sharing details of a workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShareInfo {
    /// Email addresses of users the workspace is shared with.
    pub shared_users: Vec<String>,
    /// Per-user permissions, keyed by email.
    pub user_info: BTreeMap<String, PermissionMap>,
    /// Per-group permissions, keyed by group name.
    pub group_info: BTreeMap<String, PermissionMap>,
    /// Groups in server order.
    pub groups: Vec<GroupShare>,
    /// Public link permissions.
    pub public_info: BTreeMap<String, PermissionMap>,
    /// Private link permissions.
    pub private_info: BTreeMap<String, PermissionMap>,
    /// Workspace owners.
    pub admin_members: Vec<String>,
}

impl ShareInfo {
    /// Build from the `result` member of a `GETSHAREINFO` response.
    pub fn from_result(result: &Value) -> Result<Self> {
        let mut info = ShareInfo::default();

        for entry in non_empty_array(&result["usershareinfo"]) {
            let share = &entry["shareinfo"];
            let email = required_str(share, "email")?;
            info.shared_users.push(email.clone());
            info.user_info.insert(email, permissions(&share["permissions"])?);
        }

        for entry in non_empty_array(&result["groupshareinfo"]) {
            let share = &entry["shareinfo"];
            let name = required_str(share, "groupName")?;
            info.groups.push(GroupShare {
                name: name.clone(),
                description: share["desc"].as_str().unwrap_or_default().to_string(),
                members: share["groupmembers"].clone(),
            });
            info.group_info.insert(name, permissions(&share["permissions"])?);
        }

        for (key, target) in [
            ("publicshareinfo", &mut info.public_info),
            ("privatelinkshareinfo", &mut info.private_info),
        ] {
            let share = &result[key];
            if share.as_object().is_some_and(|o| !o.is_empty()) {
                let email = required_str(share, "email")?;
                target.insert(email, permissions(&share["permissions"])?);
            }
        }

        info.admin_members = match &result["dbownershareinfo"]["dbowners"] {
            Value::Array(owners) => owners
                .iter()
                .filter_map(|o| o.as_str().map(str::to_string))
                .collect(),
            Value::String(owner) => vec![owner.clone()],
            _ => Vec::new(),
        };

        Ok(info)
    }
}

fn non_empty_array(value: &Value) -> impl Iterator<Item = &Value> {
    value.as_array().into_iter().flatten()
}

fn required_str(value: &Value, key: &str) -> Result<String> {
    value[key]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::parse(format!("share info entry has no '{}'", key)))
}

fn permissions(list: &Value) -> Result<PermissionMap> {
    let mut map = PermissionMap::new();
    for entry in non_empty_array(list) {
        let perm = &entry["perminfo"];
        map.insert(
            required_str(perm, "viewname")?,
            ViewPermission {
                shared_by: perm["sharedby"].as_str().unwrap_or_default().to_string(),
                permissions: perm["permission"].clone(),
            },
        );
    }
    Ok(map)
}

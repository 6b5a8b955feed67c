//! Action tags.
//!
//! The action tag of a request names the v1 `ZOHO_ACTION` and selects the
//! routine that parses a successful response.

/// Response format requested with `ZOHO_OUTPUT_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xml,
    Json,
    Csv,
    Pdf,
    Html,
    Image,
}

impl OutputFormat {
    /// The parameter value Zoho expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Xml => "XML",
            OutputFormat::Json => "JSON",
            OutputFormat::Csv => "CSV",
            OutputFormat::Pdf => "PDF",
            OutputFormat::Html => "HTML",
            OutputFormat::Image => "IMAGE",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action tag of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    AddRow,
    Update,
    Delete,
    Import,
    Export,
    CopyDatabase,
    DeleteDatabase,
    CreateTable,
    AddColumn,
    DeleteColumn,
    RenameColumn,
    HideColumn,
    ShowColumn,
    AddLookup,
    RemoveLookup,
    DatabaseMetadata,
    GetDatabaseName,
    IsDbExist,
    GetCopyDbKey,
    GetViewName,
    GetInfo,
    GetViewUrl,
    GetEmbedUrl,
    RenameView,
    GetShareInfo,
    GetUserPlanDetails,
    GetUsers,
    AddUser,
    RemoveUser,
    ActivateUser,
    DeactivateUser,
    Share,
    RemoveShare,
    AddDbOwner,
    RemoveDbOwner,
    CopyReports,
    CopyFormula,
    AutoGenReports,
    CreateSimilarViews,
    EnableDomainDb,
    DisableDomainDb,
    /// Any `/restapi/v2` call; the result is the document's `data` member.
    V2,
}

impl Action {
    /// The `ZOHO_ACTION` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::AddRow => "ADDROW",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
            Action::Import => "IMPORT",
            Action::Export => "EXPORT",
            Action::CopyDatabase => "COPYDATABASE",
            Action::DeleteDatabase => "DELETEDATABASE",
            Action::CreateTable => "CREATETABLE",
            Action::AddColumn => "ADDCOLUMN",
            Action::DeleteColumn => "DELETECOLUMN",
            Action::RenameColumn => "RENAMECOLUMN",
            Action::HideColumn => "HIDECOLUMN",
            Action::ShowColumn => "SHOWCOLUMN",
            Action::AddLookup => "ADDLOOKUP",
            Action::RemoveLookup => "REMOVELOOKUP",
            Action::DatabaseMetadata => "DATABASEMETADATA",
            Action::GetDatabaseName => "GETDATABASENAME",
            Action::IsDbExist => "ISDBEXIST",
            Action::GetCopyDbKey => "GETCOPYDBKEY",
            Action::GetViewName => "GETVIEWNAME",
            Action::GetInfo => "GETINFO",
            Action::GetViewUrl => "GETVIEWURL",
            Action::GetEmbedUrl => "GETEMBEDURL",
            Action::RenameView => "RENAMEVIEW",
            Action::GetShareInfo => "GETSHAREINFO",
            Action::GetUserPlanDetails => "GETUSERPLANDETAILS",
            Action::GetUsers => "GETUSERS",
            Action::AddUser => "ADDUSER",
            Action::RemoveUser => "REMOVEUSER",
            Action::ActivateUser => "ACTIVATEUSER",
            Action::DeactivateUser => "DEACTIVATEUSER",
            Action::Share => "SHARE",
            Action::RemoveShare => "REMOVESHARE",
            Action::AddDbOwner => "ADDDBOWNER",
            Action::RemoveDbOwner => "REMOVEDBOWNER",
            Action::CopyReports => "COPYREPORTS",
            Action::CopyFormula => "COPYFORMULA",
            Action::AutoGenReports => "AUTOGENREPORTS",
            Action::CreateSimilarViews => "CREATESIMILARVIEWS",
            Action::EnableDomainDb => "ENABLEDOMAINDB",
            Action::DisableDomainDb => "DISABLEDOMAINDB",
            Action::V2 => "V2",
        }
    }

    /// Output format used when the caller does not choose one.
    pub fn default_output_format(&self) -> OutputFormat {
        match self {
            Action::Update
            | Action::Delete
            | Action::CopyDatabase
            | Action::CreateTable
            | Action::HideColumn
            | Action::ShowColumn
            | Action::DatabaseMetadata
            | Action::IsDbExist
            | Action::GetShareInfo
            | Action::GetUsers
            | Action::AutoGenReports
            | Action::CreateSimilarViews
            | Action::EnableDomainDb
            | Action::DisableDomainDb
            | Action::V2 => OutputFormat::Json,
            Action::Export => OutputFormat::Csv,
            _ => OutputFormat::Xml,
        }
    }

    /// Returns true if a successful response is streamed to a sink.
    pub fn is_export(&self) -> bool {
        matches!(self, Action::Export)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

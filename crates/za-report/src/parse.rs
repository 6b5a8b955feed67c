//! Response parsers, selected by action tag.
//!
//! XML bodies are flattened into a list of elements in document order.
//! Lookups take the first element with a given tag, wherever it is nested,
//! and read only its direct text.

use std::collections::HashMap;
use std::io::Write;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::Value;

use crate::action::Action;
use crate::error::{Error, Result};
use crate::results::{ImportResult, ObjectInfo, PlanInfo, ShareInfo};

/// One XML element with its attributes and direct text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
}

impl XmlElement {
    /// Value of an attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A parsed XML document as a flat element list.
#[derive(Debug, Clone, Default)]
pub struct XmlDocument {
    elements: Vec<XmlElement>,
}

impl XmlDocument {
    /// Parse an XML body.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(body)
            .map_err(|e| Error::parse(format!("response is not UTF-8: {}", e)))?;

        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut elements: Vec<XmlElement> = Vec::new();
        let mut open: Vec<usize> = Vec::new();

        loop {
            match reader
                .read_event()
                .map_err(|e| Error::parse(format!("malformed XML: {}", e)))?
            {
                Event::Start(start) => {
                    elements.push(element(&start)?);
                    open.push(elements.len() - 1);
                }
                Event::Empty(start) => elements.push(element(&start)?),
                Event::Text(text) => {
                    if let Some(&idx) = open.last() {
                        let text = text
                            .unescape()
                            .map_err(|e| Error::parse(format!("bad XML text: {}", e)))?;
                        elements[idx].text.push_str(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some(&idx) = open.last() {
                        elements[idx]
                            .text
                            .push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::End(_) => {
                    open.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if elements.is_empty() {
            return Err(Error::parse("response contains no XML elements"));
        }

        Ok(Self { elements })
    }

    /// First element with the given tag.
    pub fn first(&self, tag: &str) -> Option<&XmlElement> {
        self.elements.iter().find(|e| e.name == tag)
    }

    /// All elements with the given tag, in document order.
    pub fn all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.elements.iter().filter(move |e| e.name == tag)
    }

    /// Direct text of the first element with the given tag.
    pub fn text(&self, tag: &str) -> Result<String> {
        self.first(tag)
            .map(|e| e.text.clone())
            .ok_or_else(|| Error::parse(format!("{} element is not present in the response", tag)))
    }

    /// Text of the first element with the given tag, as a count.
    pub fn count(&self, tag: &str) -> Result<u64> {
        let text = self.text(tag)?;
        text.trim()
            .parse()
            .map_err(|_| Error::parse(format!("{} is not a number: '{}'", tag, text.trim())))
    }
}

fn element(start: &BytesStart<'_>) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::parse(format!("bad XML attribute: {}", e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::parse(format!("bad XML attribute value: {}", e)))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        name,
        attributes,
        text: String::new(),
    })
}

/// Column values echoed by `ADDROW`; empty values become `None`.
pub fn parse_add_row(body: &[u8]) -> Result<HashMap<String, Option<String>>> {
    let doc = XmlDocument::parse(body)?;
    let row = doc
        .all("column")
        .map(|column| {
            let name = column.attribute("name").unwrap_or_default().to_string();
            let value = column.text.trim();
            (name, (!value.is_empty()).then(|| value.to_string()))
        })
        .collect();
    Ok(row)
}

/// The `response.result` member of a v1 JSON response.
pub fn v1_result(body: &[u8]) -> Result<Value> {
    let mut value: Value = serde_json::from_slice(body)?;
    match value.get_mut("response").and_then(|r| r.get_mut("result")) {
        Some(result) => Ok(result.take()),
        None => Err(Error::parse("response.result is not present in the response")),
    }
}

/// The `data` member of a v2 JSON response. Empty bodies yield `null`.
pub fn v2_data(body: &[u8]) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    let mut value: Value = serde_json::from_slice(body)?;
    Ok(value.get_mut("data").map(Value::take).unwrap_or(Value::Null))
}

/// Read a count that Zoho may send as a number or a numeric string.
pub fn json_count(value: &Value, key: &str) -> Result<u64> {
    match &value[key] {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| Error::parse(format!("{} is not present in the response", key)))
}

/// Read a value that Zoho may send as a string or a number.
pub fn json_string(value: &Value, key: &str) -> Result<String> {
    match &value[key] {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
    .ok_or_else(|| Error::parse(format!("{} is not present in the response", key)))
}

/// Read a flag that Zoho may send as a boolean or as `"true"`/`"false"`.
pub fn json_bool(value: &Value, key: &str) -> Result<bool> {
    match &value[key] {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| Error::parse(format!("{} is not present in the response", key)))
}

/// Outcome of a successful call, shaped by its action tag.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    /// Nothing to return.
    None,
    /// Column values of an added row.
    Row(HashMap<String, Option<String>>),
    /// A single text value.
    Text(String),
    /// A row count.
    Count(u64),
    /// A boolean answer.
    Bool(bool),
    /// View and workspace ids.
    Info(ObjectInfo),
    /// Import summary.
    Import(ImportResult),
    /// Plan details.
    Plan(PlanInfo),
    /// Sharing details.
    Share(ShareInfo),
    /// A JSON result.
    Json(Value),
    /// Export written to the caller's sink.
    Exported { bytes: usize },
    /// Export body returned in memory.
    Body(bytes::Bytes),
}

macro_rules! into_variant {
    ($name:ident, $variant:ident, $ty:ty) => {
        #[doc = concat!("Unwrap an [`ActionResult::", stringify!($variant), "`].")]
        pub fn $name(self) -> Result<$ty> {
            match self {
                ActionResult::$variant(value) => Ok(value),
                other => Err(Error::parse(format!(
                    "expected {} result, got {:?}",
                    stringify!($variant),
                    other.kind()
                ))),
            }
        }
    };
}

impl ActionResult {
    into_variant!(into_row, Row, HashMap<String, Option<String>>);
    into_variant!(into_text, Text, String);
    into_variant!(into_count, Count, u64);
    into_variant!(into_bool, Bool, bool);
    into_variant!(into_info, Info, ObjectInfo);
    into_variant!(into_import, Import, ImportResult);
    into_variant!(into_plan, Plan, PlanInfo);
    into_variant!(into_share, Share, ShareInfo);
    into_variant!(into_json, Json, Value);
    into_variant!(into_body, Body, bytes::Bytes);

    fn kind(&self) -> &'static str {
        match self {
            ActionResult::None => "None",
            ActionResult::Row(_) => "Row",
            ActionResult::Text(_) => "Text",
            ActionResult::Count(_) => "Count",
            ActionResult::Bool(_) => "Bool",
            ActionResult::Info(_) => "Info",
            ActionResult::Import(_) => "Import",
            ActionResult::Plan(_) => "Plan",
            ActionResult::Share(_) => "Share",
            ActionResult::Json(_) => "Json",
            ActionResult::Exported { .. } => "Exported",
            ActionResult::Body(_) => "Body",
        }
    }
}

/// Parse a successful response body for the given action.
///
/// Export bodies are written to `sink` when one is supplied and returned
/// in memory otherwise.
pub fn parse_response(
    action: Action,
    body: &bytes::Bytes,
    sink: Option<&mut (dyn Write + Send)>,
) -> Result<ActionResult> {
    let result = match action {
        Action::AddRow => ActionResult::Row(parse_add_row(body)?),
        Action::Update => ActionResult::Count(json_count(&v1_result(body)?, "updatedRows")?),
        Action::Delete => ActionResult::Count(json_count(&v1_result(body)?, "deletedrows")?),
        Action::Import => ActionResult::Import(ImportResult::from_xml(body)?),
        Action::Export => match sink {
            Some(sink) => {
                sink.write_all(body)?;
                sink.flush()?;
                ActionResult::Exported { bytes: body.len() }
            }
            None => ActionResult::Body(body.clone()),
        },
        Action::CopyDatabase => ActionResult::Text(json_string(&v1_result(body)?, "dbid")?),
        Action::IsDbExist => ActionResult::Bool(json_bool(&v1_result(body)?, "isdbexist")?),
        Action::CreateTable
        | Action::HideColumn
        | Action::ShowColumn
        | Action::DatabaseMetadata
        | Action::GetUsers
        | Action::AutoGenReports
        | Action::CreateSimilarViews
        | Action::EnableDomainDb
        | Action::DisableDomainDb => ActionResult::Json(v1_result(body)?),
        Action::GetShareInfo => ActionResult::Share(ShareInfo::from_result(&v1_result(body)?)?),
        Action::GetDatabaseName => ActionResult::Text(XmlDocument::parse(body)?.text("dbname")?),
        Action::GetCopyDbKey => ActionResult::Text(XmlDocument::parse(body)?.text("copydbkey")?),
        Action::GetViewName => ActionResult::Text(XmlDocument::parse(body)?.text("viewname")?),
        Action::GetViewUrl => ActionResult::Text(XmlDocument::parse(body)?.text("viewurl")?),
        Action::GetEmbedUrl => ActionResult::Text(XmlDocument::parse(body)?.text("embedurl")?),
        Action::GetInfo => {
            let doc = XmlDocument::parse(body)?;
            ActionResult::Info(ObjectInfo {
                objid: doc.text("objid")?,
                dbid: doc.text("dbid")?,
            })
        }
        Action::GetUserPlanDetails => ActionResult::Plan(PlanInfo::from_xml(body)?),
        Action::V2 => ActionResult::Json(v2_data(body)?),
        Action::DeleteDatabase
        | Action::AddColumn
        | Action::DeleteColumn
        | Action::RenameColumn
        | Action::AddLookup
        | Action::RemoveLookup
        | Action::RenameView
        | Action::AddUser
        | Action::RemoveUser
        | Action::ActivateUser
        | Action::DeactivateUser
        | Action::Share
        | Action::RemoveShare
        | Action::AddDbOwner
        | Action::RemoveDbOwner
        | Action::CopyReports
        | Action::CopyFormula => ActionResult::None,
    };
    Ok(result)
}

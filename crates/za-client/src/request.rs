//! HTTP request building with Zoho-specific authorization.

use bytes::Bytes;
use serde::Serialize;
use std::time::Duration;

use crate::error::Result;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl RequestMethod {
    /// Convert to reqwest::Method.
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Put => reqwest::Method::PUT,
            RequestMethod::Delete => reqwest::Method::DELETE,
        }
    }

    /// The verb as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Delete => "DELETE",
        }
    }
}

/// How a request is authorized.
///
/// Token values are redacted in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub enum Authorization {
    /// `Authorization: Zoho-oauthtoken <token>` header.
    OAuth(String),
    /// Legacy `authtoken=<token>` query parameter.
    AuthToken(String),
}

impl std::fmt::Debug for Authorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Authorization::OAuth(_) => f.write_str("OAuth([REDACTED])"),
            Authorization::AuthToken(_) => f.write_str("AuthToken([REDACTED])"),
        }
    }
}

/// A file attached to a multipart request.
#[derive(Debug, Clone)]
pub struct MultipartFile {
    /// Form field name (Zoho expects `FILE`).
    pub field: String,
    /// File name reported to the server.
    pub file_name: String,
    /// File contents.
    pub content: Bytes,
    /// MIME type, if known.
    pub mime: Option<String>,
}

impl MultipartFile {
    /// Create a new attachment under the given field name.
    pub fn new(
        field: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            content: content.into(),
            mime: None,
        }
    }

    /// Set the MIME type.
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// Request body content.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
    Text(String),
    Bytes(Bytes),
    /// URL-encoded form fields, in order.
    Form(Vec<(String, String)>),
    /// Multipart upload with optional extra text fields.
    Multipart {
        fields: Vec<(String, String)>,
        file: MultipartFile,
    },
}

impl RequestBody {
    /// A short textual rendering of the payload for error reports.
    ///
    /// Binary and multipart content is summarized rather than rendered.
    pub fn describe(&self) -> String {
        match self {
            RequestBody::Json(value) => value.to_string(),
            RequestBody::Text(text) => text.clone(),
            RequestBody::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
            RequestBody::Form(fields) => serde_urlencoded::to_string(fields).unwrap_or_default(),
            RequestBody::Multipart { file, .. } => format!(
                "<multipart {} '{}': {} bytes>",
                file.field,
                file.file_name,
                file.content.len()
            ),
        }
    }
}

/// Builder for HTTP requests.
///
/// Builders are cheap to clone so the same request can be re-issued on retry.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub(crate) method: RequestMethod,
    pub(crate) url: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) query_params: Vec<(String, String)>,
    pub(crate) body: Option<RequestBody>,
    pub(crate) authorization: Option<Authorization>,
    pub(crate) timeout: Option<Duration>,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: RequestMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query_params: Vec::new(),
            body: None,
            authorization: None,
            timeout: None,
        }
    }

    /// The request method.
    pub fn method(&self) -> RequestMethod {
        self.method
    }

    /// The request URL without the query parameters added by the builder.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Query parameters, in insertion order.
    pub fn query_params(&self) -> &[(String, String)] {
        &self.query_params
    }

    /// The request body, if any.
    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Look up a header set on this builder (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Authorize with an OAuth access token.
    pub fn oauth_token(mut self, token: impl Into<String>) -> Self {
        self.authorization = Some(Authorization::OAuth(token.into()));
        self
    }

    /// Authorize with a legacy authtoken.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.authorization = Some(Authorization::AuthToken(token.into()));
        self
    }

    /// Replace the authorization for this request.
    pub fn authorization(mut self, authorization: Authorization) -> Self {
        self.authorization = Some(authorization);
        self
    }

    /// Add a header, replacing an existing one with the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Add a query parameter. Repeated names are kept.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((name.into(), value.into()));
        self
    }

    /// Add several query parameters.
    pub fn query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query_params
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Override the client timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set JSON body.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)?;
        self.body = Some(RequestBody::Json(value));
        Ok(self.header("Content-Type", "application/json"))
    }

    /// Set text body.
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self.header("Content-Type", "text/plain")
    }

    /// Set bytes body.
    pub fn bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(RequestBody::Bytes(body.into()));
        self
    }

    /// Set form body.
    pub fn form<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.body = Some(RequestBody::Form(fields));
        self.header("Content-Type", "application/x-www-form-urlencoded")
    }

    /// Attach a file as a multipart body.
    pub fn multipart(mut self, fields: Vec<(String, String)>, file: MultipartFile) -> Self {
        self.body = Some(RequestBody::Multipart { fields, file });
        self
    }

    /// The full URL including builder query parameters and a legacy authtoken.
    pub fn full_url(&self) -> Result<url::Url> {
        let mut url = url::Url::parse(&self.url)?;
        let needs_pairs = !self.query_params.is_empty()
            || matches!(self.authorization, Some(Authorization::AuthToken(_)));
        if needs_pairs {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.query_params {
                pairs.append_pair(name, value);
            }
            if let Some(Authorization::AuthToken(token)) = &self.authorization {
                pairs.append_pair("authtoken", token);
            }
        }
        Ok(url)
    }
}

//! Request descriptors and v1 URI helpers.

use zoho_analytics_client::security::{log, url};
use zoho_analytics_client::{RequestBuilder, RequestMethod};

use crate::action::{Action, OutputFormat};

/// `ZOHO_API_VERSION` sent with every v1 call.
pub const API_VERSION: &str = "1.0";

/// A request plus the action tag that selects its response parser.
///
/// The authorization is attached by the dispatcher on every attempt.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    action: Action,
    http: RequestBuilder,
}

impl ApiRequest {
    /// Wrap a prepared HTTP request.
    pub fn new(action: Action, http: RequestBuilder) -> Self {
        Self { action, http }
    }

    /// A v1 POST request to `uri` with the standard Zoho query parameters.
    pub fn v1(uri: impl Into<String>, action: Action, format: OutputFormat) -> Self {
        let http = RequestBuilder::new(RequestMethod::Post, uri).query_pairs([
            ("ZOHO_ERROR_FORMAT", "JSON"),
            ("ZOHO_ACTION", action.as_str()),
            ("ZOHO_OUTPUT_FORMAT", format.as_str()),
            ("ZOHO_API_VERSION", API_VERSION),
        ]);
        Self { action, http }
    }

    /// A v1 request using the action's default output format.
    pub fn v1_default(uri: impl Into<String>, action: Action) -> Self {
        Self::v1(uri, action, action.default_output_format())
    }

    /// A `/restapi/v2` request.
    pub fn v2(method: RequestMethod, url: impl Into<String>) -> Self {
        Self {
            action: Action::V2,
            http: RequestBuilder::new(method, url),
        }
    }

    /// Modify the underlying HTTP request.
    pub fn map_http(mut self, f: impl FnOnce(RequestBuilder) -> RequestBuilder) -> Self {
        self.http = f(self.http);
        self
    }

    /// Add a query parameter.
    pub fn query(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.map_http(|http| http.query(name, value))
    }

    /// The action tag.
    pub fn action(&self) -> Action {
        self.action
    }

    /// The HTTP request without authorization.
    pub fn http(&self) -> &RequestBuilder {
        &self.http
    }

    /// The payload for error reports, redacted and truncated.
    pub fn payload_summary(&self) -> String {
        let payload = self
            .http
            .body()
            .map(|body| body.describe())
            .unwrap_or_default();
        log::sanitize(&payload)
    }
}

/// URI of a user's account: `{server}/api/{owner}`.
pub fn user_uri(server: &str, owner: &str) -> String {
    format!(
        "{}/api/{}",
        server.trim_end_matches('/'),
        url::encode_segment(owner)
    )
}

/// URI of a workspace.
pub fn db_uri(server: &str, owner: &str, workspace: &str) -> String {
    format!("{}/{}", user_uri(server, owner), url::encode_name(workspace))
}

/// URI of a table or report.
pub fn table_uri(server: &str, owner: &str, workspace: &str, view: &str) -> String {
    format!(
        "{}/{}",
        db_uri(server, owner, workspace),
        url::encode_name(view)
    )
}

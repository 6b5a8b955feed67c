//! Security utilities for Zoho Analytics API operations.
//!
//! ## URL Segment Encoding
//!
//! Workspace, table and owner names are user-provided and MUST be encoded
//! before they become path segments:
//!
//! ```rust
//! use zoho_analytics_client::security::url;
//!
//! let segment = url::encode_name("Sales/2024");
//! assert_eq!(segment, "Sales(/)2024");
//! ```
//!
//! ## Log Sanitizing
//!
//! Error bodies and payloads can be large and may echo credentials back.
//! Anything that ends up in an error message or a log line should go
//! through [`log::sanitize`].

/// URL encoding utilities for path segments.
pub mod url {
    /// Percent-encode a path segment, leaving `/` intact.
    ///
    /// # Example
    ///
    /// ```rust
    /// use zoho_analytics_client::security::url;
    ///
    /// assert_eq!(url::encode_segment("user@example.com"), "user%40example.com");
    /// assert_eq!(url::encode_segment("a b"), "a%20b");
    /// ```
    #[must_use]
    pub fn encode_segment(value: &str) -> String {
        urlencoding::encode(value).replace("%2F", "/")
    }

    /// Replace the characters Zoho treats specially inside workspace and
    /// view names: `/` becomes `(/)` and an encoded backslash becomes `(//)`.
    #[must_use]
    pub fn special_char_replace(value: &str) -> String {
        value.replace('/', "(/)").replace("%5C", "(//)")
    }

    /// Encode a workspace or view name for use as a path segment.
    ///
    /// # Example
    ///
    /// ```rust
    /// use zoho_analytics_client::security::url;
    ///
    /// assert_eq!(url::encode_name("Sales Data"), "Sales%20Data");
    /// assert_eq!(url::encode_name("a\\b"), "a(//)b");
    /// ```
    #[must_use]
    pub fn encode_name(value: &str) -> String {
        special_char_replace(&encode_segment(value))
    }
}

/// Sanitizing helpers for log lines and error messages.
pub mod log {
    use regex_lite::Regex;
    use std::sync::LazyLock;

    /// Maximum length of a payload or body embedded in an error.
    pub const MAX_LENGTH: usize = 500;

    static OAUTH_TOKEN: LazyLock<Option<Regex>> =
        LazyLock::new(|| Regex::new(r"1000\.[0-9a-fA-F]{16,}\.[0-9a-fA-F]{16,}").ok());
    static AUTHTOKEN_PARAM: LazyLock<Option<Regex>> =
        LazyLock::new(|| Regex::new(r"(?i)(authtoken=)[^&\s]+").ok());
    static AUTH_HEADER: LazyLock<Option<Regex>> =
        LazyLock::new(|| Regex::new(r"(Zoho-oauthtoken\s+)\S+").ok());

    /// Truncate to at most `max` characters, marking the cut.
    #[must_use]
    pub fn truncate(value: &str, max: usize) -> String {
        match value.char_indices().nth(max) {
            Some((cut, _)) => format!("{}...[truncated]", &value[..cut]),
            None => value.to_string(),
        }
    }

    /// Redact OAuth tokens, authtoken parameters and authorization headers.
    #[must_use]
    pub fn redact_tokens(value: &str) -> String {
        let mut sanitized = value.to_string();
        if let Some(re) = OAUTH_TOKEN.as_ref() {
            sanitized = re.replace_all(&sanitized, "[REDACTED_TOKEN]").into_owned();
        }
        if let Some(re) = AUTHTOKEN_PARAM.as_ref() {
            sanitized = re.replace_all(&sanitized, "${1}[REDACTED]").into_owned();
        }
        if let Some(re) = AUTH_HEADER.as_ref() {
            sanitized = re.replace_all(&sanitized, "${1}[REDACTED]").into_owned();
        }
        sanitized
    }

    /// Redact credentials, then truncate to [`MAX_LENGTH`].
    #[must_use]
    pub fn sanitize(value: &str) -> String {
        truncate(&redact_tokens(value), MAX_LENGTH)
    }
}

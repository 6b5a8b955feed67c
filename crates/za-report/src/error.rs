//! Error types for za-report.
//!
//! Every outcome of the dispatcher that a caller may want to branch on has
//! its own [`ErrorKind`] variant; vendor codes travel with the error.

/// Result type alias for za-report operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for za-report operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if waiting and retrying the call could succeed.
    pub fn is_retryable(&self) -> bool {
        match &self.kind {
            ErrorKind::RateLimited { .. } | ErrorKind::RetriesExhausted { .. } => true,
            ErrorKind::Client(_) => self
                .source
                .as_ref()
                .and_then(|s| s.downcast_ref::<zoho_analytics_client::Error>())
                .is_some_and(|e| e.is_retryable()),
            _ => false,
        }
    }

    /// Returns true for both recoverable and unrecoverable rate limits.
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::RateLimited { .. } | ErrorKind::UnrecoverableRateLimit { .. }
        )
    }

    /// The Zoho error code carried by this error, if any.
    pub fn vendor_code(&self) -> Option<i64> {
        match &self.kind {
            ErrorKind::Server { code, .. } | ErrorKind::BadData { code, .. } => *code,
            ErrorKind::RateLimited { code, .. }
            | ErrorKind::UnrecoverableRateLimit { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse(message.into()))
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput(message.into()))
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Transport error from the HTTP client.
    #[error("Client error: {0}")]
    Client(String),

    /// Token acquisition failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The call was rejected locally before any request was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Fatal server-side error: missing workspace or view, permissions,
    /// schema conflicts, SQL parse errors.
    #[error("Server error (code {code:?}, HTTP {status}): {message}")]
    Server {
        code: Option<i64>,
        status: u16,
        message: String,
    },

    /// The request data was rejected and resending it will not help.
    #[error("Bad data (code {code:?}): {message}")]
    BadData { code: Option<i64>, message: String },

    /// Short-term rate limit; retrying later may succeed.
    #[error("Rate limited (code {code}): {message}")]
    RateLimited { code: i64, message: String },

    /// Row allowance or daily quota exhausted.
    #[error("Unrecoverable rate limit (code {code}): {message}")]
    UnrecoverableRateLimit { code: i64, message: String },

    /// The retry budget ran out.
    #[error("Retries exhausted after {attempts} attempts, last: {last}, payload: {payload}")]
    RetriesExhausted {
        attempts: u32,
        last: String,
        payload: String,
    },

    /// The response did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Writing exported data failed.
    #[error("IO error: {0}")]
    Io(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<zoho_analytics_client::Error> for Error {
    fn from(err: zoho_analytics_client::Error) -> Self {
        Error::with_source(ErrorKind::Client(err.to_string()), err)
    }
}

impl From<zoho_analytics_auth::Error> for Error {
    fn from(err: zoho_analytics_auth::Error) -> Self {
        Error::with_source(ErrorKind::Auth(err.to_string()), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::with_source(ErrorKind::Io(err.to_string()), err)
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::with_source(ErrorKind::Parse(err.to_string()), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_code() {
        let err = Error::new(ErrorKind::UnrecoverableRateLimit {
            code: 6043,
            message: "daily limit".to_string(),
        });
        assert_eq!(err.vendor_code(), Some(6043));
        assert!(err.is_rate_limited());
        assert!(!err.is_retryable());

        let err = Error::new(ErrorKind::RateLimited {
            code: 6045,
            message: "slow down".to_string(),
        });
        assert!(err.is_rate_limited());
        assert!(err.is_retryable());

        assert_eq!(Error::parse("x").vendor_code(), None);
    }

    #[test]
    fn test_exhausted_display_embeds_attempts() {
        let err = Error::new(ErrorKind::RetriesExhausted {
            attempts: 4,
            last: "HTTP 502".to_string(),
            payload: "ZOHO_CRITERIA=...".to_string(),
        });
        assert!(err.to_string().contains("after 4 attempts"));
        assert!(err.to_string().contains("HTTP 502"));
    }

    #[test]
    fn test_client_error_retryable_follows_source() {
        let timeout = zoho_analytics_client::Error::new(zoho_analytics_client::ErrorKind::Timeout);
        assert!(Error::from(timeout).is_retryable());

        let config = zoho_analytics_client::Error::new(zoho_analytics_client::ErrorKind::Config(
            "bad".to_string(),
        ));
        assert!(!Error::from(config).is_retryable());
    }
}

//! Error types for za-auth.
//!
//! Error messages are designed to avoid exposing sensitive credential data.

/// Result type alias for za-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for za-auth operations.
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

    /// Returns true for failures to reach the accounts server, which may
    /// succeed when retried.
    pub fn is_transient(&self) -> bool {
        matches!(self.kind, ErrorKind::Http(_))
    }

    /// Returns true if this error means the configured credentials are unusable.
    pub fn is_credentials_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::InvalidCredentials(_) | ErrorKind::OAuth { .. } | ErrorKind::EnvVar(_)
        )
    }
}

/// The kind of error that occurred.
///
/// Error messages avoid including credential values.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// OAuth error response from the accounts server.
    #[error("OAuth error: {error} - {description}")]
    OAuth { error: String, description: String },

    /// The token exchange succeeded at the HTTP level but carried no access token.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// HTTP error during authentication.
    #[error("HTTP error: {0}")]
    Http(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Environment variable not set.
    #[error("Environment variable not set: {0}")]
    EnvVar(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let message = zoho_analytics_client::security::log::sanitize(&err.to_string());
        Error::with_source(ErrorKind::Http(message), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<serde_urlencoded::ser::Error> for Error {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        Error::with_source(ErrorKind::Serialization(err.to_string()), err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::with_source(ErrorKind::Io(err.to_string()), err)
    }
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Error::with_source(ErrorKind::EnvVar(err.to_string()), err)
    }
}

impl From<zoho_analytics_client::Error> for Error {
    fn from(err: zoho_analytics_client::Error) -> Self {
        let message = zoho_analytics_client::security::log::sanitize(&err.to_string());
        Error::with_source(ErrorKind::Http(message), err)
    }
}

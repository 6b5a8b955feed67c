//! Error types for za-enhanced.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// The report client error behind a [`ErrorKind::Report`].
    pub fn report_error(&self) -> Option<&zoho_analytics_report::Error> {
        self.source
            .as_ref()
            .and_then(|s| s.downcast_ref::<zoho_analytics_report::Error>())
    }

    /// Returns true for both recoverable and unrecoverable rate limits.
    pub fn is_rate_limited(&self) -> bool {
        self.report_error().is_some_and(|e| e.is_rate_limited())
    }

    /// The Zoho error code carried by the underlying report error.
    pub fn vendor_code(&self) -> Option<i64> {
        self.report_error().and_then(|e| e.vendor_code())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("Report error: {0}")]
    Report(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Row count mismatch: {expected} rows matched before delete, {deleted} deleted")]
    CountMismatch { expected: u64, deleted: u64 },
    #[error("Metadata error: {0}")]
    Metadata(String),
    #[error("CSV error: {0}")]
    Csv(String),
}

impl From<zoho_analytics_report::Error> for Error {
    fn from(err: zoho_analytics_report::Error) -> Self {
        Error {
            kind: ErrorKind::Report(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error {
            kind: ErrorKind::Csv(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Metadata(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}

use crate::result::ProbeErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Timed out after {0}ms")]
    Timeout(u64),

    #[error("No element matched '{selector}' within {waited_ms}ms")]
    WaitTimeout { selector: String, waited_ms: u64 },

    #[error("Element lookup failed: {0}")]
    Lookup(String),

    #[error("Script execution failed: {0}")]
    Script(String),

    #[error("Browser error: {0}")]
    Browser(String),

}

impl ScanError {
    /// Coarse classification recorded on a failed probe.
    pub fn kind(&self) -> ProbeErrorKind {
        match self {
            ScanError::HttpError(e) if e.is_timeout() => ProbeErrorKind::Timeout,
            ScanError::HttpError(_) | ScanError::InvalidUrl(_) | ScanError::Navigation(_) => {
                ProbeErrorKind::Navigation
            }
            ScanError::Timeout(_) | ScanError::WaitTimeout { .. } => ProbeErrorKind::Timeout,
            ScanError::Lookup(_) => ProbeErrorKind::Lookup,
            ScanError::Script(_) => ProbeErrorKind::Script,
            ScanError::Browser(_) => ProbeErrorKind::Browser,
        }
    }

    /// Errors a harvester may retry on the next loop.
    pub fn is_transient(&self) -> bool {
        matches!(self, ScanError::WaitTimeout { .. } | ScanError::Lookup(_))
    }
}

impl From<chromiumoxide::error::CdpError> for ScanError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        ScanError::Browser(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

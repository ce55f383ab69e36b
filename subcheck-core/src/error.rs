use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubcheckError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Selected domain not found in requirements list: {0}")]
    UnknownDomain(String),

    #[error("Missing zip file or domain selection.")]
    MissingUploadOrDomain,

    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    #[error("Could not read file {}. Reason: {reason}", path.display())]
    UnreadableDocument { path: PathBuf, reason: String },

    #[error("Search API key or search engine ID is not configured.")]
    SearchConfigMissing,

    #[error("Search API daily quota exceeded. Please try again tomorrow.")]
    SearchQuotaExceeded,

    #[error("Search request failed: {0}")]
    Search(String),
}

impl SubcheckError {
    /// Errors caused by the caller's input rather than by the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SubcheckError::UnknownDomain(_)
                | SubcheckError::MissingUploadOrDomain
                | SubcheckError::CorruptArchive(_)
        )
    }

    /// Quota exhaustion, either classified by the client or reported only in the message.
    pub fn is_quota_exhausted(&self) -> bool {
        match self {
            SubcheckError::SearchQuotaExceeded => true,
            other => other.to_string().to_lowercase().contains("quota"),
        }
    }
}

impl From<zip::result::ZipError> for SubcheckError {
    fn from(e: zip::result::ZipError) -> Self {
        // Reads come from an in-memory buffer, so a zip-level I/O error is a truncated archive.
        SubcheckError::CorruptArchive(e.to_string())
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, SubcheckError>;

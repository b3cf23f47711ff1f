use std::path::PathBuf;
use thiserror::Error;

/// Failures of the document collaborator
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to open PDF {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("Failed to read page {page}: {reason}")]
    Page { page: u32, reason: String },

    #[error("Failed to add annotation on page {page}: {reason}")]
    Annotate { page: u32, reason: String },

    #[error("Failed to write PDF {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

/// Failures of the highlight engine
#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("No search terms given")]
    NoTerms,

    #[error("Reading document failed: {0}")]
    Read(#[source] DocumentError),

    #[error("Writing document failed: {0}")]
    Write(#[source] DocumentError),
}

impl DocumentError {
    pub(crate) fn open(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DocumentError::Open {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DocumentError::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(self, DocumentError::Write { .. })
    }
}

impl From<DocumentError> for HighlightError {
    fn from(err: DocumentError) -> Self {
        if err.is_write() {
            HighlightError::Write(err)
        } else {
            HighlightError::Read(err)
        }
    }
}

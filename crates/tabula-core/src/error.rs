//! Error types for table extraction.

use std::fmt;

/// Fatal error kinds surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The input path does not exist.
    FileNotFound(String),
    /// Extraction options violate a validation rule.
    InvalidOptions(String),
    /// The PDF bytes are malformed at the byte layer.
    InvalidPdf(String),
    /// The document is encrypted and no (or a wrong) password was given.
    PasswordRequired,
    /// A programming-contract violation: page number out of range,
    /// malformed internal call.
    Argument(String),
}

impl ExtractError {
    /// Annotate the error with the 1-based page number it occurred on.
    pub fn on_page(self, page: usize) -> Self {
        match self {
            ExtractError::InvalidPdf(msg) => {
                ExtractError::InvalidPdf(format!("page {page}: {msg}"))
            }
            ExtractError::Argument(msg) => ExtractError::Argument(format!("page {page}: {msg}")),
            other => other,
        }
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::FileNotFound(path) => write!(f, "file not found: {path}"),
            ExtractError::InvalidOptions(msg) => write!(f, "invalid options: {msg}"),
            ExtractError::InvalidPdf(msg) => write!(f, "invalid PDF: {msg}"),
            ExtractError::PasswordRequired => {
                write!(f, "PDF is encrypted and requires a valid password")
            }
            ExtractError::Argument(msg) => write!(f, "argument error: {msg}"),
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<std::io::Error> for ExtractError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ExtractError::FileNotFound(err.to_string()),
            _ => ExtractError::InvalidPdf(err.to_string()),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ExtractError>;

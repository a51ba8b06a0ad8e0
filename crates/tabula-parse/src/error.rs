//! Error types for the parsing layer.
//!
//! Uses [`thiserror`] for ergonomic derivation and converts losslessly
//! into the core [`ExtractError`] kinds.

use tabula_core::ExtractError;
use thiserror::Error;

/// Error type for PDF backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Error reading PDF data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is encrypted and the password is missing or wrong.
    #[error("password required")]
    PasswordRequired,

    /// A malformed internal call (page index out of range and similar).
    #[error("argument error: {0}")]
    Argument(String),
}

impl From<BackendError> for ExtractError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => ExtractError::InvalidPdf(msg),
            BackendError::Io(e) => e.into(),
            BackendError::PasswordRequired => ExtractError::PasswordRequired,
            BackendError::Argument(msg) => ExtractError::Argument(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_maps_to_invalid_pdf() {
        let err: ExtractError = BackendError::Parse("bad xref".into()).into();
        assert_eq!(err, ExtractError::InvalidPdf("bad xref".into()));
    }

    #[test]
    fn io_not_found_maps_to_file_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "nope");
        let err: ExtractError = BackendError::Io(io).into();
        assert!(matches!(err, ExtractError::FileNotFound(_)));
    }

    #[test]
    fn password_maps_through() {
        let err: ExtractError = BackendError::PasswordRequired.into();
        assert_eq!(err, ExtractError::PasswordRequired);
    }

    #[test]
    fn argument_maps_through() {
        let err: ExtractError = BackendError::Argument("page 9 out of range".into()).into();
        assert!(matches!(err, ExtractError::Argument(_)));
    }
}

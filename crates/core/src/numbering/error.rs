//! Error types for document numbering.

use saldo_shared::types::CompanyId;
use thiserror::Error;

use crate::error::ErrorKind;

/// Errors that can occur during number allocation and scheme management.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NumberingError {
    // ========== Configuration Errors ==========
    /// Padding width outside the allowed 1 to 10 range.
    #[error("Padding must be between 1 and 10, got {0}")]
    InvalidPadding(u32),

    /// Counter value below 1.
    #[error("Counter must be at least 1, got {0}")]
    InvalidCounter(i64),

    /// Scheme created with a blank document type.
    #[error("Document type must not be empty")]
    EmptyDocumentType,

    // ========== Resolution Errors ==========
    /// No active scheme for the requested scope.
    #[error("No active numbering scheme for document type {document_type} (company {company_id:?})")]
    SchemeNotFound {
        /// The requested document type.
        document_type: String,
        /// The company sub-scope, if any.
        company_id: Option<CompanyId>,
    },
}

impl NumberingError {
    /// Returns a stable machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPadding(_) => "INVALID_PADDING",
            Self::InvalidCounter(_) => "INVALID_COUNTER",
            Self::EmptyDocumentType => "EMPTY_DOCUMENT_TYPE",
            Self::SchemeNotFound { .. } => "SCHEME_NOT_FOUND",
        }
    }

    /// Returns the error category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SchemeNotFound { .. } => ErrorKind::NotFound,
            _ => ErrorKind::Validation,
        }
    }

    /// Returns true if the operation can be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// Validates the configuration of a new scheme.
///
/// # Errors
///
/// Returns [`NumberingError::EmptyDocumentType`],
/// [`NumberingError::InvalidPadding`] or [`NumberingError::InvalidCounter`].
pub fn validate_scheme_config(
    document_type: &str,
    padding: u32,
    next_number: i64,
) -> Result<(), NumberingError> {
    if document_type.trim().is_empty() {
        return Err(NumberingError::EmptyDocumentType);
    }
    if !(super::types::MIN_PADDING..=super::types::MAX_PADDING).contains(&padding) {
        return Err(NumberingError::InvalidPadding(padding));
    }
    if next_number < 1 {
        return Err(NumberingError::InvalidCounter(next_number));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            NumberingError::InvalidPadding(0).error_code(),
            "INVALID_PADDING"
        );
        assert_eq!(
            NumberingError::SchemeNotFound {
                document_type: "journal".to_string(),
                company_id: None,
            }
            .error_code(),
            "SCHEME_NOT_FOUND"
        );
    }

    #[test]
    fn test_scheme_not_found_is_not_found_kind() {
        let err = NumberingError::SchemeNotFound {
            document_type: "journal".to_string(),
            company_id: Some(CompanyId::new()),
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_config_validation() {
        assert!(validate_scheme_config("journal", 6, 1).is_ok());
        assert_eq!(
            validate_scheme_config("", 6, 1),
            Err(NumberingError::EmptyDocumentType)
        );
        assert_eq!(
            validate_scheme_config("  ", 6, 1),
            Err(NumberingError::EmptyDocumentType)
        );
        assert_eq!(
            validate_scheme_config("journal", 0, 1),
            Err(NumberingError::InvalidPadding(0))
        );
        assert_eq!(
            validate_scheme_config("journal", 6, 0),
            Err(NumberingError::InvalidCounter(0))
        );
    }
}

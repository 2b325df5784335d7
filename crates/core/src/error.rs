//! Error classification shared by the domain error types.
//!
//! Every domain error maps onto one of these kinds so that callers can make
//! a retry/abort decision without matching on individual variants:
//! validation and integrity failures must never be retried, contention
//! failures should be retried with backoff, and not-found failures let the
//! caller offer a "create one" flow instead of a generic error.

use serde::{Deserialize, Serialize};

/// Coarse classification of a domain error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input failed a business rule; nothing was committed.
    Validation,
    /// A referenced object does not exist.
    NotFound,
    /// Transient lock/serialization conflict; safe to retry with backoff.
    Contention,
    /// A constraint that should never fire did; logical bug or race loser.
    Integrity,
    /// Infrastructure failure (database, IO).
    Internal,
}

impl ErrorKind {
    /// Returns true if an operation failing with this kind may be retried.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Contention)
    }

    /// Stable string form for logs and API payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Contention => "contention",
            Self::Integrity => "integrity",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_contention_is_retryable() {
        assert!(ErrorKind::Contention.is_retryable());
        assert!(!ErrorKind::Validation.is_retryable());
        assert!(!ErrorKind::NotFound.is_retryable());
        assert!(!ErrorKind::Integrity.is_retryable());
        assert!(!ErrorKind::Internal.is_retryable());
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
        assert_eq!(ErrorKind::Contention.as_str(), "contention");
    }
}

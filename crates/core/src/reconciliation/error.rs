//! Error types for bank reconciliation.

use rust_decimal::Decimal;
use saldo_shared::types::{
    AccountId, BankStatementId, ReconciliationId, StatementLineId,
};
use thiserror::Error;

use crate::error::ErrorKind;

/// Errors that can occur during statement import and reconciliation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconciliationError {
    // ========== Import Errors ==========
    /// Statement has no lines.
    #[error("Statement must have at least one line")]
    EmptyStatement,

    /// Statement totals do not add up.
    #[error(
        "Statement does not balance: declared closing {declared}, opening plus lines gives {computed}"
    )]
    StatementImbalance {
        /// The closing balance the caller declared.
        declared: Decimal,
        /// Opening balance plus the sum of line amounts.
        computed: Decimal,
    },

    /// Statement period is inverted.
    #[error("Statement period start {start} is after end {end}")]
    InvalidPeriod {
        /// Declared period start.
        start: chrono::NaiveDate,
        /// Declared period end.
        end: chrono::NaiveDate,
    },

    /// Target account is not a bank account.
    #[error("Account {0} is not flagged as a bank account")]
    NotABankAccount(AccountId),

    // ========== Matching Errors ==========
    /// Line already carries a match link.
    #[error("Statement line {0} is already matched")]
    LineAlreadyMatched(StatementLineId),

    /// Line does not belong to the given statement.
    #[error("Line {line_id} does not belong to statement {statement_id}")]
    LineNotInStatement {
        /// The offending line.
        line_id: StatementLineId,
        /// The statement the caller named.
        statement_id: BankStatementId,
    },

    /// Line amount is not negative, so it cannot be a bank charge.
    #[error("Statement line {0} is not a charge (amount must be negative)")]
    NotACharge(StatementLineId),

    // ========== Reconciliation Errors ==========
    /// Statement does not exist.
    #[error("Bank statement {0} not found")]
    StatementNotFound(BankStatementId),

    /// Reconciliation does not exist.
    #[error("Reconciliation {0} not found")]
    ReconciliationNotFound(ReconciliationId),

    /// Completed reconciliations are frozen.
    #[error("Reconciliation {0} is already completed")]
    AlreadyCompleted(ReconciliationId),

    /// Completion requires a zero difference.
    #[error("Reconciliation cannot complete with unexplained difference {0}")]
    UnresolvedDifference(Decimal),
}

impl ReconciliationError {
    /// Returns a stable machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyStatement => "EMPTY_STATEMENT",
            Self::StatementImbalance { .. } => "STATEMENT_IMBALANCE",
            Self::InvalidPeriod { .. } => "INVALID_PERIOD",
            Self::NotABankAccount(_) => "NOT_A_BANK_ACCOUNT",
            Self::LineAlreadyMatched(_) => "LINE_ALREADY_MATCHED",
            Self::LineNotInStatement { .. } => "LINE_NOT_IN_STATEMENT",
            Self::NotACharge(_) => "NOT_A_CHARGE",
            Self::StatementNotFound(_) => "STATEMENT_NOT_FOUND",
            Self::ReconciliationNotFound(_) => "RECONCILIATION_NOT_FOUND",
            Self::AlreadyCompleted(_) => "ALREADY_COMPLETED",
            Self::UnresolvedDifference(_) => "UNRESOLVED_DIFFERENCE",
        }
    }

    /// Returns the error category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StatementNotFound(_) | Self::ReconciliationNotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::Validation,
        }
    }

    /// Returns true if the operation can be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

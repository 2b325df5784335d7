//! Error types for ledger operations.

use rust_decimal::Decimal;
use saldo_shared::types::{AccountId, VoucherId};
use thiserror::Error;

use crate::error::ErrorKind;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    // ========== Entry Shape Errors ==========
    /// Voucher has fewer than 2 entries.
    #[error("Voucher must have at least 2 entries, got {0}")]
    InsufficientEntries(usize),

    /// Entry has neither a debit nor a credit amount.
    #[error("Entry {index} must have either a debit or a credit amount")]
    EmptyEntry {
        /// Zero-based position of the offending entry.
        index: usize,
    },

    /// Entry has both a debit and a credit amount.
    #[error("Entry {index} cannot have both a debit and a credit amount")]
    BothSidesSet {
        /// Zero-based position of the offending entry.
        index: usize,
    },

    /// Entry has a negative amount.
    #[error("Entry {index} has a negative amount")]
    NegativeAmount {
        /// Zero-based position of the offending entry.
        index: usize,
    },

    /// Voucher debits and credits do not balance.
    #[error("Voucher is not balanced: debits {debit} != credits {credit}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    // ========== Account Errors ==========
    /// Account does not exist.
    #[error("Account {0} not found")]
    AccountNotFound(AccountId),

    /// Account is deactivated.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),

    /// Account is a group node and cannot receive postings.
    #[error("Account {0} is a group account and cannot receive postings")]
    AccountIsGroup(AccountId),

    /// Account belongs to a different company than the voucher.
    #[error("Account {0} belongs to a different company")]
    AccountCompanyMismatch(AccountId),

    /// Account currency differs from the voucher currency.
    #[error(
        "Account {account_id} uses currency {account_currency}, voucher uses {voucher_currency}"
    )]
    CurrencyMismatch {
        /// The offending account.
        account_id: AccountId,
        /// The account's currency code.
        account_currency: String,
        /// The voucher's currency code.
        voucher_currency: String,
    },

    /// Parent account is not a group account.
    #[error("Parent account {0} is not a group account")]
    ParentNotGroup(AccountId),

    /// Re-parenting would make the account its own ancestor.
    #[error("Account {0} cannot be its own ancestor")]
    ParentCycle(AccountId),

    /// Account type cannot change once entries exist.
    #[error("Account {0} has posted entries, its type cannot change")]
    TypeFrozen(AccountId),

    // ========== Voucher State Errors ==========
    /// Voucher does not exist.
    #[error("Voucher {0} not found")]
    VoucherNotFound(VoucherId),

    /// Voucher is already posted.
    #[error("Voucher {0} is already posted")]
    AlreadyPosted(VoucherId),

    /// Voucher is already cancelled.
    #[error("Voucher {0} is already cancelled")]
    AlreadyCancelled(VoucherId),

    /// Posted vouchers are immutable.
    #[error("Voucher {0} is posted and cannot be modified")]
    CannotModifyPosted(VoucherId),

    /// Cancelled vouchers are immutable.
    #[error("Voucher {0} is cancelled and cannot be modified")]
    CannotModifyCancelled(VoucherId),

    /// Only posted vouchers can be reversed.
    #[error("Voucher {0} is not posted and cannot be reversed")]
    NotPosted(VoucherId),

    /// Voucher already has a reversal.
    #[error("Voucher {0} has already been reversed")]
    AlreadyReversed(VoucherId),
}

impl LedgerError {
    /// Returns a stable machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientEntries(_) => "INSUFFICIENT_ENTRIES",
            Self::EmptyEntry { .. } => "EMPTY_ENTRY",
            Self::BothSidesSet { .. } => "BOTH_SIDES_SET",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::Unbalanced { .. } => "UNBALANCED_VOUCHER",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::AccountIsGroup(_) => "ACCOUNT_IS_GROUP",
            Self::AccountCompanyMismatch(_) => "ACCOUNT_COMPANY_MISMATCH",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::ParentNotGroup(_) => "PARENT_NOT_GROUP",
            Self::ParentCycle(_) => "PARENT_CYCLE",
            Self::TypeFrozen(_) => "ACCOUNT_TYPE_FROZEN",
            Self::VoucherNotFound(_) => "VOUCHER_NOT_FOUND",
            Self::AlreadyPosted(_) => "ALREADY_POSTED",
            Self::AlreadyCancelled(_) => "ALREADY_CANCELLED",
            Self::CannotModifyPosted(_) => "CANNOT_MODIFY_POSTED",
            Self::CannotModifyCancelled(_) => "CANNOT_MODIFY_CANCELLED",
            Self::NotPosted(_) => "NOT_POSTED",
            Self::AlreadyReversed(_) => "ALREADY_REVERSED",
        }
    }

    /// Returns the error category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountNotFound(_) | Self::VoucherNotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::Validation,
        }
    }

    /// Returns true if the operation can be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

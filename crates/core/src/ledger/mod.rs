//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Voucher and entry domain types
//! - Account sign conventions and balance calculations
//! - Entry-shape and balance validation
//! - Voucher lifecycle rules (draft, posted, cancelled)
//! - Reversal construction for posted vouchers
//! - Error types for ledger operations

pub mod account;
pub mod error;
pub mod reversal;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use account::{AccountType, NormalBalance, RunningBalance};
pub use error::LedgerError;
pub use reversal::ReversalService;
pub use service::{AccountInfo, LedgerService};
pub use types::{
    CreateVoucherInput, EntryType, VoucherEntryInput, VoucherStatus, VoucherTotals, VoucherType,
};

//! Bank reconciliation: statement validation, entry matching, charges.
//!
//! Pure matching and validation logic. The repository layer feeds it
//! statement lines and candidate ledger entries, and persists the match
//! links it decides on.

pub mod charges;
pub mod error;
pub mod matching;
pub mod statement;
pub mod types;

#[cfg(test)]
mod matching_props;

pub use charges::{build_charge_voucher, validate_charge_line, ChargeLine};
pub use error::ReconciliationError;
pub use matching::select_candidates;
pub use statement::{running_balances, validate_statement};
pub use types::{
    CandidateEntry, MatchParams, ReconciliationFigures, StatementRow, AMOUNT_EPSILON,
};

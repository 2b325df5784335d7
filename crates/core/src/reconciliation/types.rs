//! Reconciliation domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use saldo_shared::types::VoucherEntryId;

/// Fixed tolerance when comparing a statement line amount against a
/// ledger entry amount: 0.01, one cent in two-decimal currencies.
///
/// A domain constant, not configuration. Statement import and voucher
/// balance checks stay exact; only match comparison uses it.
pub const AMOUNT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// One statement line as supplied by the importing caller.
#[derive(Debug, Clone)]
pub struct StatementRow {
    /// Transaction date on the statement.
    pub row_date: NaiveDate,
    /// Bank-supplied description.
    pub description: String,
    /// Optional bank reference.
    pub reference: Option<String>,
    /// Signed amount: positive for deposits, negative for withdrawals.
    pub amount: Decimal,
}

/// Matching parameters.
#[derive(Debug, Clone, Copy)]
pub struct MatchParams {
    /// Date window in days around the line date.
    pub window_days: i64,
    /// Amount tolerance.
    pub amount_epsilon: Decimal,
}

impl MatchParams {
    /// Creates parameters with the given window and the fixed epsilon.
    #[must_use]
    pub fn new(window_days: i64) -> Self {
        Self {
            window_days,
            amount_epsilon: AMOUNT_EPSILON,
        }
    }
}

impl Default for MatchParams {
    fn default() -> Self {
        Self::new(7)
    }
}

/// A ledger entry eligible to match a statement line: posted, on the
/// statement's bank account, not yet claimed by any line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateEntry {
    /// The entry id.
    pub entry_id: VoucherEntryId,
    /// The owning voucher's date.
    pub voucher_date: NaiveDate,
    /// Signed amount from the bank account's perspective:
    /// `debit - credit` (the bank account is debit-normal).
    pub signed_amount: Decimal,
}

/// Snapshot figures of a reconciliation.
#[derive(Debug, Clone, Copy)]
pub struct ReconciliationFigures {
    /// Closing balance per the bank statement.
    pub statement_balance: Decimal,
    /// Bank account balance per the ledger as of the reconciliation date.
    pub ledger_balance: Decimal,
    /// Posted credits on the bank account not yet seen by the bank.
    pub outstanding_payments: Decimal,
    /// Posted debits on the bank account not yet seen by the bank.
    pub deposits_in_transit: Decimal,
}

impl ReconciliationFigures {
    /// The bank balance adjusted for items the bank has not seen:
    /// `statement_balance - outstanding_payments + deposits_in_transit`.
    #[must_use]
    pub fn adjusted_bank_balance(&self) -> Decimal {
        self.statement_balance - self.outstanding_payments + self.deposits_in_transit
    }

    /// Remaining unexplained difference:
    /// `adjusted_bank_balance - ledger_balance`.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.adjusted_bank_balance() - self.ledger_balance
    }

    /// Whether the reconciliation fully explains the statement.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.difference() == Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_epsilon_is_one_cent() {
        assert_eq!(AMOUNT_EPSILON, dec!(0.01));
    }

    #[test]
    fn test_default_params() {
        let params = MatchParams::default();
        assert_eq!(params.window_days, 7);
        assert_eq!(params.amount_epsilon, dec!(0.01));
    }

    #[test]
    fn test_adjusted_bank_balance() {
        let figures = ReconciliationFigures {
            statement_balance: dec!(10000.00),
            ledger_balance: dec!(9700.00),
            outstanding_payments: dec!(500.00),
            deposits_in_transit: dec!(200.00),
        };
        assert_eq!(figures.adjusted_bank_balance(), dec!(9700.00));
        assert_eq!(figures.difference(), Decimal::ZERO);
        assert!(figures.is_balanced());
    }

    #[test]
    fn test_unexplained_difference() {
        let figures = ReconciliationFigures {
            statement_balance: dec!(10000.00),
            ledger_balance: dec!(9650.00),
            outstanding_payments: dec!(500.00),
            deposits_in_transit: dec!(200.00),
        };
        assert_eq!(figures.difference(), dec!(50.00));
        assert!(!figures.is_balanced());
    }
}

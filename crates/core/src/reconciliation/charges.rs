//! Bank charge voucher synthesis.
//!
//! Negative statement lines with no ledger counterpart (bank fees,
//! account charges) get a generated voucher: debit the expense account,
//! credit the bank account. Posting and match-linking happen in the
//! repository layer.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use saldo_shared::types::{AccountId, CompanyId, StatementLineId};

use crate::ledger::{CreateVoucherInput, VoucherEntryInput, VoucherType};

use super::error::ReconciliationError;

/// Statement line data needed to synthesize a charge voucher.
#[derive(Debug, Clone)]
pub struct ChargeLine {
    /// The line id.
    pub line_id: StatementLineId,
    /// Transaction date on the statement.
    pub line_date: NaiveDate,
    /// Bank-supplied description.
    pub description: String,
    /// Signed line amount; must be negative for a charge.
    pub amount: Decimal,
    /// Whether the line already carries a match link.
    pub is_reconciled: bool,
}

/// Validates that a line qualifies as a bank charge.
///
/// # Errors
///
/// Returns [`ReconciliationError::LineAlreadyMatched`] for reconciled
/// lines and [`ReconciliationError::NotACharge`] for non-negative
/// amounts.
pub fn validate_charge_line(line: &ChargeLine) -> Result<(), ReconciliationError> {
    if line.is_reconciled {
        return Err(ReconciliationError::LineAlreadyMatched(line.line_id));
    }
    if line.amount >= Decimal::ZERO {
        return Err(ReconciliationError::NotACharge(line.line_id));
    }
    Ok(())
}

/// Builds the voucher input for one validated charge line.
///
/// Debits the expense account and credits the bank account with the
/// absolute line amount, dated at the line date. The voucher number is
/// left to the allocator.
#[must_use]
pub fn build_charge_voucher(
    company_id: CompanyId,
    currency: &str,
    bank_account_id: AccountId,
    expense_account_id: AccountId,
    line: &ChargeLine,
) -> CreateVoucherInput {
    let amount = line.amount.abs();
    CreateVoucherInput {
        company_id,
        voucher_type: VoucherType::BankCharge,
        voucher_date: line.line_date,
        currency: currency.to_string(),
        voucher_number: None,
        description: Some(format!("Bank charge: {}", line.description)),
        entries: vec![
            VoucherEntryInput {
                account_id: expense_account_id,
                debit: amount,
                credit: Decimal::ZERO,
                description: Some(line.description.clone()),
                cost_center: None,
            },
            VoucherEntryInput {
                account_id: bank_account_id,
                debit: Decimal::ZERO,
                credit: amount,
                description: Some(line.description.clone()),
                cost_center: None,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::ledger::validation::validate_balanced;

    use super::*;

    fn charge_line(amount: Decimal, is_reconciled: bool) -> ChargeLine {
        ChargeLine {
            line_id: StatementLineId::new(),
            line_date: NaiveDate::from_ymd_opt(2026, 3, 20).unwrap(),
            description: "Monthly account fee".to_string(),
            amount,
            is_reconciled,
        }
    }

    #[test]
    fn test_negative_unmatched_line_qualifies() {
        assert!(validate_charge_line(&charge_line(dec!(-25.00), false)).is_ok());
    }

    #[test]
    fn test_matched_line_rejected() {
        let line = charge_line(dec!(-25.00), true);
        assert_eq!(
            validate_charge_line(&line),
            Err(ReconciliationError::LineAlreadyMatched(line.line_id))
        );
    }

    #[test]
    fn test_deposit_rejected() {
        let line = charge_line(dec!(25.00), false);
        assert_eq!(
            validate_charge_line(&line),
            Err(ReconciliationError::NotACharge(line.line_id))
        );
    }

    #[test]
    fn test_zero_rejected() {
        let line = charge_line(Decimal::ZERO, false);
        assert_eq!(
            validate_charge_line(&line),
            Err(ReconciliationError::NotACharge(line.line_id))
        );
    }

    #[test]
    fn test_built_voucher_shape() {
        let company = CompanyId::new();
        let bank = AccountId::new();
        let expense = AccountId::new();
        let line = charge_line(dec!(-25.00), false);

        let input = build_charge_voucher(company, "USD", bank, expense, &line);

        assert_eq!(input.voucher_type, VoucherType::BankCharge);
        assert_eq!(input.voucher_date, line.line_date);
        assert_eq!(input.company_id, company);
        assert!(input.voucher_number.is_none());
        assert_eq!(input.entries.len(), 2);

        let debit_line = &input.entries[0];
        assert_eq!(debit_line.account_id, expense);
        assert_eq!(debit_line.debit, dec!(25.00));
        assert_eq!(debit_line.credit, Decimal::ZERO);

        let credit_line = &input.entries[1];
        assert_eq!(credit_line.account_id, bank);
        assert_eq!(credit_line.credit, dec!(25.00));

        assert!(validate_balanced(&input.entries).is_ok());
    }
}

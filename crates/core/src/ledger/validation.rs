//! Entry-shape and balance validation for vouchers.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{VoucherEntryInput, VoucherTotals};

/// Validates the shape of a voucher's entry lines.
///
/// Requires at least 2 entries, each with exactly one positive side:
/// a debit or a credit, never both, never neither, never negative.
/// Balance is deliberately not checked here; drafts may be unbalanced.
pub fn validate_entry_shape(entries: &[VoucherEntryInput]) -> Result<(), LedgerError> {
    if entries.len() < 2 {
        return Err(LedgerError::InsufficientEntries(entries.len()));
    }

    for (index, entry) in entries.iter().enumerate() {
        if entry.debit < Decimal::ZERO || entry.credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount { index });
        }
        if entry.debit > Decimal::ZERO && entry.credit > Decimal::ZERO {
            return Err(LedgerError::BothSidesSet { index });
        }
        if entry.debit == Decimal::ZERO && entry.credit == Decimal::ZERO {
            return Err(LedgerError::EmptyEntry { index });
        }
    }

    Ok(())
}

/// Sums the debit and credit columns of the entry lines.
#[must_use]
pub fn totals(entries: &[VoucherEntryInput]) -> VoucherTotals {
    let debit = entries.iter().map(|e| e.debit).sum();
    let credit = entries.iter().map(|e| e.credit).sum();
    VoucherTotals::new(debit, credit)
}

/// Validates that the entry lines balance exactly.
///
/// Zero tolerance: any non-zero difference between total debits and total
/// credits is rejected. Returns the totals on success so callers can stamp
/// `total_amount` without summing twice.
pub fn validate_balanced(entries: &[VoucherEntryInput]) -> Result<VoucherTotals, LedgerError> {
    let totals = totals(entries);
    if totals.is_balanced {
        Ok(totals)
    } else {
        Err(LedgerError::Unbalanced {
            debit: totals.debit,
            credit: totals.credit,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use saldo_shared::types::AccountId;

    use super::*;

    fn entry(debit: Decimal, credit: Decimal) -> VoucherEntryInput {
        VoucherEntryInput {
            account_id: AccountId::new(),
            debit,
            credit,
            description: None,
            cost_center: None,
        }
    }

    #[test]
    fn test_valid_shape() {
        let entries = vec![
            entry(dec!(100.00), Decimal::ZERO),
            entry(Decimal::ZERO, dec!(100.00)),
        ];
        assert!(validate_entry_shape(&entries).is_ok());
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(
            validate_entry_shape(&[]),
            Err(LedgerError::InsufficientEntries(0))
        );
    }

    #[test]
    fn test_rejects_single_entry() {
        let entries = vec![entry(dec!(100), Decimal::ZERO)];
        assert_eq!(
            validate_entry_shape(&entries),
            Err(LedgerError::InsufficientEntries(1))
        );
    }

    #[test]
    fn test_rejects_both_sides() {
        let entries = vec![
            entry(dec!(100), dec!(100)),
            entry(Decimal::ZERO, dec!(100)),
        ];
        assert_eq!(
            validate_entry_shape(&entries),
            Err(LedgerError::BothSidesSet { index: 0 })
        );
    }

    #[test]
    fn test_rejects_zero_entry() {
        let entries = vec![
            entry(dec!(100), Decimal::ZERO),
            entry(Decimal::ZERO, Decimal::ZERO),
        ];
        assert_eq!(
            validate_entry_shape(&entries),
            Err(LedgerError::EmptyEntry { index: 1 })
        );
    }

    #[test]
    fn test_rejects_negative_amount() {
        let entries = vec![
            entry(dec!(-5), Decimal::ZERO),
            entry(Decimal::ZERO, dec!(100)),
        ];
        assert_eq!(
            validate_entry_shape(&entries),
            Err(LedgerError::NegativeAmount { index: 0 })
        );
    }

    #[test]
    fn test_totals() {
        let entries = vec![
            entry(dec!(60.00), Decimal::ZERO),
            entry(dec!(40.00), Decimal::ZERO),
            entry(Decimal::ZERO, dec!(100.00)),
        ];
        let totals = totals(&entries);
        assert_eq!(totals.debit, dec!(100.00));
        assert_eq!(totals.credit, dec!(100.00));
        assert!(totals.is_balanced);
    }

    #[test]
    fn test_balanced_passes() {
        let entries = vec![
            entry(dec!(100.00), Decimal::ZERO),
            entry(Decimal::ZERO, dec!(100.00)),
        ];
        let totals = validate_balanced(&entries).unwrap();
        assert_eq!(totals.debit, dec!(100.00));
    }

    #[test]
    fn test_unbalanced_rejected_with_totals() {
        let entries = vec![
            entry(dec!(100.00), Decimal::ZERO),
            entry(Decimal::ZERO, dec!(99.99)),
        ];
        assert_eq!(
            validate_balanced(&entries),
            Err(LedgerError::Unbalanced {
                debit: dec!(100.00),
                credit: dec!(99.99),
            })
        );
    }

    #[test]
    fn test_one_cent_difference_rejected() {
        // Exact equality, no tolerance
        let entries = vec![
            entry(dec!(0.01), Decimal::ZERO),
            entry(Decimal::ZERO, dec!(0.02)),
        ];
        assert!(validate_balanced(&entries).is_err());
    }
}

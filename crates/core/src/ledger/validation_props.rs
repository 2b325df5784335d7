//! Property-based tests for entry validation and reversal construction.

use proptest::prelude::*;
use rust_decimal::Decimal;
use saldo_shared::types::AccountId;

use super::reversal::ReversalService;
use super::types::VoucherEntryInput;
use super::validation::{totals, validate_balanced, validate_entry_shape};

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    // Positive amounts up to 10M with 2 decimal places
    (1i64..1_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn debit_entry(amount: Decimal) -> VoucherEntryInput {
    VoucherEntryInput {
        account_id: AccountId::new(),
        debit: amount,
        credit: Decimal::ZERO,
        description: None,
        cost_center: None,
    }
}

fn credit_entry(amount: Decimal) -> VoucherEntryInput {
    VoucherEntryInput {
        account_id: AccountId::new(),
        debit: Decimal::ZERO,
        credit: amount,
        description: None,
        cost_center: None,
    }
}

/// Builds a balanced entry set: each amount becomes a debit line, and a
/// single credit line carries the sum.
fn balanced_entries(amounts: &[Decimal]) -> Vec<VoucherEntryInput> {
    let total: Decimal = amounts.iter().copied().sum();
    let mut entries: Vec<VoucherEntryInput> =
        amounts.iter().copied().map(debit_entry).collect();
    entries.push(credit_entry(total));
    entries
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* set of positive amounts, debiting each and crediting the
    /// sum produces a voucher that passes both shape and balance checks.
    #[test]
    fn prop_balanced_construction_validates(
        amounts in prop::collection::vec(amount_strategy(), 1..20),
    ) {
        let entries = balanced_entries(&amounts);
        prop_assert!(validate_entry_shape(&entries).is_ok());
        let result = validate_balanced(&entries);
        prop_assert!(result.is_ok());
        let voucher_totals = result.unwrap();
        prop_assert!(voucher_totals.is_balanced);
        prop_assert_eq!(voucher_totals.debit, voucher_totals.credit);
    }

    /// *For any* balanced entry set, skewing the credit side by any
    /// positive delta is rejected with the exact totals in the error.
    #[test]
    fn prop_skewed_totals_rejected(
        amounts in prop::collection::vec(amount_strategy(), 1..20),
        delta in amount_strategy(),
    ) {
        let mut entries = balanced_entries(&amounts);
        let debit_total: Decimal = amounts.iter().copied().sum();
        // Skew the credit line
        let last = entries.len() - 1;
        entries[last].credit += delta;

        let err = validate_balanced(&entries).unwrap_err();
        prop_assert_eq!(
            err,
            super::error::LedgerError::Unbalanced {
                debit: debit_total,
                credit: debit_total + delta,
            }
        );
    }

    /// *For any* entry set, the totals equal a manual fold over the
    /// individual columns.
    #[test]
    fn prop_totals_match_fold(
        amounts in prop::collection::vec((amount_strategy(), any::<bool>()), 2..30),
    ) {
        let entries: Vec<VoucherEntryInput> = amounts
            .iter()
            .map(|(amount, is_debit)| {
                if *is_debit { debit_entry(*amount) } else { credit_entry(*amount) }
            })
            .collect();

        let mut debit = Decimal::ZERO;
        let mut credit = Decimal::ZERO;
        for entry in &entries {
            debit += entry.debit;
            credit += entry.credit;
        }

        let voucher_totals = totals(&entries);
        prop_assert_eq!(voucher_totals.debit, debit);
        prop_assert_eq!(voucher_totals.credit, credit);
        prop_assert_eq!(voucher_totals.is_balanced, debit == credit);
    }

    /// *For any* balanced entry set, the reversal is also balanced, with
    /// debit and credit totals exchanged.
    #[test]
    fn prop_reversal_preserves_balance(
        amounts in prop::collection::vec(amount_strategy(), 1..20),
    ) {
        let original = balanced_entries(&amounts);
        let original_totals = totals(&original);

        let reversed = ReversalService::new().build_reversing_entries(&original);
        let reversed_totals = totals(&reversed);

        prop_assert_eq!(reversed.len(), original.len());
        prop_assert_eq!(reversed_totals.debit, original_totals.credit);
        prop_assert_eq!(reversed_totals.credit, original_totals.debit);
        prop_assert!(reversed_totals.is_balanced);
    }

    /// *For any* single entry, shape validation fails: a voucher needs at
    /// least two lines.
    #[test]
    fn prop_single_entry_rejected(amount in amount_strategy()) {
        let entries = vec![debit_entry(amount)];
        prop_assert_eq!(
            validate_entry_shape(&entries),
            Err(super::error::LedgerError::InsufficientEntries(1))
        );
    }
}

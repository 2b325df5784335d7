//! Reversal entry construction.
//!
//! A posted voucher is never mutated; undoing it means posting a new
//! voucher whose entries mirror the original with debit and credit
//! swapped. The net ledger effect of original + reversal is zero.

use super::types::VoucherEntryInput;

/// Builds reversing entry sets for posted vouchers.
#[derive(Debug, Default)]
pub struct ReversalService;

impl ReversalService {
    /// Creates a new reversal service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Builds the entry lines of a reversal voucher.
    ///
    /// Each original line reappears with debit and credit swapped and its
    /// description prefixed with `Reversal:`. Line order and cost centers
    /// are preserved.
    #[must_use]
    pub fn build_reversing_entries(&self, entries: &[VoucherEntryInput]) -> Vec<VoucherEntryInput> {
        entries
            .iter()
            .map(|entry| VoucherEntryInput {
                account_id: entry.account_id,
                debit: entry.credit,
                credit: entry.debit,
                description: Some(match &entry.description {
                    Some(text) => format!("Reversal: {text}"),
                    None => "Reversal".to_string(),
                }),
                cost_center: entry.cost_center.clone(),
            })
            .collect()
    }

    /// The description stamped on the reversal voucher itself.
    #[must_use]
    pub fn reversal_description(&self, original_number: &str) -> String {
        format!("Reversal of voucher {original_number}")
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use saldo_shared::types::AccountId;

    use super::super::validation::totals;
    use super::*;

    fn entry(debit: Decimal, credit: Decimal, description: Option<&str>) -> VoucherEntryInput {
        VoucherEntryInput {
            account_id: AccountId::new(),
            debit,
            credit,
            description: description.map(String::from),
            cost_center: None,
        }
    }

    #[test]
    fn test_swaps_debit_and_credit() {
        let original = vec![
            entry(dec!(500.00), Decimal::ZERO, Some("Cash in")),
            entry(Decimal::ZERO, dec!(500.00), None),
        ];

        let reversed = ReversalService::new().build_reversing_entries(&original);

        assert_eq!(reversed.len(), 2);
        assert_eq!(reversed[0].debit, Decimal::ZERO);
        assert_eq!(reversed[0].credit, dec!(500.00));
        assert_eq!(reversed[0].account_id, original[0].account_id);
        assert_eq!(reversed[1].debit, dec!(500.00));
        assert_eq!(reversed[1].credit, Decimal::ZERO);
    }

    #[test]
    fn test_descriptions_prefixed() {
        let original = vec![
            entry(dec!(10), Decimal::ZERO, Some("Office supplies")),
            entry(Decimal::ZERO, dec!(10), None),
        ];

        let reversed = ReversalService::new().build_reversing_entries(&original);

        assert_eq!(
            reversed[0].description.as_deref(),
            Some("Reversal: Office supplies")
        );
        assert_eq!(reversed[1].description.as_deref(), Some("Reversal"));
    }

    #[test]
    fn test_balanced_original_yields_balanced_reversal() {
        let original = vec![
            entry(dec!(300.00), Decimal::ZERO, None),
            entry(dec!(200.00), Decimal::ZERO, None),
            entry(Decimal::ZERO, dec!(500.00), None),
        ];

        let reversed = ReversalService::new().build_reversing_entries(&original);
        let reversed_totals = totals(&reversed);

        assert!(reversed_totals.is_balanced);
        assert_eq!(reversed_totals.debit, dec!(500.00));
        assert_eq!(reversed_totals.credit, dec!(500.00));
    }

    #[test]
    fn test_voucher_description() {
        let text = ReversalService::new().reversal_description("JV-2026-000042");
        assert_eq!(text, "Reversal of voucher JV-2026-000042");
    }
}

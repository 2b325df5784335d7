//! Property-based tests for candidate selection and statement arithmetic.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use saldo_shared::types::VoucherEntryId;

use super::matching::select_candidates;
use super::statement::running_balances;
use super::types::{CandidateEntry, MatchParams, StatementRow};

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (-1_000_000_00i64..1_000_000_00).prop_map(|cents| Decimal::new(cents, 2))
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (1u32..=28).prop_map(|d| NaiveDate::from_ymd_opt(2026, 3, d).unwrap())
}

fn candidate_strategy() -> impl Strategy<Value = CandidateEntry> {
    (date_strategy(), amount_strategy()).prop_map(|(voucher_date, signed_amount)| CandidateEntry {
        entry_id: VoucherEntryId::new(),
        voucher_date,
        signed_amount,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* candidate pool, every selected entry is inside the date
    /// window and within epsilon of the line amount, and the ranking is
    /// non-decreasing in date distance.
    #[test]
    fn prop_selection_respects_filters_and_order(
        line_date in date_strategy(),
        line_amount in amount_strategy(),
        candidates in prop::collection::vec(candidate_strategy(), 0..40),
    ) {
        let params = MatchParams::default();
        let selected = select_candidates(line_date, line_amount, &candidates, &params);

        let mut previous_distance = 0i64;
        for entry in &selected {
            let distance = (entry.voucher_date - line_date).num_days().abs();
            prop_assert!(distance <= params.window_days);
            prop_assert!(
                (line_amount - entry.signed_amount).abs() <= params.amount_epsilon
            );
            prop_assert!(distance >= previous_distance);
            previous_distance = distance;
        }
    }

    /// *For any* candidate pool, selection is deterministic and stable
    /// under input shuffling: the same pool in reverse order yields the
    /// same ranking.
    #[test]
    fn prop_selection_order_independent(
        line_date in date_strategy(),
        line_amount in amount_strategy(),
        candidates in prop::collection::vec(candidate_strategy(), 0..40),
    ) {
        let params = MatchParams::default();
        let forward = select_candidates(line_date, line_amount, &candidates, &params);

        let mut reversed = candidates.clone();
        reversed.reverse();
        let backward = select_candidates(line_date, line_amount, &reversed, &params);

        prop_assert_eq!(forward, backward);
    }

    /// *For any* exact-amount candidate, it is always selected when it is
    /// within the window.
    #[test]
    fn prop_exact_match_in_window_selected(
        line_date in date_strategy(),
        line_amount in amount_strategy(),
        offset in -7i64..=7,
    ) {
        let params = MatchParams::default();
        let exact = CandidateEntry {
            entry_id: VoucherEntryId::new(),
            voucher_date: line_date + chrono::Duration::days(offset),
            signed_amount: line_amount,
        };

        let selected = select_candidates(line_date, line_amount, &[exact], &params);
        prop_assert_eq!(selected.len(), 1);
        prop_assert_eq!(selected[0], exact);
    }

    /// *For any* row sequence, the last running balance equals the opening
    /// balance plus the sum of all amounts, and each step moves by exactly
    /// the row amount.
    #[test]
    fn prop_running_balances_consistent(
        opening in amount_strategy(),
        amounts in prop::collection::vec(amount_strategy(), 1..30),
    ) {
        let rows: Vec<StatementRow> = amounts
            .iter()
            .map(|amount| StatementRow {
                row_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
                description: String::new(),
                reference: None,
                amount: *amount,
            })
            .collect();

        let balances = running_balances(opening, &rows);
        prop_assert_eq!(balances.len(), rows.len());

        let mut previous = opening;
        for (balance, row) in balances.iter().zip(&rows) {
            prop_assert_eq!(*balance, previous + row.amount);
            previous = *balance;
        }

        let total: Decimal = amounts.iter().copied().sum();
        prop_assert_eq!(*balances.last().unwrap(), opening + total);
    }
}

//! Candidate selection for statement line matching.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::{CandidateEntry, MatchParams};

/// True when `voucher_date` falls within the window around `line_date`.
fn within_window(line_date: NaiveDate, voucher_date: NaiveDate, window_days: i64) -> bool {
    (voucher_date - line_date).num_days().abs() <= window_days
}

/// True when the entry amount agrees with the line amount within epsilon.
fn amounts_match(line_amount: Decimal, entry_amount: Decimal, epsilon: Decimal) -> bool {
    (line_amount - entry_amount).abs() <= epsilon
}

/// Filters and ranks candidate entries for one statement line.
///
/// Qualifying entries are those inside the date window whose signed
/// amount agrees with the line amount within epsilon. The result is
/// ordered best-first: nearest date distance, then earliest voucher
/// date, then lowest entry id. With time-ordered v7 ids the final
/// tie-break is creation order, so the ranking is fully deterministic.
///
/// The caller claims the first candidate; if another line won the race
/// for it, the claim fails on the unique link index and the caller moves
/// on to the next candidate in the list.
#[must_use]
pub fn select_candidates(
    line_date: NaiveDate,
    line_amount: Decimal,
    candidates: &[CandidateEntry],
    params: &MatchParams,
) -> Vec<CandidateEntry> {
    let mut qualifying: Vec<CandidateEntry> = candidates
        .iter()
        .filter(|entry| {
            within_window(line_date, entry.voucher_date, params.window_days)
                && amounts_match(line_amount, entry.signed_amount, params.amount_epsilon)
        })
        .copied()
        .collect();

    qualifying.sort_by_key(|entry| {
        (
            (entry.voucher_date - line_date).num_days().abs(),
            entry.voucher_date,
            entry.entry_id,
        )
    });

    qualifying
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use saldo_shared::types::VoucherEntryId;

    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn candidate(voucher_date: NaiveDate, amount: Decimal) -> CandidateEntry {
        CandidateEntry {
            entry_id: VoucherEntryId::new(),
            voucher_date,
            signed_amount: amount,
        }
    }

    #[test]
    fn test_window_is_inclusive() {
        let params = MatchParams::default();
        let candidates = vec![
            candidate(date(8), dec!(500.00)),  // 7 days after, in
            candidate(date(22), dec!(500.00)), // 7 days before, in
            candidate(date(23), dec!(500.00)), // 8 days before, out
        ];

        let selected = select_candidates(date(15), dec!(500.00), &candidates, &params);
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_epsilon_is_inclusive() {
        let params = MatchParams::default();
        let candidates = vec![
            candidate(date(15), dec!(500.00)),
            candidate(date(15), dec!(500.01)),
            candidate(date(15), dec!(500.02)),
            candidate(date(15), dec!(499.99)),
        ];

        let selected = select_candidates(date(15), dec!(500.00), &candidates, &params);
        assert_eq!(selected.len(), 3);
        assert!(
            selected
                .iter()
                .all(|entry| entry.signed_amount != dec!(500.02))
        );
    }

    #[test]
    fn test_nearest_date_wins() {
        let params = MatchParams::default();
        let near = candidate(date(14), dec!(500.00));
        let far = candidate(date(10), dec!(500.00));
        let candidates = vec![far, near];

        let selected = select_candidates(date(15), dec!(500.00), &candidates, &params);
        assert_eq!(selected[0], near);
        assert_eq!(selected[1], far);
    }

    #[test]
    fn test_equal_distance_prefers_earlier_voucher_date() {
        let params = MatchParams::default();
        // 2 days before and 2 days after the line date
        let before = candidate(date(13), dec!(500.00));
        let after = candidate(date(17), dec!(500.00));
        let candidates = vec![after, before];

        let selected = select_candidates(date(15), dec!(500.00), &candidates, &params);
        assert_eq!(selected[0], before);
    }

    #[test]
    fn test_same_date_prefers_lowest_id() {
        let params = MatchParams::default();
        let first = candidate(date(15), dec!(500.00));
        let second = candidate(date(15), dec!(500.00));
        // v7 ids are time-ordered, so first < second
        let candidates = vec![second, first];

        let selected = select_candidates(date(15), dec!(500.00), &candidates, &params);
        assert_eq!(selected[0], first);
        assert_eq!(selected[1], second);
    }

    #[test]
    fn test_negative_amounts_match_withdrawals() {
        let params = MatchParams::default();
        let withdrawal = candidate(date(15), dec!(-75.00));
        let deposit = candidate(date(15), dec!(75.00));
        let candidates = vec![withdrawal, deposit];

        let selected = select_candidates(date(15), dec!(-75.00), &candidates, &params);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0], withdrawal);
    }

    #[test]
    fn test_no_candidates() {
        let params = MatchParams::default();
        assert!(select_candidates(date(15), dec!(500.00), &[], &params).is_empty());
    }
}

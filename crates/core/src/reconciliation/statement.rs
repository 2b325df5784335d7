//! Statement import validation.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::ReconciliationError;
use super::types::StatementRow;

/// Validates a statement before anything is persisted.
///
/// Requires a well-ordered period, at least one row, and
/// `closing == opening + sum(row amounts)` exactly. Failing any check
/// rejects the import wholesale.
pub fn validate_statement(
    period_start: NaiveDate,
    period_end: NaiveDate,
    opening_balance: Decimal,
    closing_balance: Decimal,
    rows: &[StatementRow],
) -> Result<(), ReconciliationError> {
    if period_start > period_end {
        return Err(ReconciliationError::InvalidPeriod {
            start: period_start,
            end: period_end,
        });
    }
    if rows.is_empty() {
        return Err(ReconciliationError::EmptyStatement);
    }

    let movement: Decimal = rows.iter().map(|row| row.amount).sum();
    let computed = opening_balance + movement;
    if computed != closing_balance {
        return Err(ReconciliationError::StatementImbalance {
            declared: closing_balance,
            computed,
        });
    }

    Ok(())
}

/// Computes the cumulative running balance after each row, starting from
/// the opening balance. Output order matches input order.
#[must_use]
pub fn running_balances(opening_balance: Decimal, rows: &[StatementRow]) -> Vec<Decimal> {
    let mut balance = opening_balance;
    rows.iter()
        .map(|row| {
            balance += row.amount;
            balance
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn row(amount: Decimal) -> StatementRow {
        StatementRow {
            row_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            description: "line".to_string(),
            reference: None,
            amount,
        }
    }

    fn period() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        )
    }

    #[test]
    fn test_balanced_statement_passes() {
        let (start, end) = period();
        let rows = vec![row(dec!(500.00)), row(dec!(-120.50))];
        assert!(
            validate_statement(start, end, dec!(1000.00), dec!(1379.50), &rows).is_ok()
        );
    }

    #[test]
    fn test_rejects_empty_statement() {
        let (start, end) = period();
        assert_eq!(
            validate_statement(start, end, dec!(100), dec!(100), &[]),
            Err(ReconciliationError::EmptyStatement)
        );
    }

    #[test]
    fn test_rejects_imbalance() {
        let (start, end) = period();
        let rows = vec![row(dec!(500.00))];
        assert_eq!(
            validate_statement(start, end, dec!(1000.00), dec!(1500.01), &rows),
            Err(ReconciliationError::StatementImbalance {
                declared: dec!(1500.01),
                computed: dec!(1500.00),
            })
        );
    }

    #[test]
    fn test_rejects_inverted_period() {
        let (start, end) = period();
        let rows = vec![row(dec!(1))];
        assert_eq!(
            validate_statement(end, start, dec!(0), dec!(1), &rows),
            Err(ReconciliationError::InvalidPeriod {
                start: end,
                end: start,
            })
        );
    }

    #[test]
    fn test_running_balances_accumulate() {
        let rows = vec![row(dec!(500.00)), row(dec!(-120.50)), row(dec!(0.50))];
        assert_eq!(
            running_balances(dec!(1000.00), &rows),
            vec![dec!(1500.00), dec!(1379.50), dec!(1380.00)]
        );
    }

    #[test]
    fn test_running_balances_empty() {
        assert!(running_balances(dec!(42), &[]).is_empty());
    }
}

//! Pure allocation resolution against a scheme snapshot.

use chrono::NaiveDate;

use super::error::NumberingError;
use super::format::format_number;
use super::types::{ResolvedAllocation, SchemeSnapshot};

/// Resolves one allocation: applies the reset policy, formats the number
/// and computes the state to persist.
///
/// The function is pure. `Allocate` persists `new_next_number` and
/// `new_last_reset_date` under the row lock; `Preview` calls the same
/// function and discards them.
///
/// A `last_reset_date` of `None` is stamped to the as-of date without
/// resetting, so the first allocation fixes the reset epoch.
///
/// # Errors
///
/// Returns a configuration error when the snapshot's padding or counter
/// is out of range.
pub fn resolve_allocation(
    scheme: &SchemeSnapshot,
    as_of: NaiveDate,
) -> Result<ResolvedAllocation, NumberingError> {
    scheme.validate()?;

    let (counter, reset_applied, new_last_reset_date) = match scheme.last_reset_date {
        None => (scheme.next_number, false, Some(as_of)),
        Some(last) if scheme.reset_frequency.period_changed(last, as_of) => (1, true, Some(as_of)),
        Some(last) => (scheme.next_number, false, Some(last)),
    };

    let number = format_number(scheme, counter, as_of);

    Ok(ResolvedAllocation {
        number,
        counter,
        reset_applied,
        new_next_number: counter + 1,
        new_last_reset_date,
    })
}

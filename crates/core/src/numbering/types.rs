//! Numbering scheme types.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::NumberingError;

/// Smallest allowed zero-pad width for the counter.
pub const MIN_PADDING: u32 = 1;
/// Largest allowed zero-pad width for the counter.
pub const MAX_PADDING: u32 = 10;

/// Date token rendered into a formatted number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// No date token.
    None,
    /// `YYYY`.
    Year,
    /// `YYYYMM`.
    YearMonth,
    /// `YYYYMMDD`.
    YearMonthDay,
}

impl DateFormat {
    /// The lowercase code stored in the database enum.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Year => "year",
            Self::YearMonth => "year_month",
            Self::YearMonthDay => "year_month_day",
        }
    }

    /// Renders the date token for `date`, or `None` when the format has
    /// no date component.
    #[must_use]
    pub fn render(self, date: NaiveDate) -> Option<String> {
        match self {
            Self::None => None,
            Self::Year => Some(format!("{:04}", date.year())),
            Self::YearMonth => Some(format!("{:04}{:02}", date.year(), date.month())),
            Self::YearMonthDay => Some(format!(
                "{:04}{:02}{:02}",
                date.year(),
                date.month(),
                date.day()
            )),
        }
    }
}

/// How often the counter resets to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetFrequency {
    /// The counter never resets.
    Never,
    /// Resets when the year changes.
    Yearly,
    /// Resets when the year or month changes.
    Monthly,
    /// Resets when the calendar date changes.
    Daily,
}

impl ResetFrequency {
    /// The lowercase code stored in the database enum.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Yearly => "yearly",
            Self::Monthly => "monthly",
            Self::Daily => "daily",
        }
    }

    /// Whether a counter last reset on `last` should reset again for an
    /// allocation dated `as_of`.
    ///
    /// Comparison is period *difference*, not ordering: a date that moved
    /// backwards across a boundary also triggers a reset.
    #[must_use]
    pub fn period_changed(self, last: NaiveDate, as_of: NaiveDate) -> bool {
        match self {
            Self::Never => false,
            Self::Yearly => last.year() != as_of.year(),
            Self::Monthly => last.year() != as_of.year() || last.month() != as_of.month(),
            Self::Daily => last != as_of,
        }
    }
}

/// In-memory snapshot of a numbering scheme row.
///
/// The repository locks the row, builds this snapshot, and hands it to
/// [`super::resolve_allocation`].
#[derive(Debug, Clone)]
pub struct SchemeSnapshot {
    /// Optional literal prefix.
    pub prefix: Option<String>,
    /// Optional literal suffix.
    pub suffix: Option<String>,
    /// Separator joining adjacent parts (may be empty).
    pub separator: String,
    /// Date token format.
    pub date_format: DateFormat,
    /// Zero-pad width for the counter, 1 to 10.
    pub padding: u32,
    /// The counter value the next allocation receives.
    pub next_number: i64,
    /// Reset policy.
    pub reset_frequency: ResetFrequency,
    /// Date of the last reset; `None` until the first allocation.
    pub last_reset_date: Option<NaiveDate>,
}

impl SchemeSnapshot {
    /// Validates the scheme's numeric configuration.
    ///
    /// # Errors
    ///
    /// Returns [`NumberingError::InvalidPadding`] or
    /// [`NumberingError::InvalidCounter`].
    pub fn validate(&self) -> Result<(), NumberingError> {
        if !(MIN_PADDING..=MAX_PADDING).contains(&self.padding) {
            return Err(NumberingError::InvalidPadding(self.padding));
        }
        if self.next_number < 1 {
            return Err(NumberingError::InvalidCounter(self.next_number));
        }
        Ok(())
    }
}

/// Result of resolving one allocation against a scheme snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAllocation {
    /// The formatted document number.
    pub number: String,
    /// The counter value embedded in the number.
    pub counter: i64,
    /// Whether the reset policy fired for this allocation.
    pub reset_applied: bool,
    /// The `next_number` value to persist.
    pub new_next_number: i64,
    /// The `last_reset_date` value to persist.
    pub new_last_reset_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(DateFormat::None, None)]
    #[case(DateFormat::Year, Some("2026"))]
    #[case(DateFormat::YearMonth, Some("202603"))]
    #[case(DateFormat::YearMonthDay, Some("20260305"))]
    fn test_date_render(#[case] format: DateFormat, #[case] expected: Option<&str>) {
        assert_eq!(
            format.render(date(2026, 3, 5)),
            expected.map(String::from)
        );
    }

    #[test]
    fn test_date_render_pads_single_digits() {
        assert_eq!(
            DateFormat::YearMonthDay.render(date(2026, 1, 7)),
            Some("20260107".to_string())
        );
    }

    #[rstest]
    #[case(ResetFrequency::Never, date(2025, 12, 31), date(2026, 1, 1), false)]
    #[case(ResetFrequency::Yearly, date(2025, 12, 31), date(2026, 1, 1), true)]
    #[case(ResetFrequency::Yearly, date(2026, 1, 1), date(2026, 12, 31), false)]
    #[case(ResetFrequency::Monthly, date(2026, 3, 31), date(2026, 4, 1), true)]
    #[case(ResetFrequency::Monthly, date(2026, 3, 1), date(2026, 3, 31), false)]
    #[case(ResetFrequency::Daily, date(2026, 3, 1), date(2026, 3, 2), true)]
    #[case(ResetFrequency::Daily, date(2026, 3, 2), date(2026, 3, 2), false)]
    // Backwards clock across a boundary still resets
    #[case(ResetFrequency::Yearly, date(2026, 1, 1), date(2025, 12, 31), true)]
    fn test_period_changed(
        #[case] frequency: ResetFrequency,
        #[case] last: NaiveDate,
        #[case] as_of: NaiveDate,
        #[case] expected: bool,
    ) {
        assert_eq!(frequency.period_changed(last, as_of), expected);
    }

    #[test]
    fn test_snapshot_validation() {
        let mut snapshot = SchemeSnapshot {
            prefix: Some("JV".to_string()),
            suffix: None,
            separator: "-".to_string(),
            date_format: DateFormat::Year,
            padding: 6,
            next_number: 1,
            reset_frequency: ResetFrequency::Yearly,
            last_reset_date: None,
        };
        assert!(snapshot.validate().is_ok());

        snapshot.padding = 0;
        assert_eq!(
            snapshot.validate(),
            Err(NumberingError::InvalidPadding(0))
        );

        snapshot.padding = 11;
        assert_eq!(
            snapshot.validate(),
            Err(NumberingError::InvalidPadding(11))
        );

        snapshot.padding = 6;
        snapshot.next_number = 0;
        assert_eq!(snapshot.validate(), Err(NumberingError::InvalidCounter(0)));
    }
}

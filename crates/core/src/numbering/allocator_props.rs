//! Property-based tests for allocation resolution.

use chrono::NaiveDate;
use proptest::prelude::*;

use super::allocator::resolve_allocation;
use super::types::{DateFormat, ResetFrequency, SchemeSnapshot};

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn scheme_strategy() -> impl Strategy<Value = SchemeSnapshot> {
    (
        proptest::option::of("[A-Z]{1,4}"),
        proptest::option::of("[A-Z]{1,4}"),
        prop_oneof![Just(String::new()), Just("-".to_string()), Just("/".to_string())],
        prop_oneof![
            Just(DateFormat::None),
            Just(DateFormat::Year),
            Just(DateFormat::YearMonth),
            Just(DateFormat::YearMonthDay),
        ],
        1u32..=10,
        1i64..1_000_000,
        prop_oneof![
            Just(ResetFrequency::Never),
            Just(ResetFrequency::Yearly),
            Just(ResetFrequency::Monthly),
            Just(ResetFrequency::Daily),
        ],
        proptest::option::of(date_strategy()),
    )
        .prop_map(
            |(
                prefix,
                suffix,
                separator,
                date_format,
                padding,
                next_number,
                reset_frequency,
                last_reset_date,
            )| SchemeSnapshot {
                prefix,
                suffix,
                separator,
                date_format,
                padding,
                next_number,
                reset_frequency,
                last_reset_date,
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* valid scheme and date, resolution is deterministic: the
    /// same inputs always produce the same result. This is what makes
    /// `Preview` honest.
    #[test]
    fn prop_resolution_deterministic(
        scheme in scheme_strategy(),
        as_of in date_strategy(),
    ) {
        let first = resolve_allocation(&scheme, as_of).unwrap();
        let second = resolve_allocation(&scheme, as_of).unwrap();
        prop_assert_eq!(first, second);
    }

    /// *For any* resolution, the persisted counter is exactly one past
    /// the allocated counter, and the counter is at least 1.
    #[test]
    fn prop_counter_advances_by_one(
        scheme in scheme_strategy(),
        as_of in date_strategy(),
    ) {
        let resolved = resolve_allocation(&scheme, as_of).unwrap();
        prop_assert!(resolved.counter >= 1);
        prop_assert_eq!(resolved.new_next_number, resolved.counter + 1);
    }

    /// *For any* resolution, the formatted number contains the counter
    /// zero-padded to at least the scheme's width.
    #[test]
    fn prop_number_contains_padded_counter(
        scheme in scheme_strategy(),
        as_of in date_strategy(),
    ) {
        let resolved = resolve_allocation(&scheme, as_of).unwrap();
        let width = scheme.padding as usize;
        let padded = format!("{:0width$}", resolved.counter);
        prop_assert!(resolved.number.contains(&padded));
    }

    /// *For any* scheme with a reset epoch, a reset fires exactly when
    /// the policy says the period changed, and always restarts at 1.
    #[test]
    fn prop_reset_iff_period_changed(
        scheme in scheme_strategy(),
        as_of in date_strategy(),
    ) {
        let resolved = resolve_allocation(&scheme, as_of).unwrap();
        match scheme.last_reset_date {
            None => {
                prop_assert!(!resolved.reset_applied);
                prop_assert_eq!(resolved.new_last_reset_date, Some(as_of));
            }
            Some(last) => {
                let expected = scheme.reset_frequency.period_changed(last, as_of);
                prop_assert_eq!(resolved.reset_applied, expected);
                if expected {
                    prop_assert_eq!(resolved.counter, 1);
                    prop_assert_eq!(resolved.new_last_reset_date, Some(as_of));
                } else {
                    prop_assert_eq!(resolved.counter, scheme.next_number);
                    prop_assert_eq!(resolved.new_last_reset_date, Some(last));
                }
            }
        }
    }

    /// *For any* scheme, simulating N sequential allocations in one
    /// period yields N consecutive counters with no duplicates or gaps.
    #[test]
    fn prop_sequential_counters_gap_free(
        start in 1i64..1_000_000,
        n in 1usize..50,
    ) {
        let as_of = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        let mut scheme = SchemeSnapshot {
            prefix: Some("DOC".to_string()),
            suffix: None,
            separator: "-".to_string(),
            date_format: DateFormat::None,
            padding: 6,
            next_number: start,
            reset_frequency: ResetFrequency::Never,
            last_reset_date: Some(as_of),
        };

        let mut counters = Vec::with_capacity(n);
        for _ in 0..n {
            let resolved = resolve_allocation(&scheme, as_of).unwrap();
            counters.push(resolved.counter);
            scheme.next_number = resolved.new_next_number;
            scheme.last_reset_date = resolved.new_last_reset_date;
        }

        let expected: Vec<i64> = (start..start + n as i64).collect();
        prop_assert_eq!(counters, expected);
    }
}

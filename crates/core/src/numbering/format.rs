//! Document number formatting.

use chrono::NaiveDate;
use uuid::Uuid;

use super::types::SchemeSnapshot;

/// Formats a document number from a scheme and a counter value.
///
/// Parts are concatenated in order prefix, date token, zero-padded
/// counter, suffix; adjacent present parts are joined with the scheme's
/// separator. Absent or empty parts contribute neither text nor a
/// separator. A counter wider than the padding is never truncated.
#[must_use]
pub fn format_number(scheme: &SchemeSnapshot, counter: i64, as_of: NaiveDate) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(4);

    if let Some(prefix) = &scheme.prefix
        && !prefix.is_empty()
    {
        parts.push(prefix.clone());
    }
    if let Some(token) = scheme.date_format.render(as_of) {
        parts.push(token);
    }

    let width = scheme.padding as usize;
    parts.push(format!("{counter:0width$}"));

    if let Some(suffix) = &scheme.suffix
        && !suffix.is_empty()
    {
        parts.push(suffix.clone());
    }

    parts.join(&scheme.separator)
}

/// Derives an ad-hoc number when no active scheme exists.
///
/// Eight hex characters of a fresh v4 UUID after the type prefix, e.g.
/// `JV-1A2B3C4D`. Not sequential; callers log a warning when they fall
/// back to this.
#[must_use]
pub fn fallback_number(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, hex[..8].to_uppercase())
}

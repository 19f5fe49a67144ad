//! Date header normalization.
//!
//! Mail dates arrive as RFC 2822 text of varying hygiene. Output is always
//! RFC 3339 in UTC with millisecond precision (`2025-06-03T10:00:00.000Z`).

use chrono::{DateTime, Datelike, NaiveDateTime, SecondsFormat, Utc};

/// Layouts tried after strict RFC 2822, for dates real servers emit.
const FALLBACK_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M:%S %z",
    "%a, %d %b %Y %H:%M %z",
    "%a %b %e %H:%M:%S %Y %z",
];

/// Layouts without a zone; read as UTC.
const NAIVE_FORMATS: &[&str] = &["%a, %d %b %Y %H:%M:%S", "%d %b %Y %H:%M:%S"];

/// Parses a `Date:` header value.
///
/// Trailing zone comments (`(UTC)`) and repeated whitespace are removed
/// before parsing. Returns `None` when nothing matches, or when the year
/// does not fit in four digits.
#[must_use]
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    parse_any(raw).and_then(four_digit_year)
}

fn parse_any(raw: &str) -> Option<DateTime<Utc>> {
    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(&cleaned) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&cleaned) {
        return Some(dt.with_timezone(&Utc));
    }

    FALLBACK_FORMATS
        .iter()
        .find_map(|f| DateTime::parse_from_str(&cleaned, f).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(&cleaned, f).ok())
                .map(|naive| naive.and_utc())
        })
}

/// Formats a timestamp the way records carry it.
#[must_use]
pub fn format_rfc3339(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Normalizes an optional `Date:` value, falling back to `now`.
#[must_use]
pub fn normalize_date(raw: Option<&str>, now: DateTime<Utc>) -> String {
    format_rfc3339(raw.and_then(parse_date).unwrap_or(now))
}

/// RFC 3339 output has no room for years past 9999 or before year 0.
fn four_digit_year(dt: DateTime<Utc>) -> Option<DateTime<Utc>> {
    (0..=9999).contains(&dt.year()).then_some(dt)
}

fn clean(raw: &str) -> String {
    let mut s = raw.trim();
    // "... +0000 (UTC)"
    if s.ends_with(')')
        && let Some(open) = s.rfind('(')
    {
        s = s[..open].trim_end();
    }
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

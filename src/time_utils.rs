// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Datelike, SecondsFormat, Utc};

/// Number of model years offered by the filter panel.
pub const YEAR_SPAN: i32 = 70;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time formatted for `createdAt` fields.
pub fn now_rfc3339() -> String {
    format_utc_rfc3339(Utc::now())
}

/// Milliseconds since the epoch for a stored timestamp; 0 if unparseable.
pub fn timestamp_millis(raw: &str) -> i64 {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

/// Selectable model years: `current` down through `YEAR_SPAN - 1` prior years.
pub fn model_years(current: i32) -> Vec<i32> {
    (0..YEAR_SPAN).map(|i| current - i).collect()
}

/// Model years counted back from today.
pub fn default_model_years() -> Vec<i32> {
    model_years(Utc::now().year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_years_descend_from_current() {
        let years = model_years(2026);
        assert_eq!(years.len(), 70);
        assert_eq!(years.first(), Some(&2026));
        assert_eq!(years.last(), Some(&1957));
    }

    #[test]
    fn test_timestamp_millis_tolerates_garbage() {
        assert_eq!(timestamp_millis("not a date"), 0);
        assert_eq!(timestamp_millis("1970-01-01T00:00:01Z"), 1000);
    }

    #[test]
    fn test_format_uses_z_suffix() {
        let date = DateTime::from_timestamp(0, 0).unwrap();
        assert_eq!(format_utc_rfc3339(date), "1970-01-01T00:00:00.000Z");
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current time as Unix epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format epoch milliseconds as RFC3339, if representable.
pub fn format_millis_rfc3339(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis).map(format_utc_rfc3339)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_millis_rfc3339() {
        assert_eq!(
            format_millis_rfc3339(1_700_000_000_000).as_deref(),
            Some("2023-11-14T22:13:20Z")
        );
        assert_eq!(format_millis_rfc3339(i64::MAX), None);
    }
}

// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timestamp helpers.
//!
//! All timestamps are stored as RFC 3339 text with millisecond precision and
//! a `Z` suffix, so lexicographic order equals chronological order and SQL
//! range predicates work on plain string comparison.

use chrono::{DateTime, SecondsFormat, Utc};

/// Current instant in the canonical storage format.
pub fn now() -> String {
    format(Utc::now())
}

/// Format an instant in the canonical storage format.
pub fn format(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp back into a UTC instant.
pub fn parse(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_is_fixed_width_utc() {
        let instant = Utc.with_ymd_and_hms(2026, 3, 5, 7, 9, 11).unwrap();
        assert_eq!(format(instant), "2026-03-05T07:09:11.000Z");
    }

    #[test]
    fn parse_round_trips() {
        let ts = now();
        let parsed = parse(&ts).unwrap();
        assert_eq!(format(parsed), ts);
    }

    #[test]
    fn lexicographic_order_matches_chronological() {
        let earlier = format(Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap());
        let later = format(Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap());
        assert!(earlier < later);
    }
}

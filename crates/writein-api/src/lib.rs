pub mod auth;
pub mod comments;
pub mod error;
pub mod likes;
pub mod middleware;
pub mod pastes;

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

pub(crate) fn parse_timestamp(value: &str, what: &str) -> DateTime<Utc> {
    value
        .parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            // Parse as naive UTC and convert.
            chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt {} timestamp '{}': {}", what, value, e);
            DateTime::default()
        })
}

pub(crate) fn parse_uuid(value: &str, what: &str) -> Uuid {
    value.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", what, value, e);
        Uuid::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sqlite_default_timestamps() {
        let dt = parse_timestamp("2026-08-08 12:30:00", "test");
        assert_eq!(dt.to_rfc3339(), "2026-08-08T12:30:00+00:00");
    }

    #[test]
    fn parses_rfc3339_timestamps() {
        let dt = parse_timestamp("2026-08-08T12:30:00Z", "test");
        assert_eq!(dt.to_rfc3339(), "2026-08-08T12:30:00+00:00");
    }

    #[test]
    fn corrupt_timestamp_falls_back_to_epoch() {
        let dt = parse_timestamp("not a date", "test");
        assert_eq!(dt, DateTime::<Utc>::default());
    }
}

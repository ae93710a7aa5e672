//! SQLite persistence layer.
//!
//! This module provides the database connection type, schema management,
//! and all CRUD and engine operations over the three relations
//! (passengers, flights, reservations).

mod config;
mod connection;
pub mod migrations;
mod schema;

pub(crate) mod flights;
pub(crate) mod passengers;
pub(crate) mod reservations;

pub use config::{default_data_dir, resolve_database_path, DatabaseConfig};
pub use connection::Database;

use chrono::{DateTime, Utc};

use crate::error::Error;

/// Converts a timestamp to Unix epoch seconds for storage.
pub(crate) fn datetime_to_unix(at: DateTime<Utc>) -> i64 {
    at.timestamp()
}

/// Converts Unix epoch seconds from the database back to a timestamp.
pub(crate) fn datetime_from_unix(secs: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or(rusqlite::Error::IntegralValueOutOfRange(0, secs))
}

/// Maps a unique-constraint violation to a `Conflict` error.
///
/// Uniqueness is checked before writing, but a concurrent writer can still
/// win the race; the constraint violation surfacing at commit time becomes
/// the same `Conflict` the pre-check would have produced.
pub(crate) fn map_unique_violation(err: rusqlite::Error, details: &str) -> Error {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.code == rusqlite::ErrorCode::ConstraintViolation {
            return Error::conflict(details);
        }
    }
    Error::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_datetime_round_trip() {
        let at = Utc.with_ymd_and_hms(2026, 8, 25, 14, 30, 0).unwrap();
        let secs = datetime_to_unix(at);
        assert_eq!(datetime_from_unix(secs).unwrap(), at);
    }

    #[test]
    fn test_map_unique_violation_passthrough() {
        let err = rusqlite::Error::QueryReturnedNoRows;
        let mapped = map_unique_violation(err, "duplicate");
        assert!(matches!(mapped, Error::Database(_)));
    }

    #[test]
    fn test_map_unique_violation_conflict() {
        let failure = rusqlite::ffi::Error {
            code: rusqlite::ErrorCode::ConstraintViolation,
            extended_code: 2067,
        };
        let err = rusqlite::Error::SqliteFailure(failure, Some("UNIQUE constraint failed".into()));
        let mapped = map_unique_violation(err, "email already registered");
        assert!(mapped.is_conflict());
        assert!(format!("{mapped}").contains("email already registered"));
    }
}

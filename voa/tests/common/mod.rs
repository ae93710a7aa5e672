//! Common test utilities for integration tests.
//!
//! This module provides helper functions and fixture builders for testing
//! the voa library.

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;
use voa::{Capacity, Database, DatabaseConfig, FlightDraft, PassengerDraft, StateCode};

/// Opens a fresh database in a temporary directory.
///
/// The directory is cleaned up when the returned `TempDir` drops, so the
/// caller must keep it alive for the test's duration.
#[allow(dead_code)]
pub fn open_test_database() -> (Database, TempDir) {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let db = Database::open(DatabaseConfig::new(dir.path().join("test.db")))
        .expect("should open test database");
    (db, dir)
}

/// A pinned clock for temporal assertions.
#[allow(dead_code)]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap()
}

/// Registers a passenger with fields derived from `n`, returning the id.
///
/// # Panics
///
/// Panics on validation or database failure; tests want to fail fast on
/// broken fixtures.
#[allow(dead_code)]
pub fn register_passenger(db: &mut Database, n: u32) -> i64 {
    // names may not contain digits, so only email and document vary by n
    let draft = PassengerDraft::new(
        "Test Passenger",
        &format!("passenger{n}@example.com"),
        format!("{:011}", u64::from(n)),
    )
    .expect("fixture passenger should validate");
    db.create_passenger(&draft)
        .expect("fixture passenger should insert")
        .id
}

/// Schedules a flight, returning the id.
///
/// The creation clock is set an hour before departure so fixtures may
/// schedule flights that are already in the past relative to [`fixed_now`].
///
/// # Panics
///
/// Panics on validation or database failure.
#[allow(dead_code)]
pub fn schedule_flight(
    db: &mut Database,
    origin: &str,
    destination: &str,
    departure_at: DateTime<Utc>,
    capacity: i64,
) -> i64 {
    let draft = FlightDraft::new(
        StateCode::parse(origin).expect("fixture origin should be valid"),
        StateCode::parse(destination).expect("fixture destination should be valid"),
        departure_at,
        Capacity::try_from(capacity).expect("fixture capacity should be valid"),
    );
    db.create_flight(&draft, departure_at - chrono::Duration::hours(1))
        .expect("fixture flight should insert")
        .id
}

/// Reads a flight's stored occupancy.
#[allow(dead_code)]
pub fn occupancy(db: &Database, flight_id: i64) -> i64 {
    db.get_flight(flight_id)
        .expect("flight query should succeed")
        .expect("flight should exist")
        .occupancy
}

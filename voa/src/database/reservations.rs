//! The reservation booking engine.
//!
//! This module owns the booking rules and the derived occupancy invariant:
//! a flight's `occupancy` column always equals the number of reservations
//! referencing it. Occupancy is never incremented or decremented in place;
//! every mutation recounts it from the reservations table inside the same
//! transaction, so a partial failure cannot leave it drifted.
//!
//! The booking checks run in a fixed, observable order: duplicate pair
//! first, then capacity, then departure.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, TransactionBehavior};

use crate::error::{Error, Result};
use crate::flight::Flight;
use crate::reservation::{Reservation, ReservationPatch};

use super::connection::Database;
use super::{datetime_from_unix, datetime_to_unix, map_unique_violation};
use super::{flights, passengers};

const INSERT_RESERVATION: &str = r"
    INSERT INTO reservations (passenger_id, flight_id, reserved_at)
    VALUES (?, ?, ?)
";

const SELECT_RESERVATION: &str = r"
    SELECT id, passenger_id, flight_id, reserved_at
    FROM reservations
    WHERE id = ?
";

const LIST_RESERVATIONS: &str = r"
    SELECT id, passenger_id, flight_id, reserved_at
    FROM reservations
    ORDER BY id
    LIMIT ? OFFSET ?
";

const UPDATE_RESERVATION: &str = r"
    UPDATE reservations
    SET passenger_id = ?, flight_id = ?
    WHERE id = ?
";

const DELETE_RESERVATION: &str = "DELETE FROM reservations WHERE id = ?";

const COUNT_PAIR: &str = r"
    SELECT COUNT(*) FROM reservations
    WHERE passenger_id = ? AND flight_id = ? AND id IS NOT ?
";

const COUNT_FLIGHT_RESERVATIONS: &str = r"
    SELECT COUNT(*) FROM reservations WHERE flight_id = ?
";

const UPDATE_OCCUPANCY: &str = "UPDATE flights SET occupancy = ? WHERE id = ?";

fn row_to_reservation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Reservation> {
    let reserved_secs: i64 = row.get(3)?;
    Ok(Reservation {
        id: row.get(0)?,
        passenger_id: row.get(1)?,
        flight_id: row.get(2)?,
        reserved_at: datetime_from_unix(reserved_secs)?,
    })
}

fn fetch_reservation(conn: &Connection, id: i64) -> Result<Option<Reservation>> {
    match conn.query_row(SELECT_RESERVATION, params![id], row_to_reservation) {
        Ok(reservation) => Ok(Some(reservation)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// True when some reservation other than `exclude_id` holds the pair.
fn pair_taken(
    conn: &Connection,
    passenger_id: i64,
    flight_id: i64,
    exclude_id: Option<i64>,
) -> Result<bool> {
    let count: i64 = conn.query_row(
        COUNT_PAIR,
        params![passenger_id, flight_id, exclude_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Checks that a flight can take one more reservation at `now`.
///
/// Capacity is checked before departure; both messages are observable
/// through the error taxonomy.
fn ensure_bookable(flight: &Flight, now: DateTime<Utc>) -> Result<()> {
    if !flight.has_free_seat() {
        return Err(Error::conflict(format!(
            "capacity exceeded for flight {}",
            flight.id
        )));
    }
    if flight.has_departed(now) {
        return Err(Error::conflict(format!(
            "flight {} has already departed",
            flight.id
        )));
    }
    Ok(())
}

impl Database {
    /// Recomputes a flight's occupancy from the reservations table.
    ///
    /// This is the single source of truth for occupancy. Returns the new
    /// count. A missing flight id leaves no row updated and counts zero;
    /// callers that need existence semantics check first.
    ///
    /// # Errors
    ///
    /// Returns a database error if the count or update fails.
    pub fn recompute_occupancy(conn: &Connection, flight_id: i64) -> Result<i64> {
        let count: i64 =
            conn.query_row(COUNT_FLIGHT_RESERVATIONS, params![flight_id], |row| {
                row.get(0)
            })?;
        conn.execute(UPDATE_OCCUPANCY, params![count, flight_id])?;
        Ok(count)
    }

    /// Books a reservation for a passenger on a flight.
    ///
    /// Check order: passenger exists, flight exists, no duplicate
    /// (passenger, flight) pair, free capacity, departure still in the
    /// future. The insert and the occupancy recount commit together.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing passenger or flight, and
    /// `Conflict` for a duplicate pair, exceeded capacity, or a departed
    /// flight.
    pub fn create_reservation(
        &mut self,
        passenger_id: i64,
        flight_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Reservation> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if passengers::fetch_passenger(&tx, passenger_id)?.is_none() {
            return Err(Error::not_found("passenger", passenger_id));
        }
        let flight = flights::fetch_flight(&tx, flight_id)?
            .ok_or_else(|| Error::not_found("flight", flight_id))?;

        if pair_taken(&tx, passenger_id, flight_id, None)? {
            return Err(Error::conflict(format!(
                "passenger {passenger_id} already holds a reservation on flight {flight_id}"
            )));
        }
        ensure_bookable(&flight, now)?;

        tx.execute(
            INSERT_RESERVATION,
            params![passenger_id, flight_id, datetime_to_unix(now)],
        )
        .map_err(|e| {
            map_unique_violation(
                e,
                &format!(
                    "passenger {passenger_id} already holds a reservation on flight {flight_id}"
                ),
            )
        })?;
        let id = tx.last_insert_rowid();
        Self::recompute_occupancy(&tx, flight_id)?;

        tx.commit()?;
        Ok(Reservation {
            id,
            passenger_id,
            flight_id,
            // stored at whole-second precision
            reserved_at: datetime_from_unix(datetime_to_unix(now))?,
        })
    }

    /// Loads a reservation by id.
    ///
    /// # Errors
    ///
    /// Returns a database error; a missing reservation is `Ok(None)`.
    pub fn get_reservation(&self, id: i64) -> Result<Option<Reservation>> {
        fetch_reservation(&self.conn, id)
    }

    /// Lists reservations ordered by id, with pagination.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn list_reservations(&self, offset: u32, limit: u32) -> Result<Vec<Reservation>> {
        let mut stmt = self.conn.prepare(LIST_RESERVATIONS)?;
        let rows = stmt.query_map(params![limit, offset], row_to_reservation)?;
        let mut reservations = Vec::new();
        for row in rows {
            reservations.push(row?);
        }
        Ok(reservations)
    }

    /// Re-points a reservation at a different passenger and/or flight.
    ///
    /// The effective pair (patched value where given, current value
    /// otherwise) must not collide with a different reservation, and the
    /// effective target flight passes the same capacity-then-departure
    /// checks as booking. Occupancy is recomputed for both the original
    /// and the effective flight; when they are the same flight the second
    /// recount is an idempotent no-op, when they differ both sides must
    /// be recounted or one goes stale.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing reservation or a missing newly
    /// given reference, and `Conflict` per the booking rules.
    pub fn update_reservation(
        &mut self,
        id: i64,
        patch: &ReservationPatch,
        now: DateTime<Utc>,
    ) -> Result<Reservation> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current =
            fetch_reservation(&tx, id)?.ok_or_else(|| Error::not_found("reservation", id))?;

        let passenger_id = match patch.passenger_id {
            Some(new_id) => {
                if passengers::fetch_passenger(&tx, new_id)?.is_none() {
                    return Err(Error::not_found("passenger", new_id));
                }
                new_id
            }
            None => current.passenger_id,
        };
        let flight_id = patch.flight_id.unwrap_or(current.flight_id);
        let flight = flights::fetch_flight(&tx, flight_id)?
            .ok_or_else(|| Error::not_found("flight", flight_id))?;

        if pair_taken(&tx, passenger_id, flight_id, Some(id))? {
            return Err(Error::conflict(format!(
                "passenger {passenger_id} already holds a reservation on flight {flight_id}"
            )));
        }
        ensure_bookable(&flight, now)?;

        tx.execute(UPDATE_RESERVATION, params![passenger_id, flight_id, id])
            .map_err(|e| {
                map_unique_violation(
                    e,
                    &format!(
                        "passenger {passenger_id} already holds a reservation on flight {flight_id}"
                    ),
                )
            })?;
        Self::recompute_occupancy(&tx, current.flight_id)?;
        Self::recompute_occupancy(&tx, flight_id)?;

        tx.commit()?;
        Ok(Reservation {
            id,
            passenger_id,
            flight_id,
            reserved_at: current.reserved_at,
        })
    }

    /// Cancels a reservation and recounts the former flight's occupancy.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the reservation does not exist.
    pub fn delete_reservation(&mut self, id: i64) -> Result<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current =
            fetch_reservation(&tx, id)?.ok_or_else(|| Error::not_found("reservation", id))?;

        tx.execute(DELETE_RESERVATION, params![id])?;
        Self::recompute_occupancy(&tx, current.flight_id)?;

        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseConfig;
    use crate::flight::{Capacity, FlightDraft, StateCode};
    use crate::passenger::PassengerDraft;
    use chrono::TimeZone;
    use tempfile::{tempdir, TempDir};

    fn open_db() -> (Database, TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(DatabaseConfig::new(dir.path().join("test.db"))).unwrap();
        (db, dir)
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn add_passenger(db: &mut Database, n: u32) -> i64 {
        db.create_passenger(
            &PassengerDraft::new(
                "Ana Souza",
                &format!("ana{n}@example.com"),
                &format!("{:011}", u64::from(n)),
            )
            .unwrap(),
        )
        .unwrap()
        .id
    }

    fn add_flight(db: &mut Database, departure_at: DateTime<Utc>, capacity: i64) -> i64 {
        // create against a "now" before departure so past flights can be
        // seeded for the departed-flight scenarios
        let creation_now = departure_at - chrono::Duration::hours(1);
        db.create_flight(
            &FlightDraft::new(
                StateCode::parse("SP").unwrap(),
                StateCode::parse("RJ").unwrap(),
                departure_at,
                Capacity::try_from(capacity).unwrap(),
            ),
            creation_now,
        )
        .unwrap()
        .id
    }

    fn occupancy(db: &Database, flight_id: i64) -> i64 {
        db.get_flight(flight_id).unwrap().unwrap().occupancy
    }

    #[test]
    fn test_book_and_recount() {
        let (mut db, _dir) = open_db();
        let now = utc(2026, 8, 25, 10, 0);
        let passenger = add_passenger(&mut db, 1);
        let flight = add_flight(&mut db, utc(2026, 8, 26, 9, 0), 100);

        let reservation = db.create_reservation(passenger, flight, now).unwrap();
        assert_eq!(reservation.passenger_id, passenger);
        assert_eq!(reservation.flight_id, flight);
        assert_eq!(occupancy(&db, flight), 1);

        let loaded = db.get_reservation(reservation.id).unwrap().unwrap();
        assert_eq!(loaded, reservation);
    }

    #[test]
    fn test_missing_references_are_not_found() {
        let (mut db, _dir) = open_db();
        let now = utc(2026, 8, 25, 10, 0);
        let passenger = add_passenger(&mut db, 1);
        let flight = add_flight(&mut db, utc(2026, 8, 26, 9, 0), 100);

        assert!(db.create_reservation(999, flight, now).unwrap_err().is_not_found());
        assert!(db.create_reservation(passenger, 999, now).unwrap_err().is_not_found());
    }

    #[test]
    fn test_duplicate_pair_conflicts_and_occupancy_unchanged() {
        let (mut db, _dir) = open_db();
        let now = utc(2026, 8, 25, 10, 0);
        let passenger = add_passenger(&mut db, 1);
        let flight = add_flight(&mut db, utc(2026, 8, 26, 9, 0), 100);

        db.create_reservation(passenger, flight, now).unwrap();
        let err = db.create_reservation(passenger, flight, now).unwrap_err();
        assert!(err.is_conflict());
        assert!(format!("{err}").contains("already holds"));
        assert_eq!(occupancy(&db, flight), 1);
    }

    #[test]
    fn test_departed_flight_conflicts_even_with_capacity() {
        let (mut db, _dir) = open_db();
        let passenger = add_passenger(&mut db, 1);
        let flight = add_flight(&mut db, utc(2026, 8, 25, 9, 0), 100);

        let now = utc(2026, 8, 25, 10, 0);
        let err = db.create_reservation(passenger, flight, now).unwrap_err();
        assert!(err.is_conflict());
        assert!(format!("{err}").contains("departed"));
        assert_eq!(occupancy(&db, flight), 0);
    }

    #[test]
    fn test_departure_exactly_now_counts_as_departed() {
        let (mut db, _dir) = open_db();
        let passenger = add_passenger(&mut db, 1);
        let departure = utc(2026, 8, 25, 10, 0);
        let flight = add_flight(&mut db, departure, 100);

        let err = db.create_reservation(passenger, flight, departure).unwrap_err();
        assert!(format!("{err}").contains("departed"));
    }

    #[test]
    fn test_capacity_checked_before_departure() {
        // a full AND departed flight reports "capacity exceeded", matching
        // the fixed check order
        let (mut db, _dir) = open_db();
        let now = utc(2026, 8, 25, 10, 0);
        let flight = add_flight(&mut db, utc(2026, 8, 25, 11, 0), 51);

        for n in 1..=51 {
            let passenger = add_passenger(&mut db, n);
            db.create_reservation(passenger, flight, now).unwrap();
        }

        let late_now = utc(2026, 8, 25, 12, 0);
        let extra = add_passenger(&mut db, 52);
        let err = db.create_reservation(extra, flight, late_now).unwrap_err();
        assert!(format!("{err}").contains("capacity exceeded"));
    }

    #[test]
    fn test_fill_to_capacity_then_conflict() {
        let (mut db, _dir) = open_db();
        let now = utc(2026, 8, 25, 10, 0);
        let flight = add_flight(&mut db, utc(2026, 8, 25, 11, 0), 51);

        for n in 1..=51 {
            let passenger = add_passenger(&mut db, n);
            db.create_reservation(passenger, flight, now).unwrap();
        }
        assert_eq!(occupancy(&db, flight), 51);

        let extra = add_passenger(&mut db, 52);
        let err = db.create_reservation(extra, flight, now).unwrap_err();
        assert!(err.is_conflict());
        assert!(format!("{err}").contains("capacity exceeded"));
        assert_eq!(occupancy(&db, flight), 51);
    }

    #[test]
    fn test_cancel_decrements_by_one() {
        let (mut db, _dir) = open_db();
        let now = utc(2026, 8, 25, 10, 0);
        let flight = add_flight(&mut db, utc(2026, 8, 26, 9, 0), 100);
        let p1 = add_passenger(&mut db, 1);
        let p2 = add_passenger(&mut db, 2);

        let r1 = db.create_reservation(p1, flight, now).unwrap();
        db.create_reservation(p2, flight, now).unwrap();
        assert_eq!(occupancy(&db, flight), 2);

        db.delete_reservation(r1.id).unwrap();
        assert_eq!(occupancy(&db, flight), 1);
        assert!(db.get_reservation(r1.id).unwrap().is_none());
    }

    #[test]
    fn test_cancel_missing_is_not_found() {
        let (mut db, _dir) = open_db();
        assert!(db.delete_reservation(999).unwrap_err().is_not_found());
    }

    #[test]
    fn test_move_between_flights_recounts_both() {
        let (mut db, _dir) = open_db();
        let now = utc(2026, 8, 25, 10, 0);
        let passenger = add_passenger(&mut db, 1);
        let origin_flight = add_flight(&mut db, utc(2026, 8, 26, 9, 0), 100);
        let target_flight = add_flight(&mut db, utc(2026, 8, 26, 15, 0), 100);

        let reservation = db.create_reservation(passenger, origin_flight, now).unwrap();
        assert_eq!(occupancy(&db, origin_flight), 1);

        let patch = ReservationPatch::new().with_flight_id(target_flight);
        let moved = db.update_reservation(reservation.id, &patch, now).unwrap();
        assert_eq!(moved.flight_id, target_flight);
        assert_eq!(moved.passenger_id, passenger);
        assert_eq!(occupancy(&db, origin_flight), 0);
        assert_eq!(occupancy(&db, target_flight), 1);
    }

    #[test]
    fn test_update_allows_restating_own_pair() {
        let (mut db, _dir) = open_db();
        let now = utc(2026, 8, 25, 10, 0);
        let passenger = add_passenger(&mut db, 1);
        let flight = add_flight(&mut db, utc(2026, 8, 26, 9, 0), 100);

        let reservation = db.create_reservation(passenger, flight, now).unwrap();
        let patch = ReservationPatch::new()
            .with_passenger_id(passenger)
            .with_flight_id(flight);
        let updated = db.update_reservation(reservation.id, &patch, now).unwrap();
        assert_eq!(updated.flight_id, flight);
        assert_eq!(occupancy(&db, flight), 1);
    }

    #[test]
    fn test_update_collision_with_other_reservation_conflicts() {
        let (mut db, _dir) = open_db();
        let now = utc(2026, 8, 25, 10, 0);
        let p1 = add_passenger(&mut db, 1);
        let p2 = add_passenger(&mut db, 2);
        let flight = add_flight(&mut db, utc(2026, 8, 26, 9, 0), 100);

        db.create_reservation(p1, flight, now).unwrap();
        let r2 = db.create_reservation(p2, flight, now).unwrap();

        let patch = ReservationPatch::new().with_passenger_id(p1);
        let err = db.update_reservation(r2.id, &patch, now).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(occupancy(&db, flight), 2);
    }

    #[test]
    fn test_update_to_departed_flight_conflicts() {
        let (mut db, _dir) = open_db();
        let passenger = add_passenger(&mut db, 1);
        let future_flight = add_flight(&mut db, utc(2026, 8, 26, 9, 0), 100);
        let past_flight = add_flight(&mut db, utc(2026, 8, 25, 9, 0), 100);

        let now = utc(2026, 8, 25, 10, 0);
        let reservation = db.create_reservation(passenger, future_flight, now).unwrap();

        let patch = ReservationPatch::new().with_flight_id(past_flight);
        let err = db.update_reservation(reservation.id, &patch, now).unwrap_err();
        assert!(format!("{err}").contains("departed"));
        assert_eq!(occupancy(&db, future_flight), 1);
        assert_eq!(occupancy(&db, past_flight), 0);
    }

    #[test]
    fn test_update_missing_reference_is_not_found() {
        let (mut db, _dir) = open_db();
        let now = utc(2026, 8, 25, 10, 0);
        let passenger = add_passenger(&mut db, 1);
        let flight = add_flight(&mut db, utc(2026, 8, 26, 9, 0), 100);
        let reservation = db.create_reservation(passenger, flight, now).unwrap();

        let patch = ReservationPatch::new().with_flight_id(999);
        assert!(db
            .update_reservation(reservation.id, &patch, now)
            .unwrap_err()
            .is_not_found());

        let patch = ReservationPatch::new().with_passenger_id(999);
        assert!(db
            .update_reservation(reservation.id, &patch, now)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_passenger_delete_cascade_recounts() {
        let (mut db, _dir) = open_db();
        let now = utc(2026, 8, 25, 10, 0);
        let passenger = add_passenger(&mut db, 1);
        let f1 = add_flight(&mut db, utc(2026, 8, 26, 9, 0), 100);
        let f2 = add_flight(&mut db, utc(2026, 8, 26, 15, 0), 100);

        db.create_reservation(passenger, f1, now).unwrap();
        db.create_reservation(passenger, f2, now).unwrap();
        assert_eq!(occupancy(&db, f1), 1);
        assert_eq!(occupancy(&db, f2), 1);

        db.delete_passenger(passenger).unwrap();
        assert_eq!(db.list_reservations(0, 10).unwrap().len(), 0);
        assert_eq!(occupancy(&db, f1), 0);
        assert_eq!(occupancy(&db, f2), 0);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let (mut db, _dir) = open_db();
        let now = utc(2026, 8, 25, 10, 0);
        let passenger = add_passenger(&mut db, 1);
        let flight = add_flight(&mut db, utc(2026, 8, 26, 9, 0), 100);
        db.create_reservation(passenger, flight, now).unwrap();

        for _ in 0..3 {
            let count = Database::recompute_occupancy(db.connection(), flight).unwrap();
            assert_eq!(count, 1);
        }
        assert_eq!(occupancy(&db, flight), 1);
    }
}

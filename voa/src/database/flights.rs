//! Flight CRUD and search operations.
//!
//! Temporal rules are evaluated against an explicit `now` argument so the
//! caller (the CLI passes the wall clock, tests pin it) decides what "the
//! instant of the operation" means.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, TransactionBehavior};

use crate::error::{Error, Result};
use crate::flight::{truncate_to_minute, Capacity, Flight, FlightDraft, FlightFilter, FlightPatch, StateCode};

use super::connection::Database;
use super::{datetime_from_unix, datetime_to_unix};

const INSERT_FLIGHT: &str = r"
    INSERT INTO flights (origin, destination, departure_at, capacity, occupancy)
    VALUES (?, ?, ?, ?, 0)
";

const SELECT_FLIGHT: &str = r"
    SELECT id, origin, destination, departure_at, capacity, occupancy
    FROM flights
    WHERE id = ?
";

const LIST_FLIGHTS: &str = r"
    SELECT id, origin, destination, departure_at, capacity, occupancy
    FROM flights
    ORDER BY id
    LIMIT ? OFFSET ?
";

const UPDATE_FLIGHT: &str = r"
    UPDATE flights
    SET origin = ?, destination = ?, departure_at = ?, capacity = ?
    WHERE id = ?
";

const DELETE_FLIGHT: &str = "DELETE FROM flights WHERE id = ?";

/// Deserializes a flight from a row in column order
/// (id, origin, destination, `departure_at`, capacity, occupancy).
pub(crate) fn row_to_flight(row: &rusqlite::Row<'_>) -> rusqlite::Result<Flight> {
    let origin: String = row.get(1)?;
    let destination: String = row.get(2)?;
    let departure_secs: i64 = row.get(3)?;
    let capacity: i64 = row.get(4)?;

    Ok(Flight {
        id: row.get(0)?,
        origin: StateCode::parse(&origin)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?,
        destination: StateCode::parse(&destination)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?,
        departure_at: datetime_from_unix(departure_secs)?,
        capacity: Capacity::try_from(capacity)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?,
        occupancy: row.get(5)?,
    })
}

/// Loads a flight by id, `None` when missing.
pub(crate) fn fetch_flight(conn: &Connection, id: i64) -> Result<Option<Flight>> {
    match conn.query_row(SELECT_FLIGHT, params![id], row_to_flight) {
        Ok(flight) => Ok(Some(flight)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn ensure_future_departure(departure_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
    if departure_at <= now {
        return Err(Error::Validation {
            field: "departure_at".into(),
            message: "cannot schedule a flight in the past".into(),
        });
    }
    Ok(())
}

impl Database {
    /// Schedules a flight.
    ///
    /// The draft's state codes and capacity are already validated; this
    /// enforces the temporal rule: the (minute-truncated) departure must
    /// be strictly after `now`. Occupancy starts at 0.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a departure at or before `now`, or a
    /// database error.
    pub fn create_flight(&mut self, draft: &FlightDraft, now: DateTime<Utc>) -> Result<Flight> {
        ensure_future_departure(draft.departure_at, now)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            INSERT_FLIGHT,
            params![
                draft.origin.as_str(),
                draft.destination.as_str(),
                datetime_to_unix(draft.departure_at),
                draft.capacity.value(),
            ],
        )?;
        let id = tx.last_insert_rowid();

        tx.commit()?;
        Ok(Flight {
            id,
            origin: draft.origin,
            destination: draft.destination,
            departure_at: draft.departure_at,
            capacity: draft.capacity,
            occupancy: 0,
        })
    }

    /// Loads a flight by id.
    ///
    /// # Errors
    ///
    /// Returns a database error; a missing flight is `Ok(None)`.
    pub fn get_flight(&self, id: i64) -> Result<Option<Flight>> {
        fetch_flight(&self.conn, id)
    }

    /// Lists flights ordered by id, with pagination.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn list_flights(&self, offset: u32, limit: u32) -> Result<Vec<Flight>> {
        let mut stmt = self.conn.prepare(LIST_FLIGHTS)?;
        let rows = stmt.query_map(params![limit, offset], row_to_flight)?;
        let mut flights = Vec::new();
        for row in rows {
            flights.push(row?);
        }
        Ok(flights)
    }

    /// Searches flights by optional origin, destination, date, and time.
    ///
    /// Origin and destination filter in SQL; the date filter matches the
    /// calendar date of departure and the time filter matches hour and
    /// minute.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn search_flights(&self, filter: &FlightFilter) -> Result<Vec<Flight>> {
        let mut sql = String::from(
            "SELECT id, origin, destination, departure_at, capacity, occupancy FROM flights",
        );
        let mut clauses = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(origin) = filter.origin {
            clauses.push("origin = ?");
            args.push(origin.as_str().to_string());
        }
        if let Some(destination) = filter.destination {
            clauses.push("destination = ?");
            args.push(destination.as_str().to_string());
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY departure_at, id");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), row_to_flight)?;

        let mut flights = Vec::new();
        for row in rows {
            let flight = row?;
            if filter.matches_schedule(&flight) {
                flights.push(flight);
            }
        }
        Ok(flights)
    }

    /// Applies a partial update to a flight.
    ///
    /// Each supplied field is re-validated with the creation rules; a new
    /// departure must be strictly after `now` at the instant of this call
    /// and is truncated to the minute.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the flight does not exist or `Validation`
    /// for a departure at or before `now`.
    pub fn update_flight(
        &mut self,
        id: i64,
        patch: &FlightPatch,
        now: DateTime<Utc>,
    ) -> Result<Flight> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut flight = fetch_flight(&tx, id)?.ok_or_else(|| Error::not_found("flight", id))?;

        if let Some(origin) = patch.origin {
            flight.origin = origin;
        }
        if let Some(destination) = patch.destination {
            flight.destination = destination;
        }
        if let Some(capacity) = patch.capacity {
            flight.capacity = capacity;
        }
        if let Some(departure_at) = patch.departure_at {
            let departure_at = truncate_to_minute(departure_at);
            ensure_future_departure(departure_at, now)?;
            flight.departure_at = departure_at;
        }

        tx.execute(
            UPDATE_FLIGHT,
            params![
                flight.origin.as_str(),
                flight.destination.as_str(),
                datetime_to_unix(flight.departure_at),
                flight.capacity.value(),
                id,
            ],
        )?;

        tx.commit()?;
        Ok(flight)
    }

    /// Deletes a flight; the cascade removes its reservations.
    ///
    /// Reservations reference exactly one flight, so no other flight's
    /// occupancy can change here.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the flight does not exist.
    pub fn delete_flight(&mut self, id: i64) -> Result<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if fetch_flight(&tx, id)?.is_none() {
            return Err(Error::not_found("flight", id));
        }
        tx.execute(DELETE_FLIGHT, params![id])?;

        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseConfig;
    use chrono::{NaiveDate, NaiveTime, TimeZone};
    use tempfile::{tempdir, TempDir};

    fn open_db() -> (Database, TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(DatabaseConfig::new(dir.path().join("test.db"))).unwrap();
        (db, dir)
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn draft(origin: &str, destination: &str, departure_at: DateTime<Utc>) -> FlightDraft {
        FlightDraft::new(
            StateCode::parse(origin).unwrap(),
            StateCode::parse(destination).unwrap(),
            departure_at,
            Capacity::try_from(100).unwrap(),
        )
    }

    #[test]
    fn test_create_truncates_to_minute() {
        let (mut db, _dir) = open_db();
        let now = utc(2026, 8, 25, 10, 0, 0);
        let flight = db
            .create_flight(&draft("SP", "RJ", utc(2026, 8, 25, 14, 30, 45)), now)
            .unwrap();

        assert_eq!(flight.departure_at, utc(2026, 8, 25, 14, 30, 0));
        assert_eq!(flight.occupancy, 0);

        let loaded = db.get_flight(flight.id).unwrap().unwrap();
        assert_eq!(loaded, flight);
    }

    #[test]
    fn test_create_rejects_past_departure() {
        let (mut db, _dir) = open_db();
        let now = utc(2026, 8, 25, 10, 0, 0);

        let err = db
            .create_flight(&draft("SP", "RJ", utc(2026, 8, 25, 9, 0, 0)), now)
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        // departure exactly at "now" is also rejected
        let err = db
            .create_flight(&draft("SP", "RJ", now), now)
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_update_independent_fields() {
        let (mut db, _dir) = open_db();
        let now = utc(2026, 8, 25, 10, 0, 0);
        let flight = db
            .create_flight(&draft("SP", "RJ", utc(2026, 8, 26, 9, 0, 0)), now)
            .unwrap();

        let patch = FlightPatch::new()
            .with_destination(StateCode::parse("BA").unwrap())
            .with_capacity(Capacity::try_from(60).unwrap());
        let updated = db.update_flight(flight.id, &patch, now).unwrap();

        assert_eq!(updated.origin.as_str(), "SP");
        assert_eq!(updated.destination.as_str(), "BA");
        assert_eq!(updated.capacity.value(), 60);
        assert_eq!(updated.departure_at, flight.departure_at);
    }

    #[test]
    fn test_update_rejects_past_reschedule() {
        let (mut db, _dir) = open_db();
        let created_now = utc(2026, 8, 25, 10, 0, 0);
        let flight = db
            .create_flight(&draft("SP", "RJ", utc(2026, 8, 26, 9, 0, 0)), created_now)
            .unwrap();

        // "now" has moved; the new departure must beat the update instant
        let update_now = utc(2026, 8, 27, 10, 0, 0);
        let patch = FlightPatch::new().with_departure_at(utc(2026, 8, 27, 9, 0, 0));
        let err = db.update_flight(flight.id, &patch, update_now).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_update_truncates_reschedule() {
        let (mut db, _dir) = open_db();
        let now = utc(2026, 8, 25, 10, 0, 0);
        let flight = db
            .create_flight(&draft("SP", "RJ", utc(2026, 8, 26, 9, 0, 0)), now)
            .unwrap();

        let patch = FlightPatch::new().with_departure_at(utc(2026, 8, 28, 11, 15, 59));
        let updated = db.update_flight(flight.id, &patch, now).unwrap();
        assert_eq!(updated.departure_at, utc(2026, 8, 28, 11, 15, 0));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let (mut db, _dir) = open_db();
        let now = utc(2026, 8, 25, 10, 0, 0);
        let err = db
            .update_flight(42, &FlightPatch::new(), now)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let (mut db, _dir) = open_db();
        assert!(db.delete_flight(42).unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_pagination() {
        let (mut db, _dir) = open_db();
        let now = utc(2026, 8, 25, 10, 0, 0);
        for i in 0..4 {
            db.create_flight(&draft("SP", "RJ", utc(2026, 8, 26, 9 + i, 0, 0)), now)
                .unwrap();
        }

        assert_eq!(db.list_flights(0, 3).unwrap().len(), 3);
        assert_eq!(db.list_flights(3, 3).unwrap().len(), 1);
    }

    #[test]
    fn test_search_by_route_and_schedule() {
        let (mut db, _dir) = open_db();
        let now = utc(2026, 8, 25, 10, 0, 0);
        db.create_flight(&draft("SP", "RJ", utc(2026, 8, 26, 9, 30, 0)), now)
            .unwrap();
        db.create_flight(&draft("SP", "BA", utc(2026, 8, 26, 9, 30, 0)), now)
            .unwrap();
        db.create_flight(&draft("MG", "RJ", utc(2026, 8, 27, 9, 30, 0)), now)
            .unwrap();

        let from_sp = FlightFilter::new().with_origin(StateCode::parse("SP").unwrap());
        assert_eq!(db.search_flights(&from_sp).unwrap().len(), 2);

        let to_rj = FlightFilter::new().with_destination(StateCode::parse("RJ").unwrap());
        assert_eq!(db.search_flights(&to_rj).unwrap().len(), 2);

        let on_26th =
            FlightFilter::new().with_date(NaiveDate::from_ymd_opt(2026, 8, 26).unwrap());
        assert_eq!(db.search_flights(&on_26th).unwrap().len(), 2);

        let at_930 = FlightFilter::new().with_time(NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(db.search_flights(&at_930).unwrap().len(), 3);

        let sp_to_rj = FlightFilter::new()
            .with_origin(StateCode::parse("SP").unwrap())
            .with_destination(StateCode::parse("RJ").unwrap());
        let hits = db.search_flights(&sp_to_rj).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].origin.as_str(), "SP");
        assert_eq!(hits[0].destination.as_str(), "RJ");

        assert_eq!(db.search_flights(&FlightFilter::new()).unwrap().len(), 3);
    }
}

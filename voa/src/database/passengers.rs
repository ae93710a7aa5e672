//! Passenger CRUD operations.
//!
//! All mutations run inside a single immediate transaction: validation
//! first, then the write, so a failed rule never leaves a partial write
//! behind. Deleting a passenger cascades to their reservations, and the
//! occupancy of every affected flight is recomputed before commit.

use rusqlite::{params, Connection, TransactionBehavior};

use crate::error::{Error, Result};
use crate::passenger::{
    normalize_email, validate_document, validate_full_name, Passenger, PassengerDraft,
    PassengerPatch,
};

use super::connection::Database;
use super::map_unique_violation;

const INSERT_PASSENGER: &str = r"
    INSERT INTO passengers (full_name, email, document)
    VALUES (?, ?, ?)
";

const SELECT_PASSENGER: &str = r"
    SELECT id, full_name, email, document
    FROM passengers
    WHERE id = ?
";

const LIST_PASSENGERS: &str = r"
    SELECT id, full_name, email, document
    FROM passengers
    ORDER BY id
    LIMIT ? OFFSET ?
";

const UPDATE_PASSENGER: &str = r"
    UPDATE passengers
    SET full_name = ?, email = ?, document = ?
    WHERE id = ?
";

const DELETE_PASSENGER: &str = "DELETE FROM passengers WHERE id = ?";

const COUNT_EMAIL: &str = "SELECT COUNT(*) FROM passengers WHERE email = ?";

const COUNT_DOCUMENT: &str = "SELECT COUNT(*) FROM passengers WHERE document = ?";

const SELECT_BOOKED_FLIGHTS: &str = r"
    SELECT DISTINCT flight_id FROM reservations WHERE passenger_id = ?
";

fn row_to_passenger(row: &rusqlite::Row<'_>) -> rusqlite::Result<Passenger> {
    Ok(Passenger {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        document: row.get(3)?,
    })
}

/// Loads a passenger by id, `None` when missing.
pub(crate) fn fetch_passenger(conn: &Connection, id: i64) -> Result<Option<Passenger>> {
    match conn.query_row(SELECT_PASSENGER, params![id], row_to_passenger) {
        Ok(passenger) => Ok(Some(passenger)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn email_in_use(conn: &Connection, email: &str) -> Result<bool> {
    let count: i64 = conn.query_row(COUNT_EMAIL, params![email], |row| row.get(0))?;
    Ok(count > 0)
}

fn document_in_use(conn: &Connection, document: &str) -> Result<bool> {
    let count: i64 = conn.query_row(COUNT_DOCUMENT, params![document], |row| row.get(0))?;
    Ok(count > 0)
}

impl Database {
    /// Registers a passenger.
    ///
    /// The draft's field values are already validated; this checks email
    /// and document uniqueness against the store before inserting. A
    /// unique-constraint violation at commit (a concurrent duplicate)
    /// surfaces as the same `Conflict`.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` when the email or document is already
    /// registered, or a database error.
    pub fn create_passenger(&mut self, draft: &PassengerDraft) -> Result<Passenger> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if document_in_use(&tx, draft.document())? {
            return Err(Error::conflict("document already registered"));
        }
        if email_in_use(&tx, draft.email())? {
            return Err(Error::conflict("email already registered"));
        }

        tx.execute(
            INSERT_PASSENGER,
            params![draft.full_name(), draft.email(), draft.document()],
        )
        .map_err(|e| map_unique_violation(e, "passenger already registered"))?;
        let id = tx.last_insert_rowid();

        tx.commit()?;
        Ok(Passenger {
            id,
            full_name: draft.full_name().to_string(),
            email: draft.email().to_string(),
            document: draft.document().to_string(),
        })
    }

    /// Loads a passenger by id.
    ///
    /// # Errors
    ///
    /// Returns a database error; a missing passenger is `Ok(None)`.
    pub fn get_passenger(&self, id: i64) -> Result<Option<Passenger>> {
        fetch_passenger(&self.conn, id)
    }

    /// Lists passengers ordered by id, with pagination.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn list_passengers(&self, offset: u32, limit: u32) -> Result<Vec<Passenger>> {
        let mut stmt = self.conn.prepare(LIST_PASSENGERS)?;
        let rows = stmt.query_map(params![limit, offset], row_to_passenger)?;
        let mut passengers = Vec::new();
        for row in rows {
            passengers.push(row?);
        }
        Ok(passengers)
    }

    /// Applies a partial update to a passenger.
    ///
    /// Only fields present in the patch are touched, and each is
    /// re-validated with the creation rules. Email and document
    /// uniqueness is re-checked only when the value actually changes, so
    /// an update restating the current value passes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the passenger does not exist, `Validation`
    /// for a malformed field, or `Conflict` for a duplicate email or
    /// document.
    pub fn update_passenger(&mut self, id: i64, patch: &PassengerPatch) -> Result<Passenger> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut passenger =
            fetch_passenger(&tx, id)?.ok_or_else(|| Error::not_found("passenger", id))?;

        if let Some(ref full_name) = patch.full_name {
            validate_full_name(full_name)?;
            passenger.full_name = full_name.clone();
        }
        if let Some(ref email) = patch.email {
            let email = normalize_email(email)?;
            if email != passenger.email && email_in_use(&tx, &email)? {
                return Err(Error::conflict("email already registered"));
            }
            passenger.email = email;
        }
        if let Some(ref document) = patch.document {
            validate_document(document)?;
            if *document != passenger.document && document_in_use(&tx, document)? {
                return Err(Error::conflict("document already registered"));
            }
            passenger.document = document.clone();
        }

        tx.execute(
            UPDATE_PASSENGER,
            params![
                passenger.full_name,
                passenger.email,
                passenger.document,
                id
            ],
        )
        .map_err(|e| map_unique_violation(e, "passenger already registered"))?;

        tx.commit()?;
        Ok(passenger)
    }

    /// Deletes a passenger and, via cascade, their reservations.
    ///
    /// Occupancy is recomputed for every flight the passenger had a
    /// reservation on, inside the same transaction as the delete.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the passenger does not exist.
    pub fn delete_passenger(&mut self, id: i64) -> Result<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if fetch_passenger(&tx, id)?.is_none() {
            return Err(Error::not_found("passenger", id));
        }

        let booked_flights: Vec<i64> = {
            let mut stmt = tx.prepare(SELECT_BOOKED_FLIGHTS)?;
            let rows = stmt.query_map(params![id], |row| row.get(0))?;
            rows.collect::<rusqlite::Result<_>>()?
        };

        tx.execute(DELETE_PASSENGER, params![id])?;
        for flight_id in booked_flights {
            Database::recompute_occupancy(&tx, flight_id)?;
        }

        tx.commit()?;
        Ok(())
    }
}

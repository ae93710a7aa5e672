//! Database schema management and migrations.

use rusqlite::Connection;

use crate::error::{Error, Result};

use super::schema::{
    CREATE_FLIGHTS_TABLE, CREATE_FLIGHT_DEPARTURE_INDEX, CREATE_FLIGHT_DESTINATION_INDEX,
    CREATE_FLIGHT_ORIGIN_INDEX, CREATE_METADATA_TABLE, CREATE_PASSENGERS_TABLE,
    CREATE_RESERVATIONS_TABLE, CREATE_RESERVATION_FLIGHT_INDEX,
    CREATE_RESERVATION_PASSENGER_INDEX, CURRENT_SCHEMA_VERSION, INSERT_SCHEMA_VERSION,
    SELECT_SCHEMA_VERSION,
};

/// Initializes the schema for a fresh database.
///
/// # Errors
///
/// Returns an error if any DDL statement fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_METADATA_TABLE, [])?;
    conn.execute(CREATE_PASSENGERS_TABLE, [])?;
    conn.execute(CREATE_FLIGHTS_TABLE, [])?;
    conn.execute(CREATE_RESERVATIONS_TABLE, [])?;

    conn.execute(CREATE_RESERVATION_FLIGHT_INDEX, [])?;
    conn.execute(CREATE_RESERVATION_PASSENGER_INDEX, [])?;
    conn.execute(CREATE_FLIGHT_ORIGIN_INDEX, [])?;
    conn.execute(CREATE_FLIGHT_DESTINATION_INDEX, [])?;
    conn.execute(CREATE_FLIGHT_DEPARTURE_INDEX, [])?;

    conn.execute(INSERT_SCHEMA_VERSION, [CURRENT_SCHEMA_VERSION])?;
    Ok(())
}

/// Gets the schema version stored in the database.
///
/// Returns 0 for a database without a metadata table or version row.
///
/// # Errors
///
/// Returns an error if the query fails for any other reason.
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    match conn.query_row(SELECT_SCHEMA_VERSION, [], |row| {
        let value: String = row.get(0)?;
        value
            .parse::<i32>()
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
    }) {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => {
            // "no such table" surfaces as an Unknown error code
            if let rusqlite::Error::SqliteFailure(ref sqlite_err, _) = e {
                if sqlite_err.code == rusqlite::ErrorCode::Unknown {
                    return Ok(0);
                }
            }
            Err(e.into())
        }
    }
}

/// Checks schema compatibility, initializing a fresh database.
///
/// # Errors
///
/// Returns [`Error::UnsupportedSchemaVersion`] when the stored version
/// differs from [`CURRENT_SCHEMA_VERSION`], or any error from
/// initialization.
pub fn check_schema_compatibility(conn: &Connection) -> Result<()> {
    let version = get_schema_version(conn)?;

    if version == 0 {
        initialize_schema(conn)?;
    } else if version != CURRENT_SCHEMA_VERSION {
        return Err(Error::UnsupportedSchemaVersion {
            expected: CURRENT_SCHEMA_VERSION,
            found: version,
        });
    }

    Ok(())
}

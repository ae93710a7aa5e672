//! Database schema definitions and SQL constants.
//!
//! All table definitions, indices, and versioning constants for the voa
//! reservation schema live here.

/// Current schema version for the database.
///
/// Stored in the metadata table and checked on every open.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// SQL statement to create the metadata table.
pub const CREATE_METADATA_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS metadata (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    )";

/// SQL statement to create the passengers table.
///
/// Email and document carry UNIQUE constraints so that a concurrent
/// duplicate registration fails at commit even if it slips past the
/// pre-insert uniqueness checks.
pub const CREATE_PASSENGERS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS passengers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        full_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        document TEXT NOT NULL UNIQUE
    )";

/// SQL statement to create the flights table.
///
/// `occupancy` is derived state; it is only ever written by the occupancy
/// recomputation, never incremented in place.
pub const CREATE_FLIGHTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS flights (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        origin TEXT NOT NULL,
        destination TEXT NOT NULL,
        departure_at INTEGER NOT NULL,
        capacity INTEGER NOT NULL,
        occupancy INTEGER NOT NULL DEFAULT 0
    )";

/// SQL statement to create the reservations table.
///
/// Both foreign keys cascade on delete; the unique (passenger, flight)
/// index enforces the one-reservation-per-pair rule under concurrency.
pub const CREATE_RESERVATIONS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS reservations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        passenger_id INTEGER NOT NULL REFERENCES passengers(id) ON DELETE CASCADE,
        flight_id INTEGER NOT NULL REFERENCES flights(id) ON DELETE CASCADE,
        reserved_at INTEGER NOT NULL,
        UNIQUE (passenger_id, flight_id)
    )";

/// Index speeding up occupancy recomputation and cascade bookkeeping.
pub const CREATE_RESERVATION_FLIGHT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_reservations_flight ON reservations(flight_id)";

/// Index speeding up per-passenger lookups.
pub const CREATE_RESERVATION_PASSENGER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_reservations_passenger ON reservations(passenger_id)";

/// Index speeding up report grouping by origin.
pub const CREATE_FLIGHT_ORIGIN_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_flights_origin ON flights(origin)";

/// Index speeding up report grouping by destination.
pub const CREATE_FLIGHT_DESTINATION_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_flights_destination ON flights(destination)";

/// Index speeding up the report's departure-window queries.
pub const CREATE_FLIGHT_DEPARTURE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_flights_departure ON flights(departure_at)";

/// SQL statement to select the schema version from the metadata table.
pub const SELECT_SCHEMA_VERSION: &str = "SELECT value FROM metadata WHERE key = 'schema_version'";

/// SQL statement to insert or update the schema version.
pub const INSERT_SCHEMA_VERSION: &str =
    "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)";

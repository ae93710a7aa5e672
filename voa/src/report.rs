//! Fleet report aggregation.
//!
//! A read-only derived view over the flights table, recomputed per call:
//! per-state route counts plus a three-way partition of flights by their
//! departure relative to `now`. The departed and about-to-depart buckets
//! overlap on purpose: a flight that left five minutes ago appears in
//! both.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::database::flights::row_to_flight;
use crate::database::{datetime_to_unix, Database};
use crate::error::Result;
use crate::flight::{Flight, StateCode};

/// Minutes before departure during which a flight counts as about to
/// depart.
pub const ABOUT_TO_DEPART_WINDOW_MINUTES: i64 = 10;

const COUNT_BY_ORIGIN: &str = r"
    SELECT origin, COUNT(id)
    FROM flights
    GROUP BY origin
    ORDER BY origin
";

const COUNT_BY_DESTINATION: &str = r"
    SELECT destination, COUNT(id)
    FROM flights
    GROUP BY destination
    ORDER BY destination
";

const SELECT_DEPARTED: &str = r"
    SELECT id, origin, destination, departure_at, capacity, occupancy
    FROM flights
    WHERE departure_at < ?
    ORDER BY departure_at, id
";

const SELECT_ABOUT_TO_DEPART: &str = r"
    SELECT id, origin, destination, departure_at, capacity, occupancy
    FROM flights
    WHERE departure_at >= ? AND departure_at <= ?
    ORDER BY departure_at, id
";

const SELECT_UPCOMING: &str = r"
    SELECT id, origin, destination, departure_at, capacity, occupancy
    FROM flights
    WHERE departure_at > ?
    ORDER BY departure_at, id
";

/// Number of flights touching one state code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteCount {
    /// The state code being counted.
    pub state: StateCode,
    /// How many flights list it.
    pub flights: i64,
}

/// The full fleet report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Flight counts grouped by origin state.
    pub origins: Vec<RouteCount>,
    /// Flight counts grouped by destination state.
    pub destinations: Vec<RouteCount>,
    /// Flights whose departure is strictly before `now`.
    pub departed: Vec<Flight>,
    /// Flights departing inside the trailing ten-minute window, `now`
    /// included.
    pub about_to_depart: Vec<Flight>,
    /// Flights departing strictly after `now`.
    pub upcoming: Vec<Flight>,
}

fn route_counts(db: &Database, sql: &str) -> Result<Vec<RouteCount>> {
    let mut stmt = db.connection().prepare(sql)?;
    let rows = stmt.query_map([], |row| {
        let state: String = row.get(0)?;
        let flights: i64 = row.get(1)?;
        let state = StateCode::parse(&state)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        Ok(RouteCount { state, flights })
    })?;
    let mut counts = Vec::new();
    for row in rows {
        counts.push(row?);
    }
    Ok(counts)
}

fn flights_where(db: &Database, sql: &str, args: &[i64]) -> Result<Vec<Flight>> {
    let mut stmt = db.connection().prepare(sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), row_to_flight)?;
    let mut flights = Vec::new();
    for row in rows {
        flights.push(row?);
    }
    Ok(flights)
}

impl Database {
    /// Builds the fleet report as of `now`.
    ///
    /// # Errors
    ///
    /// Returns a database error if any of the queries fail.
    pub fn generate_report(&self, now: DateTime<Utc>) -> Result<Report> {
        let now_secs = datetime_to_unix(now);
        let window_start =
            datetime_to_unix(now - Duration::minutes(ABOUT_TO_DEPART_WINDOW_MINUTES));

        Ok(Report {
            origins: route_counts(self, COUNT_BY_ORIGIN)?,
            destinations: route_counts(self, COUNT_BY_DESTINATION)?,
            departed: flights_where(self, SELECT_DEPARTED, &[now_secs])?,
            about_to_depart: flights_where(self, SELECT_ABOUT_TO_DEPART, &[window_start, now_secs])?,
            upcoming: flights_where(self, SELECT_UPCOMING, &[now_secs])?,
        })
    }
}

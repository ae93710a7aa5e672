//! Flight types with validated origin/destination codes and capacity.
//!
//! Origins and destinations are two-letter federative-unit codes drawn from
//! a fixed 27-entry set. Capacity is bounded strictly between 50 and 500,
//! exclusive on both ends. Departure timestamps carry whole-minute
//! precision.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// The set of valid two-letter state codes, one per federative unit.
pub const VALID_STATE_CODES: [&str; 27] = [
    "AC", "AL", "AM", "AP", "BA", "CE", "DF", "ES", "GO", "MA", "MG", "MS", "MT", "PA", "PB", "PE",
    "PI", "PR", "RJ", "RN", "RO", "RR", "RS", "SC", "SE", "SP", "TO",
];

/// A validated two-letter state code.
///
/// Parsing is case-insensitive; the stored value is always upper case.
///
/// # Examples
///
/// ```
/// use voa::StateCode;
///
/// let code = StateCode::parse("sp").unwrap();
/// assert_eq!(code.as_str(), "SP");
/// assert!(StateCode::parse("XX").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateCode(#[serde(skip)] &'static str);

impl StateCode {
    /// Parses a state code, upper-casing the input.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStateCodeError`] if the code is not one of the 27
    /// valid entries.
    pub fn parse(code: &str) -> Result<Self, InvalidStateCodeError> {
        let upper = code.trim().to_uppercase();
        VALID_STATE_CODES
            .iter()
            .find(|c| **c == upper)
            .map(|c| Self(c))
            .ok_or(InvalidStateCodeError { code: upper })
    }

    /// The upper-cased two-letter code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for StateCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for StateCode {
    type Error = InvalidStateCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StateCode> for String {
    fn from(code: StateCode) -> Self {
        code.0.to_string()
    }
}

/// Error returned when a state code is not in the valid set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStateCodeError {
    /// The rejected (upper-cased) code.
    pub code: String,
}

impl std::fmt::Display for InvalidStateCodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' is not a valid state code", self.code)
    }
}

impl std::error::Error for InvalidStateCodeError {}

/// A validated flight capacity.
///
/// The value must lie strictly between 50 and 500; both boundary values are
/// rejected.
///
/// # Examples
///
/// ```
/// use voa::Capacity;
///
/// assert_eq!(Capacity::try_from(200).unwrap().value(), 200);
/// assert!(Capacity::try_from(50).is_err());
/// assert!(Capacity::try_from(500).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Capacity(i64);

impl Capacity {
    /// The capacity value.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Capacity {
    type Error = InvalidCapacityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value <= 50 || value >= 500 {
            return Err(InvalidCapacityError { value });
        }
        Ok(Self(value))
    }
}

impl From<Capacity> for i64 {
    fn from(capacity: Capacity) -> Self {
        capacity.0
    }
}

impl std::fmt::Display for Capacity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a capacity is out of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidCapacityError {
    /// The rejected value.
    pub value: i64,
}

impl std::fmt::Display for InvalidCapacityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "capacity {} is out of bounds (must be greater than 50 and less than 500)",
            self.value
        )
    }
}

impl std::error::Error for InvalidCapacityError {}

/// Truncates a timestamp to whole-minute precision.
#[must_use]
pub fn truncate_to_minute(at: DateTime<Utc>) -> DateTime<Utc> {
    at.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(at)
}

/// A scheduled flight.
///
/// `occupancy` is derived state: it always equals the number of
/// reservations referencing the flight and is recomputed by the engine
/// after every mutation that can affect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    /// Generated identifier.
    pub id: i64,
    /// Origin state code.
    pub origin: StateCode,
    /// Destination state code.
    pub destination: StateCode,
    /// Scheduled departure, minute precision.
    pub departure_at: DateTime<Utc>,
    /// Seat capacity.
    pub capacity: Capacity,
    /// Derived reservation count.
    pub occupancy: i64,
}

impl Flight {
    /// True when at least one seat is free.
    #[must_use]
    pub fn has_free_seat(&self) -> bool {
        self.occupancy < self.capacity.value()
    }

    /// True when the flight's departure is at or before `now`.
    #[must_use]
    pub fn has_departed(&self, now: DateTime<Utc>) -> bool {
        self.departure_at <= now
    }
}

/// Validated input for creating a flight.
///
/// The departure timestamp is truncated to the minute at construction.
/// The not-in-the-past rule depends on the instant of the operation and is
/// enforced by the engine.
#[derive(Debug, Clone)]
pub struct FlightDraft {
    /// Origin state code.
    pub origin: StateCode,
    /// Destination state code.
    pub destination: StateCode,
    /// Scheduled departure, truncated to the minute.
    pub departure_at: DateTime<Utc>,
    /// Seat capacity.
    pub capacity: Capacity,
}

impl FlightDraft {
    /// Creates a draft, truncating the departure to whole minutes.
    #[must_use]
    pub fn new(
        origin: StateCode,
        destination: StateCode,
        departure_at: DateTime<Utc>,
        capacity: Capacity,
    ) -> Self {
        Self {
            origin,
            destination,
            departure_at: truncate_to_minute(departure_at),
            capacity,
        }
    }
}

/// A partial update for a flight.
///
/// Each field is independently optional; whichever are supplied are
/// re-validated with the same rules as creation.
#[derive(Debug, Clone, Default)]
pub struct FlightPatch {
    /// Replacement origin, if any.
    pub origin: Option<StateCode>,
    /// Replacement destination, if any.
    pub destination: Option<StateCode>,
    /// Replacement departure, if any (must be in the future at update time).
    pub departure_at: Option<DateTime<Utc>>,
    /// Replacement capacity, if any.
    pub capacity: Option<Capacity>,
}

impl FlightPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the replacement origin.
    #[must_use]
    pub const fn with_origin(mut self, origin: StateCode) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Sets the replacement destination.
    #[must_use]
    pub const fn with_destination(mut self, destination: StateCode) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Sets the replacement departure.
    #[must_use]
    pub fn with_departure_at(mut self, departure_at: DateTime<Utc>) -> Self {
        self.departure_at = Some(departure_at);
        self
    }

    /// Sets the replacement capacity.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// True when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.origin.is_none()
            && self.destination.is_none()
            && self.departure_at.is_none()
            && self.capacity.is_none()
    }
}

/// Optional filters for the flight search.
///
/// All fields are independently optional. The date filter matches the
/// calendar date of departure; the time filter matches hour and minute.
#[derive(Debug, Clone, Default)]
pub struct FlightFilter {
    /// Match flights departing from this state.
    pub origin: Option<StateCode>,
    /// Match flights arriving at this state.
    pub destination: Option<StateCode>,
    /// Match flights departing on this calendar date (UTC).
    pub date: Option<NaiveDate>,
    /// Match flights departing at this hour and minute.
    pub time: Option<NaiveTime>,
}

impl FlightFilter {
    /// Creates an empty filter (matches every flight).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the origin filter.
    #[must_use]
    pub const fn with_origin(mut self, origin: StateCode) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Sets the destination filter.
    #[must_use]
    pub const fn with_destination(mut self, destination: StateCode) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Sets the departure-date filter.
    #[must_use]
    pub const fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Sets the departure-time filter.
    #[must_use]
    pub const fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    /// True when the flight passes the date and time filters.
    pub(crate) fn matches_schedule(&self, flight: &Flight) -> bool {
        if let Some(date) = self.date {
            if flight.departure_at.date_naive() != date {
                return false;
            }
        }
        if let Some(time) = self.time {
            let departure = flight.departure_at.time();
            if departure.hour() != time.hour() || departure.minute() != time.minute() {
                return false;
            }
        }
        true
    }
}

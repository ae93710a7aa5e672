//! Reservation types.
//!
//! A reservation links exactly one passenger to exactly one flight by id.
//! The (passenger, flight) pair is unique across all reservations. All
//! booking rules (existence, duplicate pair, capacity, departure) live in
//! the engine, which also keeps each flight's derived occupancy in step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A booked reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Generated identifier.
    pub id: i64,
    /// The passenger holding the seat.
    pub passenger_id: i64,
    /// The flight the seat is on.
    pub flight_id: i64,
    /// When the reservation was made.
    pub reserved_at: DateTime<Utc>,
}

/// A partial update for a reservation.
///
/// Either reference may be re-pointed; fields left as `None` keep their
/// current value. The engine validates the effective (passenger, flight)
/// pair that results.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReservationPatch {
    /// Replacement passenger reference, if any.
    pub passenger_id: Option<i64>,
    /// Replacement flight reference, if any.
    pub flight_id: Option<i64>,
}

impl ReservationPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the replacement passenger reference.
    #[must_use]
    pub const fn with_passenger_id(mut self, passenger_id: i64) -> Self {
        self.passenger_id = Some(passenger_id);
        self
    }

    /// Sets the replacement flight reference.
    #[must_use]
    pub const fn with_flight_id(mut self, flight_id: i64) -> Self {
        self.flight_id = Some(flight_id);
        self
    }

    /// True when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.passenger_id.is_none() && self.flight_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_patch_builder() {
        let patch = ReservationPatch::new().with_flight_id(7);
        assert_eq!(patch.flight_id, Some(7));
        assert!(patch.passenger_id.is_none());
        assert!(!patch.is_empty());
        assert!(ReservationPatch::new().is_empty());
    }

    #[test]
    fn test_reservation_serde() {
        let reservation = Reservation {
            id: 3,
            passenger_id: 1,
            flight_id: 2,
            reserved_at: Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap(),
        };
        let json = serde_json::to_string(&reservation).unwrap();
        let back: Reservation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reservation);
    }
}

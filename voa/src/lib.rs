#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # voa
//!
//! A library for managing flight reservations.
//!
//! This library provides core types and operations for registering
//! passengers, scheduling flights, and booking seats, keeping each
//! flight's occupancy equal to its reservation count.
//!
//! ## Core Types
//!
//! - [`Passenger`], [`Flight`], [`Reservation`]: the three entities
//! - [`StateCode`] and [`Capacity`]: validated flight fields
//! - [`Database`]: the `SQLite`-backed store the operations run against
//! - [`Report`]: the derived per-route and per-departure-bucket view
//! - [`Error`] and [`Result`]: error handling types
//!
//! ## Examples
//!
//! ```
//! use voa::{Capacity, StateCode};
//!
//! let origin = StateCode::parse("SP").unwrap();
//! assert_eq!(origin.as_str(), "SP");
//!
//! // seats must be strictly between 50 and 500
//! let capacity = Capacity::try_from(180).unwrap();
//! assert_eq!(capacity.value(), 180);
//! assert!(Capacity::try_from(50).is_err());
//! ```

pub mod database;
pub mod error;
pub mod flight;
pub mod logging;
pub mod passenger;
pub mod report;
pub mod reservation;

// Re-export key types at crate root for convenience
pub use database::{resolve_database_path, Database, DatabaseConfig};
pub use error::{Error, Result};
pub use flight::{
    Capacity, Flight, FlightDraft, FlightFilter, FlightPatch, StateCode, VALID_STATE_CODES,
};
pub use logging::{init_logger, LogLevel, Logger};
pub use passenger::{Passenger, PassengerDraft, PassengerPatch};
pub use report::{Report, RouteCount};
pub use reservation::{Reservation, ReservationPatch};

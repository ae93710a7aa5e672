//! Reservation command implementations.
//!
//! Booking, listing, re-pointing, and cancelling reservations. The
//! booking rules (duplicate pair, capacity, departure) are enforced by
//! the engine; this layer only shapes arguments and output.

use chrono::Utc;
use clap::{Args, Subcommand};
use voa::{Error, ReservationPatch};

use crate::error::CliError;
use crate::utils::{open_database, print_json, GlobalOptions};

/// Reservation subcommands.
#[derive(Subcommand)]
pub enum ReservationCommand {
    /// Book a reservation
    Add(AddReservation),

    /// Show a reservation by id
    Show(ShowReservation),

    /// List reservations
    List(ListReservations),

    /// Re-point a reservation at a different passenger or flight
    Update(UpdateReservation),

    /// Cancel a reservation
    Remove(RemoveReservation),
}

impl ReservationCommand {
    /// Execute the selected reservation subcommand.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        match self {
            Self::Add(cmd) => cmd.execute(global),
            Self::Show(cmd) => cmd.execute(global),
            Self::List(cmd) => cmd.execute(global),
            Self::Update(cmd) => cmd.execute(global),
            Self::Remove(cmd) => cmd.execute(global),
        }
    }
}

/// Book a reservation.
#[derive(Args)]
pub struct AddReservation {
    /// Passenger id
    #[arg(long)]
    pub passenger: i64,

    /// Flight id
    #[arg(long)]
    pub flight: i64,
}

impl AddReservation {
    fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let mut db = open_database(global)?;
        let reservation = db.create_reservation(self.passenger, self.flight, Utc::now())?;

        print_json(&reservation)?;
        if !global.quiet {
            eprintln!(
                "Booked reservation {} (passenger {} on flight {})",
                reservation.id, reservation.passenger_id, reservation.flight_id
            );
        }
        Ok(())
    }
}

/// Show a reservation.
#[derive(Args)]
pub struct ShowReservation {
    /// Reservation id
    pub id: i64,
}

impl ShowReservation {
    fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let db = open_database(global)?;
        let reservation = db
            .get_reservation(self.id)?
            .ok_or_else(|| Error::not_found("reservation", self.id))?;
        print_json(&reservation)?;
        Ok(())
    }
}

/// List reservations.
#[derive(Args)]
pub struct ListReservations {
    /// Number of reservations to skip
    #[arg(long, default_value_t = 0)]
    pub offset: u32,

    /// Maximum number of reservations to return
    #[arg(long, default_value_t = 10)]
    pub limit: u32,
}

impl ListReservations {
    fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let db = open_database(global)?;
        let reservations = db.list_reservations(self.offset, self.limit)?;
        print_json(&reservations)?;
        Ok(())
    }
}

/// Re-point a reservation.
#[derive(Args)]
pub struct UpdateReservation {
    /// Reservation id
    pub id: i64,

    /// New passenger id
    #[arg(long)]
    pub passenger: Option<i64>,

    /// New flight id
    #[arg(long)]
    pub flight: Option<i64>,
}

impl UpdateReservation {
    fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let mut patch = ReservationPatch::new();
        if let Some(passenger_id) = self.passenger {
            patch = patch.with_passenger_id(passenger_id);
        }
        if let Some(flight_id) = self.flight {
            patch = patch.with_flight_id(flight_id);
        }
        if patch.is_empty() {
            return Err(CliError::InvalidArguments(
                "at least one of --passenger, --flight is required".to_string(),
            ));
        }

        let mut db = open_database(global)?;
        let reservation = db.update_reservation(self.id, &patch, Utc::now())?;

        print_json(&reservation)?;
        if !global.quiet {
            eprintln!("Updated reservation {}", reservation.id);
        }
        Ok(())
    }
}

/// Cancel a reservation.
#[derive(Args)]
pub struct RemoveReservation {
    /// Reservation id
    pub id: i64,
}

impl RemoveReservation {
    fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let mut db = open_database(global)?;
        db.delete_reservation(self.id)?;
        if !global.quiet {
            eprintln!("Cancelled reservation {}", self.id);
        }
        Ok(())
    }
}

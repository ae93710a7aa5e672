//! Flight command implementations.
//!
//! Scheduling, listing, filtered search, update, and removal of flights.
//! Departure is given as a separate date and time pair, interpreted as
//! UTC, the same way the schedule filters take them.

use chrono::Utc;
use clap::{Args, Subcommand};
use voa::{Capacity, Error, FlightDraft, FlightFilter, FlightPatch, StateCode};

use crate::error::CliError;
use crate::utils::{combine_date_time, open_database, parse_date, parse_time, print_json, GlobalOptions};

/// Flight subcommands.
#[derive(Subcommand)]
pub enum FlightCommand {
    /// Schedule a flight
    Add(AddFlight),

    /// Show a flight by id
    Show(ShowFlight),

    /// List scheduled flights
    List(ListFlights),

    /// Search flights by route and schedule
    Search(SearchFlights),

    /// Update a flight's fields
    Update(UpdateFlight),

    /// Remove a flight and its reservations
    Remove(RemoveFlight),
}

impl FlightCommand {
    /// Execute the selected flight subcommand.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        match self {
            Self::Add(cmd) => cmd.execute(global),
            Self::Show(cmd) => cmd.execute(global),
            Self::List(cmd) => cmd.execute(global),
            Self::Search(cmd) => cmd.execute(global),
            Self::Update(cmd) => cmd.execute(global),
            Self::Remove(cmd) => cmd.execute(global),
        }
    }
}

fn parse_state(value: &str, field: &str) -> Result<StateCode, CliError> {
    StateCode::parse(value)
        .map_err(|e| CliError::InvalidArguments(format!("{field}: {e}")))
}

fn parse_capacity(value: i64) -> Result<Capacity, CliError> {
    Capacity::try_from(value).map_err(|e| CliError::InvalidArguments(e.to_string()))
}

/// Schedule a flight.
#[derive(Args)]
pub struct AddFlight {
    /// Origin state code (two letters)
    #[arg(long)]
    pub origin: String,

    /// Destination state code (two letters)
    #[arg(long)]
    pub destination: String,

    /// Departure date (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub date: String,

    /// Departure time (HH:MM, UTC)
    #[arg(long)]
    pub time: String,

    /// Seat capacity (strictly between 50 and 500)
    #[arg(long)]
    pub capacity: i64,
}

impl AddFlight {
    fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let departure_at =
            combine_date_time(parse_date(&self.date)?, parse_time(&self.time)?);
        let draft = FlightDraft::new(
            parse_state(&self.origin, "origin")?,
            parse_state(&self.destination, "destination")?,
            departure_at,
            parse_capacity(self.capacity)?,
        );

        let mut db = open_database(global)?;
        let flight = db.create_flight(&draft, Utc::now())?;

        print_json(&flight)?;
        if !global.quiet {
            eprintln!("Scheduled flight {}", flight.id);
        }
        Ok(())
    }
}

/// Show a flight.
#[derive(Args)]
pub struct ShowFlight {
    /// Flight id
    pub id: i64,
}

impl ShowFlight {
    fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let db = open_database(global)?;
        let flight = db
            .get_flight(self.id)?
            .ok_or_else(|| Error::not_found("flight", self.id))?;
        print_json(&flight)?;
        Ok(())
    }
}

/// List flights.
#[derive(Args)]
pub struct ListFlights {
    /// Number of flights to skip
    #[arg(long, default_value_t = 0)]
    pub offset: u32,

    /// Maximum number of flights to return
    #[arg(long, default_value_t = 10)]
    pub limit: u32,
}

impl ListFlights {
    fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let db = open_database(global)?;
        let flights = db.list_flights(self.offset, self.limit)?;
        print_json(&flights)?;
        Ok(())
    }
}

/// Search flights by optional filters.
#[derive(Args)]
pub struct SearchFlights {
    /// Filter by origin state code
    #[arg(long)]
    pub origin: Option<String>,

    /// Filter by destination state code
    #[arg(long)]
    pub destination: Option<String>,

    /// Filter by departure date (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub date: Option<String>,

    /// Filter by departure time (HH:MM, UTC)
    #[arg(long)]
    pub time: Option<String>,
}

impl SearchFlights {
    fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let mut filter = FlightFilter::new();
        if let Some(origin) = &self.origin {
            filter = filter.with_origin(parse_state(origin, "origin")?);
        }
        if let Some(destination) = &self.destination {
            filter = filter.with_destination(parse_state(destination, "destination")?);
        }
        if let Some(date) = &self.date {
            filter = filter.with_date(parse_date(date)?);
        }
        if let Some(time) = &self.time {
            filter = filter.with_time(parse_time(time)?);
        }

        let db = open_database(global)?;
        let flights = db.search_flights(&filter)?;
        print_json(&flights)?;
        Ok(())
    }
}

/// Update a flight.
#[derive(Args)]
pub struct UpdateFlight {
    /// Flight id
    pub id: i64,

    /// New origin state code
    #[arg(long)]
    pub origin: Option<String>,

    /// New destination state code
    #[arg(long)]
    pub destination: Option<String>,

    /// New departure date (YYYY-MM-DD, UTC; requires --time)
    #[arg(long)]
    pub date: Option<String>,

    /// New departure time (HH:MM, UTC; requires --date)
    #[arg(long)]
    pub time: Option<String>,

    /// New seat capacity
    #[arg(long)]
    pub capacity: Option<i64>,
}

impl UpdateFlight {
    fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let mut patch = FlightPatch::new();
        if let Some(origin) = &self.origin {
            patch = patch.with_origin(parse_state(origin, "origin")?);
        }
        if let Some(destination) = &self.destination {
            patch = patch.with_destination(parse_state(destination, "destination")?);
        }
        if let Some(capacity) = self.capacity {
            patch = patch.with_capacity(parse_capacity(capacity)?);
        }
        match (&self.date, &self.time) {
            (Some(date), Some(time)) => {
                patch = patch
                    .with_departure_at(combine_date_time(parse_date(date)?, parse_time(time)?));
            }
            (None, None) => {}
            _ => {
                return Err(CliError::InvalidArguments(
                    "rescheduling requires both --date and --time".to_string(),
                ));
            }
        }
        if patch.is_empty() {
            return Err(CliError::InvalidArguments(
                "at least one field to update is required".to_string(),
            ));
        }

        let mut db = open_database(global)?;
        let flight = db.update_flight(self.id, &patch, Utc::now())?;

        print_json(&flight)?;
        if !global.quiet {
            eprintln!("Updated flight {}", flight.id);
        }
        Ok(())
    }
}

/// Remove a flight.
#[derive(Args)]
pub struct RemoveFlight {
    /// Flight id
    pub id: i64,
}

impl RemoveFlight {
    fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let mut db = open_database(global)?;
        db.delete_flight(self.id)?;
        if !global.quiet {
            eprintln!("Removed flight {}", self.id);
        }
        Ok(())
    }
}

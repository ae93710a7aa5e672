//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{
    FlightCommand, MenuCommand, PassengerCommand, ReportCommand, ReservationCommand,
};

/// Command-line tool for managing flight reservations.
#[derive(Parser)]
#[command(name = "voa")]
#[command(version, about = "Manage passengers, flights, and reservations", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Override the data directory location
    #[arg(long, value_name = "PATH", global = true, env = "VOA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override the default busy timeout (in seconds)
    #[arg(long, value_name = "SECONDS", global = true, env = "VOA_BUSY_TIMEOUT")]
    pub busy_timeout: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Manage passengers
    #[command(subcommand)]
    Passenger(PassengerCommand),

    /// Manage flights
    #[command(subcommand)]
    Flight(FlightCommand),

    /// Manage reservations
    #[command(subcommand)]
    Reservation(ReservationCommand),

    /// Print the fleet report
    Report(ReportCommand),

    /// Run the interactive console menu
    Menu(MenuCommand),
}

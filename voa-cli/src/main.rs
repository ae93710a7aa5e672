//! Main entry point for the voa CLI.
//!
//! This is the command-line interface for the voa flight reservation
//! system. It provides commands for the three entities plus reporting:
//! - `passenger`: register, list, update, and remove passengers
//! - `flight`: schedule, search, update, and remove flights
//! - `reservation`: book, re-point, and cancel reservations
//! - `report`: print the fleet report
//! - `menu`: run the interactive console menu

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let _logger = voa::init_logger(cli.verbose, cli.quiet);

    // Convert CLI args to GlobalOptions
    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        data_dir: cli.data_dir,
        busy_timeout: cli.busy_timeout,
    };

    // Execute the command
    let result = match cli.command {
        cli::Command::Passenger(cmd) => cmd.execute(&global),
        cli::Command::Flight(cmd) => cmd.execute(&global),
        cli::Command::Reservation(cmd) => cmd.execute(&global),
        cli::Command::Report(cmd) => cmd.execute(&global),
        cli::Command::Menu(cmd) => cmd.execute(&global),
    };

    // Handle errors and set exit code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

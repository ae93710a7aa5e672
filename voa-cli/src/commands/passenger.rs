//! Passenger command implementations.
//!
//! Registration, listing, update, and removal of passengers. Entity
//! output goes to stdout as JSON; status lines go to stderr.

use clap::{Args, Subcommand};
use voa::{Error, PassengerDraft, PassengerPatch};

use crate::error::CliError;
use crate::utils::{open_database, print_json, GlobalOptions};

/// Passenger subcommands.
#[derive(Subcommand)]
pub enum PassengerCommand {
    /// Register a passenger
    Add(AddPassenger),

    /// Show a passenger by id
    Show(ShowPassenger),

    /// List registered passengers
    List(ListPassengers),

    /// Update a passenger's fields
    Update(UpdatePassenger),

    /// Remove a passenger and their reservations
    Remove(RemovePassenger),
}

impl PassengerCommand {
    /// Execute the selected passenger subcommand.
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

/// Register a passenger.
#[derive(Args)]
pub struct AddPassenger {
    /// Full name (first and last name at least)
    #[arg(long)]
    pub name: String,

    /// Email address (unique)
    #[arg(long)]
    pub email: String,

    /// Document number, 11 digits (unique)
    #[arg(long)]
    pub document: String,
}

impl AddPassenger {
    fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let draft = PassengerDraft::new(self.name, &self.email, self.document)
            .map_err(Error::from)
            .map_err(CliError::from)?;

        let mut db = open_database(global)?;
        let passenger = db.create_passenger(&draft)?;

        print_json(&passenger)?;
        if !global.quiet {
            eprintln!("Registered passenger {}", passenger.id);
        }
        Ok(())
    }
}

/// Show a passenger.
#[derive(Args)]
pub struct ShowPassenger {
    /// Passenger id
    pub id: i64,
}

impl ShowPassenger {
    fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let db = open_database(global)?;
        let passenger = db
            .get_passenger(self.id)?
            .ok_or_else(|| Error::not_found("passenger", self.id))?;
        print_json(&passenger)?;
        Ok(())
    }
}

/// List passengers.
#[derive(Args)]
pub struct ListPassengers {
    /// Number of passengers to skip
    #[arg(long, default_value_t = 0)]
    pub offset: u32,

    /// Maximum number of passengers to return
    #[arg(long, default_value_t = 10)]
    pub limit: u32,
}

impl ListPassengers {
    fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let db = open_database(global)?;
        let passengers = db.list_passengers(self.offset, self.limit)?;
        print_json(&passengers)?;
        Ok(())
    }
}

/// Update a passenger.
#[derive(Args)]
pub struct UpdatePassenger {
    /// Passenger id
    pub id: i64,

    /// New full name
    #[arg(long)]
    pub name: Option<String>,

    /// New email address
    #[arg(long)]
    pub email: Option<String>,

    /// New document number
    #[arg(long)]
    pub document: Option<String>,
}

impl UpdatePassenger {
    fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let mut patch = PassengerPatch::new();
        if let Some(name) = self.name {
            patch = patch.with_full_name(name);
        }
        if let Some(email) = self.email {
            patch = patch.with_email(email);
        }
        if let Some(document) = self.document {
            patch = patch.with_document(document);
        }
        if patch.is_empty() {
            return Err(CliError::InvalidArguments(
                "at least one of --name, --email, --document is required".to_string(),
            ));
        }

        let mut db = open_database(global)?;
        let passenger = db.update_passenger(self.id, &patch)?;

        print_json(&passenger)?;
        if !global.quiet {
            eprintln!("Updated passenger {}", passenger.id);
        }
        Ok(())
    }
}

/// Remove a passenger.
#[derive(Args)]
pub struct RemovePassenger {
    /// Passenger id
    pub id: i64,
}

impl RemovePassenger {
    fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let mut db = open_database(global)?;
        db.delete_passenger(self.id)?;
        if !global.quiet {
            eprintln!("Removed passenger {}", self.id);
        }
        Ok(())
    }
}

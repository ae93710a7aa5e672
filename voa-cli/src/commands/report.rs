//! Report command implementation.

use chrono::Utc;
use clap::Args;

use crate::error::CliError;
use crate::utils::{open_database, print_json, GlobalOptions};

/// Print the fleet report.
///
/// Route counts by origin and destination plus the three departure
/// buckets (departed, about to depart, upcoming), evaluated against the
/// wall clock at the moment of the call.
#[derive(Args)]
pub struct ReportCommand {}

impl ReportCommand {
    /// Execute the report command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let db = open_database(global)?;
        let report = db.generate_report(Utc::now())?;
        print_json(&report)?;
        Ok(())
    }
}

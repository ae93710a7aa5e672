//! Utility functions for CLI operations.
//!
//! Shared plumbing for the commands: global options, database opening,
//! and the date/time argument formats.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use voa::{resolve_database_path, Database, DatabaseConfig};

use crate::error::CliError;

/// Date arguments use the calendar-day format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time arguments use 24-hour hours and minutes.
pub const TIME_FORMAT: &str = "%H:%M";

/// Global CLI options shared across all commands.
#[derive(Debug, Clone)]
#[allow(dead_code)] // verbose feeds the logger in main.rs
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Override the data directory location.
    pub data_dir: Option<PathBuf>,

    /// Override the default busy timeout (in seconds).
    pub busy_timeout: Option<u32>,
}

/// Open the database from global options.
///
/// The database file is `<data-dir>/voa.db`; without `--data-dir` the
/// path comes from `VOA_DATA_DIR` or falls back to `~/.voa/voa.db`.
pub fn open_database(global: &GlobalOptions) -> Result<Database, CliError> {
    let db_path = match &global.data_dir {
        Some(data_dir) => data_dir.join("voa.db"),
        None => resolve_database_path()?,
    };

    let mut db_config = DatabaseConfig::new(db_path);
    if let Some(timeout_seconds) = global.busy_timeout {
        db_config =
            db_config.with_busy_timeout(std::time::Duration::from_secs(timeout_seconds.into()));
    }

    Database::open(db_config).map_err(CliError::from)
}

/// Parse a `YYYY-MM-DD` date argument.
pub fn parse_date(value: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| CliError::InvalidArguments(format!("invalid date '{value}' (expected YYYY-MM-DD)")))
}

/// Parse an `HH:MM` time argument.
pub fn parse_time(value: &str) -> Result<NaiveTime, CliError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|_| CliError::InvalidArguments(format!("invalid time '{value}' (expected HH:MM)")))
}

/// Combine date and time arguments into a UTC departure instant.
pub fn combine_date_time(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(time))
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let date = parse_date("2026-08-25").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 8, 25).unwrap());
        assert!(parse_date("25/08/2026").is_err());
    }

    #[test]
    fn test_parse_time() {
        let time = parse_time("14:30").unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(14, 30, 0).unwrap());
        assert!(parse_time("2pm").is_err());
    }

    #[test]
    fn test_combine_date_time_is_utc() {
        let at = combine_date_time(
            NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
            NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
        );
        assert_eq!(at, Utc.with_ymd_and_hms(2026, 8, 25, 14, 30, 0).unwrap());
    }
}

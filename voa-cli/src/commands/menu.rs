//! Interactive console menu.
//!
//! A line-oriented menu over the same engine operations the subcommands
//! expose. Failed operations print their error and the menu keeps going;
//! end-of-input anywhere unwinds cleanly, so the menu can be driven by a
//! pipe as well as a terminal.

use std::io::{self, BufRead, Write};

use chrono::Utc;
use clap::Args;
use voa::{
    Capacity, Database, Flight, FlightDraft, FlightFilter, FlightPatch, PassengerDraft,
    PassengerPatch, ReservationPatch, StateCode,
};

use crate::error::CliError;
use crate::utils::{combine_date_time, open_database, parse_date, parse_time, GlobalOptions};

/// Run the interactive console menu.
#[derive(Args)]
pub struct MenuCommand {}

impl MenuCommand {
    /// Execute the menu command against stdin/stdout.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let mut db = open_database(global)?;
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut out = io::stdout();
        run_menu(&mut db, &mut input, &mut out)
    }
}

/// Read one trimmed line after printing a prompt. `None` means the input
/// was exhausted and the menu should stop.
fn prompt(
    input: &mut impl BufRead,
    out: &mut impl Write,
    text: &str,
) -> Result<Option<String>, CliError> {
    write!(out, "{text}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn parse_id(value: &str, field: &str) -> Result<i64, CliError> {
    value
        .parse()
        .map_err(|_| CliError::InvalidArguments(format!("invalid {field} '{value}'")))
}

fn format_flight(flight: &Flight) -> String {
    format!(
        "ID: {}, Origin: {}, Destination: {}, Date: {}, Time: {}, Capacity: {}, Occupancy: {}",
        flight.id,
        flight.origin,
        flight.destination,
        flight.departure_at.format("%Y-%m-%d"),
        flight.departure_at.format("%H:%M"),
        flight.capacity,
        flight.occupancy,
    )
}

/// Report an operation outcome without leaving the menu.
fn report_outcome(
    out: &mut impl Write,
    result: Result<String, CliError>,
) -> Result<(), CliError> {
    match result {
        Ok(message) => writeln!(out, "{message}")?,
        Err(CliError::Io(e)) => return Err(CliError::Io(e)),
        Err(e) => writeln!(out, "Error: {e}")?,
    }
    Ok(())
}

/// Run the menu loop until "exit" is chosen or the input ends.
pub fn run_menu(
    db: &mut Database,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<(), CliError> {
    loop {
        writeln!(out, "\n--- Main Menu ---")?;
        writeln!(out, "1. Manage flights")?;
        writeln!(out, "2. Manage passengers")?;
        writeln!(out, "3. Manage reservations")?;
        writeln!(out, "4. Generate report")?;
        writeln!(out, "0. Exit")?;

        let Some(choice) = prompt(input, out, "Choose an option: ")? else {
            return Ok(());
        };
        match choice.as_str() {
            "1" => {
                if !flight_menu(db, input, out)? {
                    return Ok(());
                }
            }
            "2" => {
                if !passenger_menu(db, input, out)? {
                    return Ok(());
                }
            }
            "3" => {
                if !reservation_menu(db, input, out)? {
                    return Ok(());
                }
            }
            "4" => print_report(db, out)?,
            "0" => {
                writeln!(out, "Goodbye.")?;
                return Ok(());
            }
            _ => writeln!(out, "Invalid option, try again.")?,
        }
    }
}

/// Returns `false` when the input ended and the whole menu should stop.
fn flight_menu(
    db: &mut Database,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool, CliError> {
    loop {
        writeln!(out, "\n--- Flight Menu ---")?;
        writeln!(out, "1. Schedule flight")?;
        writeln!(out, "2. Update flight")?;
        writeln!(out, "3. List flights")?;
        writeln!(out, "4. Search flights")?;
        writeln!(out, "5. Remove flight")?;
        writeln!(out, "0. Back")?;

        let Some(choice) = prompt(input, out, "Choose an option: ")? else {
            return Ok(false);
        };
        let done = match choice.as_str() {
            "1" => add_flight(db, input, out)?,
            "2" => update_flight(db, input, out)?,
            "3" => {
                for flight in db.list_flights(0, 100)? {
                    writeln!(out, "{}", format_flight(&flight))?;
                }
                true
            }
            "4" => search_flights(db, input, out)?,
            "5" => remove_flight(db, input, out)?,
            "0" => return Ok(true),
            _ => {
                writeln!(out, "Invalid option, try again.")?;
                true
            }
        };
        if !done {
            return Ok(false);
        }
    }
}

fn add_flight(
    db: &mut Database,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool, CliError> {
    let Some(origin) = prompt(input, out, "Origin state (XX): ")? else {
        return Ok(false);
    };
    let Some(destination) = prompt(input, out, "Destination state (XX): ")? else {
        return Ok(false);
    };
    let Some(date) = prompt(input, out, "Departure date (YYYY-MM-DD): ")? else {
        return Ok(false);
    };
    let Some(time) = prompt(input, out, "Departure time (HH:MM): ")? else {
        return Ok(false);
    };
    let Some(capacity) = prompt(input, out, "Seat capacity (50-500 exclusive): ")? else {
        return Ok(false);
    };

    let result = (|| {
        let origin = StateCode::parse(&origin)
            .map_err(|e| CliError::InvalidArguments(e.to_string()))?;
        let destination = StateCode::parse(&destination)
            .map_err(|e| CliError::InvalidArguments(e.to_string()))?;
        let departure_at = combine_date_time(parse_date(&date)?, parse_time(&time)?);
        let capacity = Capacity::try_from(parse_id(&capacity, "capacity")?)
            .map_err(|e| CliError::InvalidArguments(e.to_string()))?;

        let draft = FlightDraft::new(origin, destination, departure_at, capacity);
        let flight = db.create_flight(&draft, Utc::now())?;
        Ok(format!("Flight scheduled with id {}.", flight.id))
    })();
    report_outcome(out, result)?;
    Ok(true)
}

fn update_flight(
    db: &mut Database,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool, CliError> {
    let Some(id) = prompt(input, out, "Flight id to update: ")? else {
        return Ok(false);
    };
    let Some(origin) = prompt(input, out, "New origin (XX, blank to keep): ")? else {
        return Ok(false);
    };
    let Some(destination) = prompt(input, out, "New destination (XX, blank to keep): ")? else {
        return Ok(false);
    };
    let Some(date) = prompt(input, out, "New departure date (YYYY-MM-DD, blank to keep): ")?
    else {
        return Ok(false);
    };
    let Some(time) = prompt(input, out, "New departure time (HH:MM, blank to keep): ")? else {
        return Ok(false);
    };
    let Some(capacity) = prompt(input, out, "New capacity (blank to keep): ")? else {
        return Ok(false);
    };

    let result = (|| {
        let mut patch = FlightPatch::new();
        if !origin.is_empty() {
            patch = patch.with_origin(
                StateCode::parse(&origin).map_err(|e| CliError::InvalidArguments(e.to_string()))?,
            );
        }
        if !destination.is_empty() {
            patch = patch.with_destination(
                StateCode::parse(&destination)
                    .map_err(|e| CliError::InvalidArguments(e.to_string()))?,
            );
        }
        match (date.is_empty(), time.is_empty()) {
            (false, false) => {
                patch = patch
                    .with_departure_at(combine_date_time(parse_date(&date)?, parse_time(&time)?));
            }
            (true, true) => {}
            _ => {
                return Err(CliError::InvalidArguments(
                    "rescheduling needs both a date and a time".to_string(),
                ));
            }
        }
        if !capacity.is_empty() {
            patch = patch.with_capacity(
                Capacity::try_from(parse_id(&capacity, "capacity")?)
                    .map_err(|e| CliError::InvalidArguments(e.to_string()))?,
            );
        }

        let flight = db.update_flight(parse_id(&id, "flight id")?, &patch, Utc::now())?;
        Ok(format!("Flight {} updated.", flight.id))
    })();
    report_outcome(out, result)?;
    Ok(true)
}

fn search_flights(
    db: &mut Database,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool, CliError> {
    writeln!(out, "1. By origin")?;
    writeln!(out, "2. By destination")?;
    writeln!(out, "3. By date")?;
    writeln!(out, "4. By time")?;
    let Some(choice) = prompt(input, out, "Filter by: ")? else {
        return Ok(false);
    };

    let mut filter = FlightFilter::new();
    match choice.as_str() {
        "1" => {
            let Some(origin) = prompt(input, out, "Origin state (XX): ")? else {
                return Ok(false);
            };
            match StateCode::parse(&origin) {
                Ok(code) => filter = filter.with_origin(code),
                Err(e) => {
                    writeln!(out, "Error: {e}")?;
                    return Ok(true);
                }
            }
        }
        "2" => {
            let Some(destination) = prompt(input, out, "Destination state (XX): ")? else {
                return Ok(false);
            };
            match StateCode::parse(&destination) {
                Ok(code) => filter = filter.with_destination(code),
                Err(e) => {
                    writeln!(out, "Error: {e}")?;
                    return Ok(true);
                }
            }
        }
        "3" => {
            let Some(date) = prompt(input, out, "Departure date (YYYY-MM-DD): ")? else {
                return Ok(false);
            };
            match parse_date(&date) {
                Ok(date) => filter = filter.with_date(date),
                Err(e) => {
                    writeln!(out, "Error: {e}")?;
                    return Ok(true);
                }
            }
        }
        "4" => {
            let Some(time) = prompt(input, out, "Departure time (HH:MM): ")? else {
                return Ok(false);
            };
            match parse_time(&time) {
                Ok(time) => filter = filter.with_time(time),
                Err(e) => {
                    writeln!(out, "Error: {e}")?;
                    return Ok(true);
                }
            }
        }
        _ => {}
    }

    let flights = db.search_flights(&filter)?;
    if flights.is_empty() {
        writeln!(out, "No flights matched the filter.")?;
    }
    for flight in flights {
        writeln!(out, "{}", format_flight(&flight))?;
    }
    Ok(true)
}

fn remove_flight(
    db: &mut Database,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool, CliError> {
    let Some(id) = prompt(input, out, "Flight id to remove: ")? else {
        return Ok(false);
    };
    let result = (|| {
        db.delete_flight(parse_id(&id, "flight id")?)?;
        Ok("Flight removed.".to_string())
    })();
    report_outcome(out, result)?;
    Ok(true)
}

fn passenger_menu(
    db: &mut Database,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool, CliError> {
    loop {
        writeln!(out, "\n--- Passenger Menu ---")?;
        writeln!(out, "1. Register passenger")?;
        writeln!(out, "2. List passengers")?;
        writeln!(out, "3. Update passenger")?;
        writeln!(out, "4. Remove passenger")?;
        writeln!(out, "0. Back")?;

        let Some(choice) = prompt(input, out, "Choose an option: ")? else {
            return Ok(false);
        };
        let done = match choice.as_str() {
            "1" => add_passenger(db, input, out)?,
            "2" => {
                for passenger in db.list_passengers(0, 100)? {
                    writeln!(
                        out,
                        "ID: {}, Name: {}, Email: {}, Document: {}",
                        passenger.id, passenger.full_name, passenger.email, passenger.document
                    )?;
                }
                true
            }
            "3" => update_passenger(db, input, out)?,
            "4" => remove_passenger(db, input, out)?,
            "0" => return Ok(true),
            _ => {
                writeln!(out, "Invalid option, try again.")?;
                true
            }
        };
        if !done {
            return Ok(false);
        }
    }
}

fn add_passenger(
    db: &mut Database,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool, CliError> {
    let Some(name) = prompt(input, out, "Full name: ")? else {
        return Ok(false);
    };
    let Some(email) = prompt(input, out, "Email: ")? else {
        return Ok(false);
    };
    let Some(document) = prompt(input, out, "Document (11 digits): ")? else {
        return Ok(false);
    };

    let result = (|| {
        let draft = PassengerDraft::new(name, &email, document).map_err(voa::Error::from)?;
        let passenger = db.create_passenger(&draft)?;
        Ok(format!(
            "Passenger registered with id {}. Keep this id for bookings.",
            passenger.id
        ))
    })();
    report_outcome(out, result)?;
    Ok(true)
}

fn update_passenger(
    db: &mut Database,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool, CliError> {
    let Some(id) = prompt(input, out, "Passenger id to update: ")? else {
        return Ok(false);
    };
    let Some(name) = prompt(input, out, "New name (blank to keep): ")? else {
        return Ok(false);
    };
    let Some(email) = prompt(input, out, "New email (blank to keep): ")? else {
        return Ok(false);
    };
    let Some(document) = prompt(input, out, "New document (blank to keep): ")? else {
        return Ok(false);
    };

    let result = (|| {
        let mut patch = PassengerPatch::new();
        if !name.is_empty() {
            patch = patch.with_full_name(name);
        }
        if !email.is_empty() {
            patch = patch.with_email(email);
        }
        if !document.is_empty() {
            patch = patch.with_document(document);
        }
        if patch.is_empty() {
            return Err(CliError::InvalidArguments(
                "nothing to update".to_string(),
            ));
        }
        let passenger = db.update_passenger(parse_id(&id, "passenger id")?, &patch)?;
        Ok(format!("Passenger {} updated.", passenger.id))
    })();
    report_outcome(out, result)?;
    Ok(true)
}

fn remove_passenger(
    db: &mut Database,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool, CliError> {
    let Some(id) = prompt(input, out, "Passenger id to remove: ")? else {
        return Ok(false);
    };
    let result = (|| {
        db.delete_passenger(parse_id(&id, "passenger id")?)?;
        Ok("Passenger removed.".to_string())
    })();
    report_outcome(out, result)?;
    Ok(true)
}

fn reservation_menu(
    db: &mut Database,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool, CliError> {
    loop {
        writeln!(out, "\n--- Reservation Menu ---")?;
        writeln!(out, "1. Book reservation")?;
        writeln!(out, "2. Update reservation")?;
        writeln!(out, "3. List reservations")?;
        writeln!(out, "4. Cancel reservation")?;
        writeln!(out, "0. Back")?;

        let Some(choice) = prompt(input, out, "Choose an option: ")? else {
            return Ok(false);
        };
        let done = match choice.as_str() {
            "1" => add_reservation(db, input, out)?,
            "2" => update_reservation(db, input, out)?,
            "3" => {
                for reservation in db.list_reservations(0, 100)? {
                    writeln!(
                        out,
                        "ID: {}, Passenger ID: {}, Flight ID: {}",
                        reservation.id, reservation.passenger_id, reservation.flight_id
                    )?;
                }
                true
            }
            "4" => remove_reservation(db, input, out)?,
            "0" => return Ok(true),
            _ => {
                writeln!(out, "Invalid option, try again.")?;
                true
            }
        };
        if !done {
            return Ok(false);
        }
    }
}

fn add_reservation(
    db: &mut Database,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool, CliError> {
    let Some(passenger_id) = prompt(input, out, "Passenger id: ")? else {
        return Ok(false);
    };
    let Some(flight_id) = prompt(input, out, "Flight id: ")? else {
        return Ok(false);
    };

    let result = (|| {
        let reservation = db.create_reservation(
            parse_id(&passenger_id, "passenger id")?,
            parse_id(&flight_id, "flight id")?,
            Utc::now(),
        )?;
        Ok(format!("Reservation booked with id {}.", reservation.id))
    })();
    report_outcome(out, result)?;
    Ok(true)
}

fn update_reservation(
    db: &mut Database,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool, CliError> {
    let Some(id) = prompt(input, out, "Reservation id to update: ")? else {
        return Ok(false);
    };
    let Some(passenger_id) = prompt(input, out, "New passenger id (blank to keep): ")? else {
        return Ok(false);
    };
    let Some(flight_id) = prompt(input, out, "New flight id (blank to keep): ")? else {
        return Ok(false);
    };

    let result = (|| {
        let mut patch = ReservationPatch::new();
        if !passenger_id.is_empty() {
            patch = patch.with_passenger_id(parse_id(&passenger_id, "passenger id")?);
        }
        if !flight_id.is_empty() {
            patch = patch.with_flight_id(parse_id(&flight_id, "flight id")?);
        }
        if patch.is_empty() {
            return Err(CliError::InvalidArguments(
                "nothing to update".to_string(),
            ));
        }
        let reservation = db.update_reservation(parse_id(&id, "reservation id")?, &patch, Utc::now())?;
        Ok(format!("Reservation {} updated.", reservation.id))
    })();
    report_outcome(out, result)?;
    Ok(true)
}

fn remove_reservation(
    db: &mut Database,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool, CliError> {
    let Some(id) = prompt(input, out, "Reservation id to cancel: ")? else {
        return Ok(false);
    };
    let result = (|| {
        db.delete_reservation(parse_id(&id, "reservation id")?)?;
        Ok("Reservation cancelled.".to_string())
    })();
    report_outcome(out, result)?;
    Ok(true)
}

fn print_report(db: &Database, out: &mut impl Write) -> Result<(), CliError> {
    let report = db.generate_report(Utc::now())?;

    writeln!(out, "\n--- Flights by origin ---")?;
    if report.origins.is_empty() {
        writeln!(out, "No flights scheduled.")?;
    }
    for count in &report.origins {
        writeln!(out, "State: {}, Flights: {}", count.state, count.flights)?;
    }

    writeln!(out, "\n--- Flights by destination ---")?;
    if report.destinations.is_empty() {
        writeln!(out, "No flights scheduled.")?;
    }
    for count in &report.destinations {
        writeln!(out, "State: {}, Flights: {}", count.state, count.flights)?;
    }

    writeln!(out, "\n--- Departed flights ---")?;
    if report.departed.is_empty() {
        writeln!(out, "No flights have departed.")?;
    }
    for flight in &report.departed {
        writeln!(out, "{}", format_flight(flight))?;
    }

    writeln!(out, "\n--- Flights about to depart ---")?;
    if report.about_to_depart.is_empty() {
        writeln!(out, "No flights are about to depart.")?;
    }
    for flight in &report.about_to_depart {
        writeln!(out, "{}", format_flight(flight))?;
    }

    writeln!(out, "\n--- Upcoming flights ---")?;
    if report.upcoming.is_empty() {
        writeln!(out, "No upcoming flights.")?;
    }
    for flight in &report.upcoming {
        writeln!(out, "{}", format_flight(flight))?;
    }

    Ok(())
}

//! Command implementations.

mod flight;
mod menu;
mod passenger;
mod report;
mod reservation;

pub use flight::FlightCommand;
pub use menu::MenuCommand;
pub use passenger::PassengerCommand;
pub use report::ReportCommand;
pub use reservation::ReservationCommand;

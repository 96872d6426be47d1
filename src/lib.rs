//! Client for the Tello text SDK
//!
//! [`session::CommandSession`] owns the UDP exchange and command mode.
//! [`command::Pilot`] and [`command::FlightPlan`] compose commands on top of
//! it, and [`command::Repl`] maps typed lines onto the pilot.

pub mod command;
pub mod config;
pub mod session;
pub mod telemetry;
pub mod transport;

pub use command::{FlightPlan, Pilot, PlanValidationError, Repl};
pub use config::TelloConfig;
pub use session::CommandSession;
pub use tello_shared::{CommandOutcome, Direction, DroneCommand};
pub use transport::{TransportError, UdpConnector};

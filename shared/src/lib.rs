//! Tello Shared Protocol Types
//!
//! This crate provides the I/O-free half of the Tello text SDK: the command
//! grammar, response classification, parameter validation, the command-mode
//! state machine and the telemetry status-string parser. It is shared by the
//! pilot client and the device simulator.

pub mod commands;
pub mod state_machine;
pub mod telemetry;
pub mod validation;

pub use commands::{CommandParseError, Direction, DroneCommand};
pub use state_machine::{CommandMode, ModeTransition};
pub use telemetry::{TelemetryData, TelemetryError};
pub use validation::ValidationRule;

/// Literal reply strings used by the device
pub mod response {
    /// Reply for an accepted command
    pub const OK: &str = "ok";

    /// Reply for a rejected command
    pub const ERROR: &str = "error";
}

/// Default network endpoints of the device
pub mod endpoints {
    use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

    /// Command endpoint (request/reply)
    pub const COMMAND_ADDRESS: SocketAddr =
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(192, 168, 10, 1), 8889));

    /// Local side of the command socket; any interface, ephemeral port
    pub const LOCAL_BIND: SocketAddr =
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0));

    /// Local endpoint the device streams telemetry to
    pub const TELEMETRY_BIND: SocketAddr =
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 8890));

    /// Reply wait in milliseconds for one command exchange
    pub const RESPONSE_TIMEOUT_MS: u64 = 10_000;
}

/// Inclusive parameter ranges enforced by the device
pub mod limits {
    /// Linear move distance in cm
    pub const DISTANCE_MIN: i32 = 20;
    pub const DISTANCE_MAX: i32 = 500;

    /// Rotation in degrees
    pub const DEGREES_MIN: i32 = 1;
    pub const DEGREES_MAX: i32 = 360;

    /// Speed in cm/s for `speed` and `go`
    pub const SPEED_MIN: i32 = 10;
    pub const SPEED_MAX: i32 = 100;

    /// Speed in cm/s for `curve`
    pub const CURVE_SPEED_MAX: i32 = 60;

    /// Per-axis coordinate for `go` and `curve`
    pub const COORDINATE_MIN: i32 = 20;
    pub const COORDINATE_MAX: i32 = 500;
}

/// Uniform result of every pilot operation
///
/// `message` carries either the raw device reply or a human-readable
/// validation/transport error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    succeeded: bool,
    message: String,
}

impl CommandOutcome {
    /// Create a successful outcome
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            message: message.into(),
        }
    }

    /// Create a failed outcome
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            message: message.into(),
        }
    }

    /// Classify a raw device reply
    ///
    /// Only the literal `error` sentinel counts as a failure; query payloads
    /// such as `87` or `20` are successes.
    pub fn from_response(response: impl Into<String>) -> Self {
        let message = response.into();
        Self {
            succeeded: message != response::ERROR,
            message,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }
}

impl std::fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

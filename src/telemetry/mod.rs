//! Device telemetry stream

mod listener;

pub use listener::TelemetryListener;
pub use tello_shared::TelemetryData;

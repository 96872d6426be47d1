//! Telemetry status-string parser
//!
//! The device pushes one ASCII datagram per state update:
//! ```text
//! pitch:0;roll:0;yaw:0;vgx:0;vgy:0;vgz:0;templ:60;temph:62;tof:10;h:0;bat:87;baro:12.34;time:0;agx:-1.00;agy:0.00;agz:-999.00;
//! ```
//! Segments are `key:value` pairs separated by `;`.

use std::collections::HashMap;
use std::str::FromStr;

use thiserror::Error;

/// Status-string keys
pub mod keys {
    pub const PITCH: &str = "pitch";
    pub const ROLL: &str = "roll";
    pub const YAW: &str = "yaw";
    pub const SPEED_X: &str = "vgx";
    pub const SPEED_Y: &str = "vgy";
    pub const SPEED_Z: &str = "vgz";
    pub const TEMPERATURE_LOW: &str = "templ";
    pub const TEMPERATURE_HIGH: &str = "temph";
    pub const TOF: &str = "tof";
    pub const HEIGHT: &str = "h";
    pub const BATTERY: &str = "bat";
    pub const BAROMETER: &str = "baro";
    pub const FLIGHT_TIME: &str = "time";
    pub const ACCELERATION_X: &str = "agx";
    pub const ACCELERATION_Y: &str = "agy";
    pub const ACCELERATION_Z: &str = "agz";
}

/// Errors that can occur while parsing a status string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("Missing telemetry field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Telemetry datagram is not valid UTF-8")]
    InvalidEncoding,
}

/// Attitude in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Attitude {
    pub pitch: i32,
    pub roll: i32,
    pub yaw: i32,
}

/// Velocity in dm/s per axis
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpeedMetrics {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Acceleration in 0.001g per axis
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AccelerationMetrics {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Temperature range (°C) and barometer (cm)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Environment {
    pub temperature_low: i32,
    pub temperature_high: i32,
    pub barometer: f64,
}

/// One parsed telemetry update
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TelemetryData {
    pub attitude: Attitude,
    pub speed: SpeedMetrics,
    pub acceleration: AccelerationMetrics,
    pub environment: Environment,
    /// Time-of-flight distance in cm
    pub tof: i32,
    /// Height in cm
    pub height: i32,
    /// Battery percentage
    pub battery: i32,
    /// Motor-on time in seconds
    pub flight_time: i32,
}

struct Fields<'a>(HashMap<&'a str, &'a str>);

impl<'a> Fields<'a> {
    fn split(data: &'a str) -> Self {
        let map = data
            .split(';')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .filter_map(|segment| segment.split_once(':'))
            .map(|(k, v)| (k.trim(), v.trim()))
            .collect();
        Self(map)
    }

    fn get<T: FromStr>(&self, field: &'static str) -> Result<T, TelemetryError> {
        let raw = self.0.get(field).ok_or(TelemetryError::MissingField(field))?;
        raw.parse().map_err(|_| TelemetryError::InvalidValue {
            field,
            value: raw.to_string(),
        })
    }
}

/// Parse a status string into [`TelemetryData`]
///
/// Unknown keys are ignored; every known key is required.
pub fn parse(data: &str) -> Result<TelemetryData, TelemetryError> {
    let fields = Fields::split(data);

    Ok(TelemetryData {
        attitude: Attitude {
            pitch: fields.get(keys::PITCH)?,
            roll: fields.get(keys::ROLL)?,
            yaw: fields.get(keys::YAW)?,
        },
        speed: SpeedMetrics {
            x: fields.get(keys::SPEED_X)?,
            y: fields.get(keys::SPEED_Y)?,
            z: fields.get(keys::SPEED_Z)?,
        },
        acceleration: AccelerationMetrics {
            x: fields.get(keys::ACCELERATION_X)?,
            y: fields.get(keys::ACCELERATION_Y)?,
            z: fields.get(keys::ACCELERATION_Z)?,
        },
        environment: Environment {
            temperature_low: fields.get(keys::TEMPERATURE_LOW)?,
            temperature_high: fields.get(keys::TEMPERATURE_HIGH)?,
            barometer: fields.get(keys::BAROMETER)?,
        },
        tof: fields.get(keys::TOF)?,
        height: fields.get(keys::HEIGHT)?,
        battery: fields.get(keys::BATTERY)?,
        flight_time: fields.get(keys::FLIGHT_TIME)?,
    })
}

/// Parse a raw telemetry datagram
pub fn parse_datagram(datagram: &[u8]) -> Result<TelemetryData, TelemetryError> {
    let text = std::str::from_utf8(datagram).map_err(|_| TelemetryError::InvalidEncoding)?;
    parse(text)
}

impl FromStr for TelemetryData {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl TelemetryData {
    /// Render in the device's status-string format
    pub fn to_status_string(&self) -> String {
        format!(
            "pitch:{};roll:{};yaw:{};vgx:{};vgy:{};vgz:{};templ:{};temph:{};tof:{};h:{};bat:{};baro:{:.2};time:{};agx:{:.2};agy:{:.2};agz:{:.2};\r\n",
            self.attitude.pitch,
            self.attitude.roll,
            self.attitude.yaw,
            self.speed.x,
            self.speed.y,
            self.speed.z,
            self.environment.temperature_low,
            self.environment.temperature_high,
            self.tof,
            self.height,
            self.battery,
            self.environment.barometer,
            self.flight_time,
            self.acceleration.x,
            self.acceleration.y,
            self.acceleration.z,
        )
    }
}

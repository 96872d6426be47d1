//! Simulated device state

use std::time::Instant;
use tello_shared::telemetry::{Attitude, Environment, TelemetryData};
use tello_shared::{response, validation, CommandMode, DroneCommand};
use tracing::{debug, info, warn};

const SERIAL_NUMBER: &str = "0TQZGANED0021X";
const SDK_VERSION: &str = "20";
const WIFI_SNR: &str = "90";
const TAKEOFF_HEIGHT: i32 = 80;

/// Everything the simulator remembers between datagrams
#[derive(Debug)]
pub struct SimulatedDevice {
    mode: CommandMode,
    speed: i32,
    battery: i32,
    height: i32,
    yaw: i32,
    /// Set while airborne
    airborne_since: Option<Instant>,
    /// Motor time from earlier flights
    flown_secs: u64,
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self {
            mode: CommandMode::Idle,
            speed: 10,
            battery: 100,
            height: 0,
            yaw: 0,
            airborne_since: None,
            flown_secs: 0,
        }
    }
}

impl SimulatedDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_flying(&self) -> bool {
        self.airborne_since.is_some()
    }

    fn flight_time(&self) -> u64 {
        let current = self
            .airborne_since
            .map(|start| start.elapsed().as_secs())
            .unwrap_or(0);
        self.flown_secs + current
    }

    fn touch_down(&mut self) {
        if let Some(start) = self.airborne_since.take() {
            self.flown_secs += start.elapsed().as_secs();
        }
        self.height = 0;
    }

    /// Answer one request line the way the device does
    pub fn respond(&mut self, line: &str) -> String {
        let command: DroneCommand = match line.trim().parse() {
            Ok(command) => command,
            Err(e) => {
                warn!("Unparsable request '{}': {}", line.trim(), e);
                return response::ERROR.to_string();
            }
        };

        if command == DroneCommand::Command {
            self.mode.on_mode_response(response::OK);
            info!("Entered command mode");
            return response::OK.to_string();
        }

        if !self.mode.is_ready() {
            debug!("'{}' before command mode", command);
            return response::ERROR.to_string();
        }

        let checked = validation::check(&command);
        if !checked.succeeded() {
            warn!("Rejected '{}': {}", command, checked.message());
            return response::ERROR.to_string();
        }

        self.apply(&command)
    }

    fn apply(&mut self, command: &DroneCommand) -> String {
        let accepted = match command {
            DroneCommand::TakeOff => {
                if self.is_flying() {
                    false
                } else {
                    self.airborne_since = Some(Instant::now());
                    self.height = TAKEOFF_HEIGHT;
                    true
                }
            }
            DroneCommand::Land | DroneCommand::Emergency => {
                self.touch_down();
                true
            }
            DroneCommand::Up(n) => self.is_flying() && {
                self.height += n;
                true
            },
            DroneCommand::Down(n) => self.is_flying() && {
                self.height = (self.height - n).max(0);
                true
            },
            DroneCommand::Clockwise(n) => self.is_flying() && {
                self.yaw = (self.yaw + n).rem_euclid(360);
                true
            },
            DroneCommand::CounterClockwise(n) => self.is_flying() && {
                self.yaw = (self.yaw - n).rem_euclid(360);
                true
            },
            DroneCommand::Left(_)
            | DroneCommand::Right(_)
            | DroneCommand::Forward(_)
            | DroneCommand::Back(_)
            | DroneCommand::Flip(_)
            | DroneCommand::Go { .. }
            | DroneCommand::Curve { .. }
            | DroneCommand::Stop => self.is_flying(),
            DroneCommand::Speed(n) => {
                self.speed = *n;
                true
            }
            DroneCommand::GetSpeed => return self.speed.to_string(),
            DroneCommand::GetBattery => return self.battery.to_string(),
            DroneCommand::GetTime => return format!("{}s", self.flight_time()),
            DroneCommand::GetWifi => return WIFI_SNR.to_string(),
            DroneCommand::GetSdk => return SDK_VERSION.to_string(),
            DroneCommand::GetSerialNumber => return SERIAL_NUMBER.to_string(),
            DroneCommand::StreamOn
            | DroneCommand::StreamOff
            | DroneCommand::Wifi { .. }
            | DroneCommand::AccessPoint { .. }
            | DroneCommand::Command => true,
        };

        if accepted {
            response::OK.to_string()
        } else {
            debug!("'{}' not possible in current state", command);
            response::ERROR.to_string()
        }
    }

    /// Current state as a telemetry update
    pub fn telemetry(&self) -> TelemetryData {
        TelemetryData {
            attitude: Attitude {
                pitch: 0,
                roll: 0,
                yaw: self.yaw,
            },
            environment: Environment {
                temperature_low: 55,
                temperature_high: 58,
                barometer: self.height as f64 / 100.0,
            },
            tof: if self.is_flying() { self.height } else { 10 },
            height: self.height,
            battery: self.battery,
            flight_time: self.flight_time() as i32,
            ..Default::default()
        }
    }

    /// Drain battery while airborne
    pub fn tick(&mut self) {
        if self.is_flying() && self.battery > 0 {
            self.battery -= 1;
        }
    }
}

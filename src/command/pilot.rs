//! Imperative command facade
//!
//! Every operation validates locally first. A rejected parameter set returns
//! its failure outcome without touching the network; otherwise command mode
//! is ensured and the command goes out as one exchange.

use super::plan::FlightPlan;
use crate::session::CommandSession;
use crate::transport::TransportConnector;
use tello_shared::{validation, CommandOutcome, Direction, DroneCommand};
use tracing::warn;

/// One facade per physical device
pub struct Pilot<C: TransportConnector> {
    session: CommandSession<C>,
}

impl<C: TransportConnector> Pilot<C> {
    pub fn new(session: CommandSession<C>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &CommandSession<C> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut CommandSession<C> {
        &mut self.session
    }

    pub fn into_session(self) -> CommandSession<C> {
        self.session
    }

    /// Validate, ensure command mode, send and classify the reply
    pub async fn run(&mut self, command: DroneCommand) -> CommandOutcome {
        let checked = validation::check(&command);
        if !checked.succeeded() {
            return checked;
        }

        let mode = self.session.ensure_command_mode().await;
        if !mode.succeeded() {
            return mode;
        }

        match self.session.send_and_await(&command.to_string()).await {
            Ok(reply) => {
                let outcome = CommandOutcome::from_response(reply);
                if !outcome.succeeded() {
                    warn!("Device rejected '{}'", command);
                }
                outcome
            }
            Err(e) => {
                warn!("'{}' failed: {}", command, e);
                CommandOutcome::failure(e.to_string())
            }
        }
    }

    /// Enter command mode without sending anything else
    pub async fn ignition(&mut self) -> CommandOutcome {
        self.session.ensure_command_mode().await
    }

    pub async fn take_off(&mut self) -> CommandOutcome {
        self.run(DroneCommand::TakeOff).await
    }

    pub async fn land(&mut self) -> CommandOutcome {
        self.run(DroneCommand::Land).await
    }

    pub async fn stream_on(&mut self) -> CommandOutcome {
        self.run(DroneCommand::StreamOn).await
    }

    pub async fn stream_off(&mut self) -> CommandOutcome {
        self.run(DroneCommand::StreamOff).await
    }

    pub async fn emergency(&mut self) -> CommandOutcome {
        self.run(DroneCommand::Emergency).await
    }

    pub async fn up(&mut self, distance: i32) -> CommandOutcome {
        self.run(DroneCommand::Up(distance)).await
    }

    pub async fn down(&mut self, distance: i32) -> CommandOutcome {
        self.run(DroneCommand::Down(distance)).await
    }

    pub async fn left(&mut self, distance: i32) -> CommandOutcome {
        self.run(DroneCommand::Left(distance)).await
    }

    pub async fn right(&mut self, distance: i32) -> CommandOutcome {
        self.run(DroneCommand::Right(distance)).await
    }

    pub async fn forward(&mut self, distance: i32) -> CommandOutcome {
        self.run(DroneCommand::Forward(distance)).await
    }

    pub async fn back(&mut self, distance: i32) -> CommandOutcome {
        self.run(DroneCommand::Back(distance)).await
    }

    pub async fn turn_clockwise(&mut self, degrees: i32) -> CommandOutcome {
        self.run(DroneCommand::Clockwise(degrees)).await
    }

    pub async fn turn_counter_clockwise(&mut self, degrees: i32) -> CommandOutcome {
        self.run(DroneCommand::CounterClockwise(degrees)).await
    }

    pub async fn flip(&mut self, direction: Direction) -> CommandOutcome {
        self.run(DroneCommand::Flip(direction)).await
    }

    /// Fly to (x, y, z) relative to the current position
    pub async fn go(&mut self, x: i32, y: i32, z: i32, speed: i32) -> CommandOutcome {
        self.run(DroneCommand::Go { x, y, z, speed }).await
    }

    /// Fly a curve through (x1, y1, z1) to (x2, y2, z2)
    #[allow(clippy::too_many_arguments)]
    pub async fn curve(
        &mut self,
        x1: i32,
        y1: i32,
        z1: i32,
        x2: i32,
        y2: i32,
        z2: i32,
        speed: i32,
    ) -> CommandOutcome {
        self.run(DroneCommand::Curve {
            x1,
            y1,
            z1,
            x2,
            y2,
            z2,
            speed,
        })
        .await
    }

    pub async fn stop(&mut self) -> CommandOutcome {
        self.run(DroneCommand::Stop).await
    }

    pub async fn set_speed(&mut self, speed: i32) -> CommandOutcome {
        self.run(DroneCommand::Speed(speed)).await
    }

    pub async fn set_wifi(&mut self, ssid: &str, password: &str) -> CommandOutcome {
        self.run(DroneCommand::Wifi {
            ssid: ssid.to_string(),
            password: password.to_string(),
        })
        .await
    }

    /// Join an existing access point instead of hosting one
    pub async fn set_access_point(&mut self, ssid: &str, password: &str) -> CommandOutcome {
        self.run(DroneCommand::AccessPoint {
            ssid: ssid.to_string(),
            password: password.to_string(),
        })
        .await
    }

    pub async fn get_speed(&mut self) -> CommandOutcome {
        self.run(DroneCommand::GetSpeed).await
    }

    pub async fn get_battery(&mut self) -> CommandOutcome {
        self.run(DroneCommand::GetBattery).await
    }

    pub async fn get_time(&mut self) -> CommandOutcome {
        self.run(DroneCommand::GetTime).await
    }

    /// Wi-Fi SNR
    pub async fn get_wifi(&mut self) -> CommandOutcome {
        self.run(DroneCommand::GetWifi).await
    }

    pub async fn get_sdk(&mut self) -> CommandOutcome {
        self.run(DroneCommand::GetSdk).await
    }

    pub async fn get_serial_number(&mut self) -> CommandOutcome {
        self.run(DroneCommand::GetSerialNumber).await
    }

    /// Run a flight plan on this pilot's session
    pub async fn execute_plan(&mut self, plan: &mut FlightPlan) -> Vec<CommandOutcome> {
        plan.execute(&mut self.session).await
    }

    pub async fn disconnect(&mut self) {
        self.session.disconnect().await;
    }
}

//! Deferred flight plans
//!
//! A [`FlightPlan`] queues commands without I/O, validates the whole queue in
//! one pass and then runs it best-effort through a [`CommandSession`].

use crate::session::CommandSession;
use crate::transport::TransportConnector;
use std::fmt;
use tello_shared::{response, CommandOutcome, Direction, DroneCommand, ValidationRule};
use thiserror::Error;
use tracing::{info, warn};

/// Aggregate validation failure; displays the full numbered report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{report}")]
pub struct PlanValidationError {
    report: String,
}

impl PlanValidationError {
    pub fn report(&self) -> &str {
        &self.report
    }
}

/// One pending command with its wire text and guarding rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedCommand {
    text: String,
    rule: Option<ValidationRule>,
    command: DroneCommand,
}

impl QueuedCommand {
    pub fn new(command: DroneCommand) -> Self {
        Self {
            text: command.to_string(),
            rule: command.validation_rule(),
            command,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rule(&self) -> Option<ValidationRule> {
        self.rule
    }

    pub fn command(&self) -> &DroneCommand {
        &self.command
    }

    /// Re-check the captured parameters; unguarded commands always pass
    pub fn validate(&self) -> CommandOutcome {
        match self.rule {
            Some(rule) => rule.apply(&self.command),
            None => CommandOutcome::success(response::OK),
        }
    }
}

/// Ordered queue of commands built fluently
#[derive(Debug, Clone, Default)]
pub struct FlightPlan {
    queue: Vec<QueuedCommand>,
}

impl FlightPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append any command
    pub fn push(&mut self, command: DroneCommand) -> &mut Self {
        self.queue.push(QueuedCommand::new(command));
        self
    }

    pub fn take_off(&mut self) -> &mut Self {
        self.push(DroneCommand::TakeOff)
    }

    pub fn land(&mut self) -> &mut Self {
        self.push(DroneCommand::Land)
    }

    pub fn stream_on(&mut self) -> &mut Self {
        self.push(DroneCommand::StreamOn)
    }

    pub fn stream_off(&mut self) -> &mut Self {
        self.push(DroneCommand::StreamOff)
    }

    pub fn emergency(&mut self) -> &mut Self {
        self.push(DroneCommand::Emergency)
    }

    pub fn up(&mut self, distance: i32) -> &mut Self {
        self.push(DroneCommand::Up(distance))
    }

    pub fn down(&mut self, distance: i32) -> &mut Self {
        self.push(DroneCommand::Down(distance))
    }

    pub fn left(&mut self, distance: i32) -> &mut Self {
        self.push(DroneCommand::Left(distance))
    }

    pub fn right(&mut self, distance: i32) -> &mut Self {
        self.push(DroneCommand::Right(distance))
    }

    pub fn forward(&mut self, distance: i32) -> &mut Self {
        self.push(DroneCommand::Forward(distance))
    }

    pub fn back(&mut self, distance: i32) -> &mut Self {
        self.push(DroneCommand::Back(distance))
    }

    pub fn turn_clockwise(&mut self, degrees: i32) -> &mut Self {
        self.push(DroneCommand::Clockwise(degrees))
    }

    pub fn turn_counter_clockwise(&mut self, degrees: i32) -> &mut Self {
        self.push(DroneCommand::CounterClockwise(degrees))
    }

    pub fn flip(&mut self, direction: Direction) -> &mut Self {
        self.push(DroneCommand::Flip(direction))
    }

    pub fn go(&mut self, x: i32, y: i32, z: i32, speed: i32) -> &mut Self {
        self.push(DroneCommand::Go { x, y, z, speed })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn curve(
        &mut self,
        x1: i32,
        y1: i32,
        z1: i32,
        x2: i32,
        y2: i32,
        z2: i32,
        speed: i32,
    ) -> &mut Self {
        self.push(DroneCommand::Curve {
            x1,
            y1,
            z1,
            x2,
            y2,
            z2,
            speed,
        })
    }

    pub fn stop(&mut self) -> &mut Self {
        self.push(DroneCommand::Stop)
    }

    pub fn set_speed(&mut self, speed: i32) -> &mut Self {
        self.push(DroneCommand::Speed(speed))
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn commands(&self) -> &[QueuedCommand] {
        &self.queue
    }

    /// Numbered validation report, one line per queued command
    pub fn to_report(&self) -> String {
        self.report().0
    }

    fn report(&self) -> (String, bool) {
        let mut all_valid = true;
        let lines: Vec<String> = self
            .queue
            .iter()
            .enumerate()
            .map(|(i, queued)| {
                let outcome = queued.validate();
                if outcome.succeeded() {
                    format!("{}. OK", i + 1)
                } else {
                    all_valid = false;
                    format!("{}. {}", i + 1, outcome.message())
                }
            })
            .collect();

        (lines.join("\n"), all_valid)
    }

    /// Check every queued command; fails with the full report if any is invalid
    ///
    /// The queue is left untouched either way.
    pub fn validate(&mut self) -> Result<&mut Self, PlanValidationError> {
        let (report, all_valid) = self.report();
        if all_valid {
            Ok(self)
        } else {
            Err(PlanValidationError { report })
        }
    }

    /// Send every queued command in order, then clear the queue and disconnect
    ///
    /// Individual failures do not stop the run; the outcomes come back in
    /// queue order.
    pub async fn execute<C: TransportConnector>(
        &mut self,
        session: &mut CommandSession<C>,
    ) -> Vec<CommandOutcome> {
        info!("Executing flight plan with {} commands", self.queue.len());

        let mode = session.ensure_command_mode().await;
        if !mode.succeeded() {
            warn!("Command mode not confirmed: {}", mode.message());
        }

        let mut outcomes = Vec::with_capacity(self.queue.len());
        for queued in self.queue.drain(..) {
            let outcome = match session.send_and_await(&queued.text).await {
                Ok(reply) => CommandOutcome::from_response(reply),
                Err(e) => CommandOutcome::failure(e.to_string()),
            };
            if !outcome.succeeded() {
                warn!("'{}' failed: {}", queued.text, outcome.message());
            }
            outcomes.push(outcome);
        }

        session.disconnect().await;
        outcomes
    }
}

impl fmt::Display for FlightPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, queued) in self.queue.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}. {}", i + 1, queued.text)?;
        }
        Ok(())
    }
}

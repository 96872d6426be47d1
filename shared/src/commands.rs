//! Tello SDK command grammar
//!
//! Every request is a single ASCII line: a verb followed by space-separated
//! positional parameters. [`DroneCommand`] carries exactly one operation's
//! typed fields; `Display` renders the wire text and `FromStr` parses it back.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::validation::ValidationRule;

/// Flip direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Back,
    Left,
    Right,
}

impl Direction {
    /// Single-letter wire code
    pub fn code(&self) -> &'static str {
        match self {
            Direction::Forward => "f",
            Direction::Back => "b",
            Direction::Left => "l",
            Direction::Right => "r",
        }
    }

    /// Strict code lookup
    pub fn parse_code(code: &str) -> Option<Direction> {
        match code {
            "f" => Some(Direction::Forward),
            "b" => Some(Direction::Back),
            "l" => Some(Direction::Left),
            "r" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Lenient code lookup; unknown codes map to `Forward`
    pub fn from_code(code: &str) -> Direction {
        Self::parse_code(code).unwrap_or_default()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Errors parsing a wire line into a [`DroneCommand`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown verb: {0}")]
    UnknownVerb(String),

    #[error("{verb} expects {expected} parameters, got {found}")]
    WrongArity {
        verb: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Invalid flip direction: {0}")]
    InvalidDirection(String),
}

/// One device operation with its typed parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DroneCommand {
    /// Enter SDK (command) mode
    Command,
    TakeOff,
    Land,
    StreamOn,
    StreamOff,
    /// Stop motors immediately
    Emergency,
    Up(i32),
    Down(i32),
    Left(i32),
    Right(i32),
    Forward(i32),
    Back(i32),
    Clockwise(i32),
    CounterClockwise(i32),
    Flip(Direction),
    Go {
        x: i32,
        y: i32,
        z: i32,
        speed: i32,
    },
    Curve {
        x1: i32,
        y1: i32,
        z1: i32,
        x2: i32,
        y2: i32,
        z2: i32,
        speed: i32,
    },
    /// Hover in place
    Stop,
    Speed(i32),
    Wifi {
        ssid: String,
        password: String,
    },
    AccessPoint {
        ssid: String,
        password: String,
    },
    GetSpeed,
    GetBattery,
    GetTime,
    GetWifi,
    GetSdk,
    GetSerialNumber,
}

impl DroneCommand {
    /// The validation rule that guards this command, if any
    pub fn validation_rule(&self) -> Option<ValidationRule> {
        match self {
            DroneCommand::Up(_)
            | DroneCommand::Down(_)
            | DroneCommand::Left(_)
            | DroneCommand::Right(_)
            | DroneCommand::Forward(_)
            | DroneCommand::Back(_) => Some(ValidationRule::Distance),
            DroneCommand::Clockwise(_) | DroneCommand::CounterClockwise(_) => {
                Some(ValidationRule::Degrees)
            }
            DroneCommand::Speed(_) => Some(ValidationRule::Speed),
            DroneCommand::Go { .. } => Some(ValidationRule::Go),
            DroneCommand::Curve { .. } => Some(ValidationRule::Curve),
            _ => None,
        }
    }

    /// Read-only queries (`speed?`, `battery?`, ...)
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            DroneCommand::GetSpeed
                | DroneCommand::GetBattery
                | DroneCommand::GetTime
                | DroneCommand::GetWifi
                | DroneCommand::GetSdk
                | DroneCommand::GetSerialNumber
        )
    }

    /// Wire verb
    pub fn verb(&self) -> &'static str {
        match self {
            DroneCommand::Command => "command",
            DroneCommand::TakeOff => "takeoff",
            DroneCommand::Land => "land",
            DroneCommand::StreamOn => "streamon",
            DroneCommand::StreamOff => "streamoff",
            DroneCommand::Emergency => "emergency",
            DroneCommand::Up(_) => "up",
            DroneCommand::Down(_) => "down",
            DroneCommand::Left(_) => "left",
            DroneCommand::Right(_) => "right",
            DroneCommand::Forward(_) => "forward",
            DroneCommand::Back(_) => "back",
            DroneCommand::Clockwise(_) => "cw",
            DroneCommand::CounterClockwise(_) => "ccw",
            DroneCommand::Flip(_) => "flip",
            DroneCommand::Go { .. } => "go",
            DroneCommand::Curve { .. } => "curve",
            DroneCommand::Stop => "stop",
            DroneCommand::Speed(_) => "speed",
            DroneCommand::Wifi { .. } => "wifi",
            DroneCommand::AccessPoint { .. } => "ap",
            DroneCommand::GetSpeed => "speed?",
            DroneCommand::GetBattery => "battery?",
            DroneCommand::GetTime => "time?",
            DroneCommand::GetWifi => "wifi?",
            DroneCommand::GetSdk => "sdk?",
            DroneCommand::GetSerialNumber => "sn?",
        }
    }
}

impl fmt::Display for DroneCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = self.verb();
        match self {
            DroneCommand::Up(n)
            | DroneCommand::Down(n)
            | DroneCommand::Left(n)
            | DroneCommand::Right(n)
            | DroneCommand::Forward(n)
            | DroneCommand::Back(n)
            | DroneCommand::Clockwise(n)
            | DroneCommand::CounterClockwise(n)
            | DroneCommand::Speed(n) => write!(f, "{} {}", verb, n),
            DroneCommand::Flip(direction) => write!(f, "{} {}", verb, direction),
            DroneCommand::Go { x, y, z, speed } => {
                write!(f, "{} {} {} {} {}", verb, x, y, z, speed)
            }
            DroneCommand::Curve {
                x1,
                y1,
                z1,
                x2,
                y2,
                z2,
                speed,
            } => write!(
                f,
                "{} {} {} {} {} {} {} {}",
                verb, x1, y1, z1, x2, y2, z2, speed
            ),
            DroneCommand::Wifi { ssid, password }
            | DroneCommand::AccessPoint { ssid, password } => {
                write!(f, "{} {} {}", verb, ssid, password)
            }
            _ => f.write_str(verb),
        }
    }
}

impl FromStr for DroneCommand {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let verb = tokens.next().ok_or(CommandParseError::Empty)?;
        let args: Vec<&str> = tokens.collect();

        let arity = |expected: usize| -> Result<(), CommandParseError> {
            if args.len() == expected {
                Ok(())
            } else {
                Err(CommandParseError::WrongArity {
                    verb: verb.to_string(),
                    expected,
                    found: args.len(),
                })
            }
        };
        let int = |i: usize| -> Result<i32, CommandParseError> {
            args[i]
                .parse()
                .map_err(|_| CommandParseError::InvalidNumber(args[i].to_string()))
        };

        let command = match verb {
            "command" => DroneCommand::Command,
            "takeoff" => DroneCommand::TakeOff,
            "land" => DroneCommand::Land,
            "streamon" => DroneCommand::StreamOn,
            "streamoff" => DroneCommand::StreamOff,
            "emergency" => DroneCommand::Emergency,
            "stop" => DroneCommand::Stop,
            "speed?" => DroneCommand::GetSpeed,
            "battery?" => DroneCommand::GetBattery,
            "time?" => DroneCommand::GetTime,
            "wifi?" => DroneCommand::GetWifi,
            "sdk?" => DroneCommand::GetSdk,
            "sn?" => DroneCommand::GetSerialNumber,
            "up" | "down" | "left" | "right" | "forward" | "back" | "cw" | "ccw" | "speed" => {
                arity(1)?;
                let n = int(0)?;
                match verb {
                    "up" => DroneCommand::Up(n),
                    "down" => DroneCommand::Down(n),
                    "left" => DroneCommand::Left(n),
                    "right" => DroneCommand::Right(n),
                    "forward" => DroneCommand::Forward(n),
                    "back" => DroneCommand::Back(n),
                    "cw" => DroneCommand::Clockwise(n),
                    "ccw" => DroneCommand::CounterClockwise(n),
                    _ => DroneCommand::Speed(n),
                }
            }
            "flip" => {
                arity(1)?;
                let direction = Direction::parse_code(args[0])
                    .ok_or_else(|| CommandParseError::InvalidDirection(args[0].to_string()))?;
                DroneCommand::Flip(direction)
            }
            "go" => {
                arity(4)?;
                DroneCommand::Go {
                    x: int(0)?,
                    y: int(1)?,
                    z: int(2)?,
                    speed: int(3)?,
                }
            }
            "curve" => {
                arity(7)?;
                DroneCommand::Curve {
                    x1: int(0)?,
                    y1: int(1)?,
                    z1: int(2)?,
                    x2: int(3)?,
                    y2: int(4)?,
                    z2: int(5)?,
                    speed: int(6)?,
                }
            }
            "wifi" | "ap" => {
                arity(2)?;
                let ssid = args[0].to_string();
                let password = args[1].to_string();
                if verb == "wifi" {
                    DroneCommand::Wifi { ssid, password }
                } else {
                    DroneCommand::AccessPoint { ssid, password }
                }
            }
            other => return Err(CommandParseError::UnknownVerb(other.to_string())),
        };

        // Parameterless verbs must not carry trailing tokens either
        if command.validation_rule().is_none()
            && !matches!(
                command,
                DroneCommand::Flip(_) | DroneCommand::Wifi { .. } | DroneCommand::AccessPoint { .. }
            )
        {
            arity(0)?;
        }

        Ok(command)
    }
}

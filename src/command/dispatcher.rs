//! Line-oriented command dispatcher
//!
//! Maps a free-text verb and its tokens onto the pilot facade through a fixed
//! table. Dispatch-level failures never touch the network.

use super::pilot::Pilot;
use crate::transport::TransportConnector;
use tello_shared::{response, Direction, DroneCommand};
use thiserror::Error;
use tracing::{debug, warn};

/// Local dispatch failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Unknown command")]
    UnknownCommand,

    #[error("Invalid parameters")]
    InvalidParameters,
}

/// Expected kind of one positional token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Text,
    /// Flip code, mapped leniently
    Direction,
}

/// Target operation of a table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Init,
    TakeOff,
    Land,
    StreamOn,
    StreamOff,
    Emergency,
    Up,
    Down,
    Left,
    Right,
    Forward,
    Back,
    Clockwise,
    CounterClockwise,
    Flip,
    Go,
    Stop,
    Curve,
    Speed,
    Wifi,
    AccessPoint,
    GetSpeed,
    GetBattery,
    GetTime,
    GetWifi,
    GetSdk,
    GetSerialNumber,
    Quit,
}

#[derive(Debug, Clone, Copy)]
pub struct DispatchEntry {
    pub verb: &'static str,
    pub operation: Operation,
    pub params: &'static [ParamKind],
}

const NONE: &[ParamKind] = &[];
const INT: &[ParamKind] = &[ParamKind::Int];
const INT4: &[ParamKind] = &[ParamKind::Int; 4];
const INT7: &[ParamKind] = &[ParamKind::Int; 7];
const TEXT2: &[ParamKind] = &[ParamKind::Text; 2];
const DIRECTION: &[ParamKind] = &[ParamKind::Direction];

const fn entry(
    verb: &'static str,
    operation: Operation,
    params: &'static [ParamKind],
) -> DispatchEntry {
    DispatchEntry {
        verb,
        operation,
        params,
    }
}

static DISPATCH_TABLE: &[DispatchEntry] = &[
    entry("init", Operation::Init, NONE),
    entry("takeoff", Operation::TakeOff, NONE),
    entry("land", Operation::Land, NONE),
    entry("streamon", Operation::StreamOn, NONE),
    entry("streamoff", Operation::StreamOff, NONE),
    entry("emergency", Operation::Emergency, NONE),
    entry("up", Operation::Up, INT),
    entry("down", Operation::Down, INT),
    entry("left", Operation::Left, INT),
    entry("right", Operation::Right, INT),
    entry("forward", Operation::Forward, INT),
    entry("back", Operation::Back, INT),
    entry("cw", Operation::Clockwise, INT),
    entry("ccw", Operation::CounterClockwise, INT),
    entry("flip", Operation::Flip, DIRECTION),
    entry("go", Operation::Go, INT4),
    entry("stop", Operation::Stop, NONE),
    entry("curve", Operation::Curve, INT7),
    entry("speed", Operation::Speed, INT),
    entry("wifi", Operation::Wifi, TEXT2),
    entry("ap", Operation::AccessPoint, TEXT2),
    entry("speed?", Operation::GetSpeed, NONE),
    entry("battery?", Operation::GetBattery, NONE),
    entry("time?", Operation::GetTime, NONE),
    entry("wifi?", Operation::GetWifi, NONE),
    entry("sdk?", Operation::GetSdk, NONE),
    entry("sn?", Operation::GetSerialNumber, NONE),
    entry("quit", Operation::Quit, NONE),
];

/// A token converted to its expected kind
#[derive(Debug, Clone, PartialEq, Eq)]
enum Arg {
    Int(i32),
    Text(String),
    Flip(Direction),
}

/// What a parsed line asks the pilot to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Init,
    Run(DroneCommand),
    Quit,
}

fn lookup(verb: &str) -> Option<&'static DispatchEntry> {
    DISPATCH_TABLE.iter().find(|e| e.verb == verb)
}

fn convert(kind: ParamKind, token: &str) -> Result<Arg, DispatchError> {
    match kind {
        ParamKind::Int => token
            .parse()
            .map(Arg::Int)
            .map_err(|_| DispatchError::InvalidParameters),
        ParamKind::Text => Ok(Arg::Text(token.to_string())),
        ParamKind::Direction => {
            let direction = Direction::parse_code(token).unwrap_or_else(|| {
                warn!("Unknown flip direction '{}', using forward", token);
                Direction::Forward
            });
            Ok(Arg::Flip(direction))
        }
    }
}

fn build(operation: Operation, args: &[Arg]) -> Result<Action, DispatchError> {
    use Arg::*;

    let command = match (operation, args) {
        (Operation::Init, []) => return Ok(Action::Init),
        (Operation::Quit, []) => return Ok(Action::Quit),
        (Operation::TakeOff, []) => DroneCommand::TakeOff,
        (Operation::Land, []) => DroneCommand::Land,
        (Operation::StreamOn, []) => DroneCommand::StreamOn,
        (Operation::StreamOff, []) => DroneCommand::StreamOff,
        (Operation::Emergency, []) => DroneCommand::Emergency,
        (Operation::Up, [Int(n)]) => DroneCommand::Up(*n),
        (Operation::Down, [Int(n)]) => DroneCommand::Down(*n),
        (Operation::Left, [Int(n)]) => DroneCommand::Left(*n),
        (Operation::Right, [Int(n)]) => DroneCommand::Right(*n),
        (Operation::Forward, [Int(n)]) => DroneCommand::Forward(*n),
        (Operation::Back, [Int(n)]) => DroneCommand::Back(*n),
        (Operation::Clockwise, [Int(n)]) => DroneCommand::Clockwise(*n),
        (Operation::CounterClockwise, [Int(n)]) => DroneCommand::CounterClockwise(*n),
        (Operation::Flip, [Flip(d)]) => DroneCommand::Flip(*d),
        (Operation::Go, [Int(x), Int(y), Int(z), Int(speed)]) => DroneCommand::Go {
            x: *x,
            y: *y,
            z: *z,
            speed: *speed,
        },
        (Operation::Stop, []) => DroneCommand::Stop,
        (
            Operation::Curve,
            [Int(x1), Int(y1), Int(z1), Int(x2), Int(y2), Int(z2), Int(speed)],
        ) => DroneCommand::Curve {
            x1: *x1,
            y1: *y1,
            z1: *z1,
            x2: *x2,
            y2: *y2,
            z2: *z2,
            speed: *speed,
        },
        (Operation::Speed, [Int(n)]) => DroneCommand::Speed(*n),
        (Operation::Wifi, [Text(ssid), Text(password)]) => DroneCommand::Wifi {
            ssid: ssid.clone(),
            password: password.clone(),
        },
        (Operation::AccessPoint, [Text(ssid), Text(password)]) => DroneCommand::AccessPoint {
            ssid: ssid.clone(),
            password: password.clone(),
        },
        (Operation::GetSpeed, []) => DroneCommand::GetSpeed,
        (Operation::GetBattery, []) => DroneCommand::GetBattery,
        (Operation::GetTime, []) => DroneCommand::GetTime,
        (Operation::GetWifi, []) => DroneCommand::GetWifi,
        (Operation::GetSdk, []) => DroneCommand::GetSdk,
        (Operation::GetSerialNumber, []) => DroneCommand::GetSerialNumber,
        _ => return Err(DispatchError::InvalidParameters),
    };

    Ok(Action::Run(command))
}

/// Resolve a line to an action without any I/O
pub fn parse(line: &str) -> Result<Action, DispatchError> {
    let mut tokens = line.split_whitespace();
    let verb = tokens.next().ok_or(DispatchError::UnknownCommand)?;
    let entry = lookup(verb).ok_or(DispatchError::UnknownCommand)?;

    let tokens: Vec<&str> = tokens.collect();
    if tokens.len() != entry.params.len() {
        return Err(DispatchError::InvalidParameters);
    }

    let args = entry
        .params
        .iter()
        .zip(tokens)
        .map(|(kind, token)| convert(*kind, token))
        .collect::<Result<Vec<_>, _>>()?;

    build(entry.operation, &args)
}

/// True when the line is the `quit` verb
pub fn is_quit(line: &str) -> bool {
    line.split_whitespace().next() == Some("quit")
}

/// Every verb the dispatcher understands, in table order
pub fn verbs() -> impl Iterator<Item = &'static str> {
    DISPATCH_TABLE.iter().map(|e| e.verb)
}

/// Interactive front end over a [`Pilot`]
pub struct Repl<C: TransportConnector> {
    pilot: Pilot<C>,
}

impl<C: TransportConnector> Repl<C> {
    pub fn new(pilot: Pilot<C>) -> Self {
        Self { pilot }
    }

    pub fn pilot_mut(&mut self) -> &mut Pilot<C> {
        &mut self.pilot
    }

    /// Execute one line and return the text to show the user
    pub async fn dispatch(&mut self, line: &str) -> String {
        let action = match parse(line) {
            Ok(action) => action,
            Err(e) => {
                debug!("Rejected '{}': {}", line.trim(), e);
                return e.to_string();
            }
        };

        match action {
            Action::Init => self.pilot.ignition().await.into_message(),
            Action::Run(command) => self.pilot.run(command).await.into_message(),
            Action::Quit => {
                self.pilot.disconnect().await;
                response::OK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::CommandSession;
    use crate::transport::mock::MockConnector;
    use std::collections::HashSet;
    use std::time::Duration;

    async fn repl(connector: &MockConnector) -> Repl<MockConnector> {
        let session = CommandSession::connect(connector.clone(), Duration::from_millis(50))
            .await
            .unwrap();
        Repl::new(Pilot::new(session))
    }

    #[test]
    fn test_verbs_are_unique() {
        let all: Vec<&str> = verbs().collect();
        let unique: HashSet<&str> = all.iter().copied().collect();
        assert_eq!(all.len(), unique.len());
        assert_eq!(all.len(), 28);
    }

    #[test]
    fn test_unknown_verbs() {
        assert_eq!(parse("blah"), Err(DispatchError::UnknownCommand));
        assert_eq!(parse(""), Err(DispatchError::UnknownCommand));
        assert_eq!(parse("   "), Err(DispatchError::UnknownCommand));
    }

    #[test]
    fn test_arity_and_conversion_errors() {
        assert_eq!(parse("up 40 80"), Err(DispatchError::InvalidParameters));
        assert_eq!(parse("up"), Err(DispatchError::InvalidParameters));
        assert_eq!(parse("takeoff now"), Err(DispatchError::InvalidParameters));
        assert_eq!(parse("go 50 rt 50 50"), Err(DispatchError::InvalidParameters));
        assert_eq!(parse("cw 9999999999"), Err(DispatchError::InvalidParameters));
    }

    #[test]
    fn test_typed_conversion() {
        assert_eq!(parse("up 40"), Ok(Action::Run(DroneCommand::Up(40))));
        assert_eq!(
            parse("go 50 60 70 20"),
            Ok(Action::Run(DroneCommand::Go {
                x: 50,
                y: 60,
                z: 70,
                speed: 20
            }))
        );
        assert_eq!(
            parse("ap home secret"),
            Ok(Action::Run(DroneCommand::AccessPoint {
                ssid: "home".into(),
                password: "secret".into()
            }))
        );
        assert_eq!(parse("battery?"), Ok(Action::Run(DroneCommand::GetBattery)));
        assert_eq!(parse("init"), Ok(Action::Init));
        assert_eq!(parse("quit"), Ok(Action::Quit));
    }

    #[test]
    fn test_flip_codes() {
        assert_eq!(
            parse("flip l"),
            Ok(Action::Run(DroneCommand::Flip(Direction::Left)))
        );
        assert_eq!(
            parse("flip b"),
            Ok(Action::Run(DroneCommand::Flip(Direction::Back)))
        );
        // Unknown codes fall back to forward
        assert_eq!(
            parse("flip x"),
            Ok(Action::Run(DroneCommand::Flip(Direction::Forward)))
        );
    }

    #[test]
    fn test_is_quit() {
        assert!(is_quit("quit"));
        assert!(is_quit("  quit  "));
        assert!(!is_quit("quitter"));
        assert!(!is_quit("land"));
    }

    #[tokio::test]
    async fn test_dispatch_error_strings_skip_network() {
        let connector = MockConnector::new();
        let mut repl = repl(&connector).await;

        assert_eq!(repl.dispatch("blah").await, "Unknown command");
        assert_eq!(repl.dispatch("up 40 80").await, "Invalid parameters");
        assert!(connector.sent().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_flip_forward() {
        let connector = MockConnector::with_replies(["ok", "ok"]);
        let mut repl = repl(&connector).await;

        assert_eq!(repl.dispatch("flip f").await, "ok");
        assert_eq!(connector.sent(), vec!["command", "flip f"]);
    }

    #[tokio::test]
    async fn test_dispatch_returns_validation_message() {
        let connector = MockConnector::new();
        let mut repl = repl(&connector).await;

        assert_eq!(
            repl.dispatch("forward 5").await,
            "Distance must be between 20 and 500"
        );
        assert!(connector.sent().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_init_and_quit() {
        let connector = MockConnector::with_replies(["ok"]);
        let mut repl = repl(&connector).await;

        assert_eq!(repl.dispatch("init").await, "ok");
        assert!(repl.pilot_mut().session().is_in_command_mode());

        assert_eq!(repl.dispatch("quit").await, "ok");
        assert!(!repl.pilot_mut().session().is_connected());
    }
}

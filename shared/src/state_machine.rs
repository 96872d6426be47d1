//! Command Mode State Machine
//!
//! The device ignores flight commands until it has acknowledged `command`.
//! A session therefore moves between two states:
//!
//! ```text
//!   Idle --(reply "ok" to `command`)--> Ready
//!   Ready --(explicit disconnect)-----> Idle
//! ```
//!
//! A rejected individual command never drops the session back to `Idle`.

use crate::response;

/// Whether the device accepts SDK commands from this session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandMode {
    /// Mode not yet entered (or released)
    #[default]
    Idle,
    /// Device acknowledged `command`
    Ready,
}

/// Result of feeding an event to the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeTransition {
    /// State changed
    Entered(CommandMode),
    /// Already in the requested state
    Unchanged(CommandMode),
    /// Device refused to enter command mode
    Refused { response: String },
}

impl CommandMode {
    pub fn is_ready(&self) -> bool {
        matches!(self, CommandMode::Ready)
    }

    /// Apply the device reply to a mode-initialization request
    ///
    /// Only the exact success sentinel moves `Idle` to `Ready`.
    pub fn on_mode_response(&mut self, reply: &str) -> ModeTransition {
        match (*self, reply == response::OK) {
            (CommandMode::Ready, _) => ModeTransition::Unchanged(CommandMode::Ready),
            (CommandMode::Idle, true) => {
                *self = CommandMode::Ready;
                ModeTransition::Entered(CommandMode::Ready)
            }
            (CommandMode::Idle, false) => ModeTransition::Refused {
                response: reply.to_string(),
            },
        }
    }

    /// Release command mode
    pub fn on_disconnect(&mut self) -> ModeTransition {
        match *self {
            CommandMode::Idle => ModeTransition::Unchanged(CommandMode::Idle),
            CommandMode::Ready => {
                *self = CommandMode::Idle;
                ModeTransition::Entered(CommandMode::Idle)
            }
        }
    }
}

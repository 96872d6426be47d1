//! Command composition on top of a [`CommandSession`](crate::session::CommandSession)
//!
//! This module handles:
//! - Immediate one-call-per-operation control ([`Pilot`])
//! - Deferred, batch-validated flight plans ([`FlightPlan`])
//! - Free-text dispatch for interactive use ([`Repl`])

pub mod dispatcher;
mod pilot;
mod plan;

pub use dispatcher::{DispatchError, Repl};
pub use pilot::Pilot;
pub use plan::{FlightPlan, PlanValidationError, QueuedCommand};

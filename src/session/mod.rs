//! Command session management
//!
//! This module handles:
//! - Owning the device transport
//! - Bounded request/reply exchanges
//! - Tracking whether the device is in command mode

mod client;

pub use client::CommandSession;

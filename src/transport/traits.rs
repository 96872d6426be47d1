//! Transport trait abstraction for the command channel

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a transport or by a bounded exchange over it
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("No reply within {0:?}")]
    Timeout(Duration),

    #[error("Transport is not connected")]
    NotConnected,

    #[error("Socket error: {0}")]
    Io(#[from] std::io::Error),
}

/// A datagram channel to one fixed remote address
#[async_trait]
pub trait Transport: Send {
    /// Send one datagram, returning the number of bytes written
    async fn send(&mut self, datagram: &[u8]) -> Result<usize, TransportError>;

    /// Wait for the next datagram from the remote
    async fn recv(&mut self) -> Result<Bytes, TransportError>;

    /// Take every datagram already waiting, without blocking
    ///
    /// Used to discard replies that arrived after their exchange timed out.
    async fn drain(&mut self) -> Result<Vec<Bytes>, TransportError>;

    /// Release the underlying socket
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Factory for creating transport connections
#[async_trait]
pub trait TransportConnector: Send + Sync {
    /// The transport type this connector produces
    type Transport: Transport;

    /// Open a transport to the configured remote
    async fn connect(&self) -> Result<Self::Transport, TransportError>;

    /// Human-readable name for this transport
    fn name(&self) -> &'static str;
}

//! UDP transport implementation for the device command endpoint

use crate::transport::traits::{Transport, TransportConnector, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use std::io;
use std::net::SocketAddr;
use tello_shared::endpoints;
use tokio::net::UdpSocket;
use tracing::debug;

/// Largest reply the device sends
pub const MAX_DATAGRAM_SIZE: usize = 2048;

/// Connected UDP socket wrapper implementing Transport
pub struct UdpTransport {
    socket: Option<UdpSocket>,
    remote: SocketAddr,
}

impl UdpTransport {
    pub fn new(socket: UdpSocket, remote: SocketAddr) -> Self {
        Self {
            socket: Some(socket),
            remote,
        }
    }

    pub fn remote(&self) -> SocketAddr {
        self.remote
    }

    /// Local address the socket is bound to
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        let socket = self.socket.as_ref().ok_or(TransportError::NotConnected)?;
        Ok(socket.local_addr()?)
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send(&mut self, datagram: &[u8]) -> Result<usize, TransportError> {
        let socket = self.socket.as_ref().ok_or(TransportError::NotConnected)?;
        Ok(socket.send(datagram).await?)
    }

    async fn recv(&mut self) -> Result<Bytes, TransportError> {
        let socket = self.socket.as_ref().ok_or(TransportError::NotConnected)?;
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let n = socket.recv(&mut buf).await?;
        buf.truncate(n);
        Ok(Bytes::from(buf))
    }

    async fn drain(&mut self) -> Result<Vec<Bytes>, TransportError> {
        let socket = self.socket.as_ref().ok_or(TransportError::NotConnected)?;
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let mut stale = Vec::new();
        loop {
            match socket.try_recv(&mut buf) {
                Ok(n) => stale.push(Bytes::copy_from_slice(&buf[..n])),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                // ICMP unreachable from an earlier send; nothing to read
                Err(e) if e.kind() == io::ErrorKind::ConnectionRefused => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(stale)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.socket.take().is_some() {
            debug!("Closed UDP transport to {}", self.remote);
        }
        Ok(())
    }
}

/// UDP connector for the device command endpoint
pub struct UdpConnector {
    remote: SocketAddr,
    local_bind: SocketAddr,
}

impl UdpConnector {
    /// Create a connector binding an ephemeral local port
    pub fn new(remote: SocketAddr) -> Self {
        Self {
            remote,
            local_bind: endpoints::LOCAL_BIND,
        }
    }

    /// Bind the local side to a specific address
    pub fn with_local_bind(mut self, local_bind: SocketAddr) -> Self {
        self.local_bind = local_bind;
        self
    }

    pub fn remote(&self) -> SocketAddr {
        self.remote
    }
}

#[async_trait]
impl TransportConnector for UdpConnector {
    type Transport = UdpTransport;

    async fn connect(&self) -> Result<Self::Transport, TransportError> {
        let socket = UdpSocket::bind(self.local_bind).await?;
        socket.connect(self.remote).await?;
        debug!(
            "UDP transport {} -> {}",
            socket.local_addr()?,
            self.remote
        );
        Ok(UdpTransport::new(socket, self.remote))
    }

    fn name(&self) -> &'static str {
        "UDP"
    }
}

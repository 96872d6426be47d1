//! UDP telemetry receiver
//!
//! The device pushes one status string per datagram to a fixed local port.
//! Bad datagrams are skipped; a socket error ends the receive loop.

use crate::transport::udp::MAX_DATAGRAM_SIZE;
use std::io;
use std::net::SocketAddr;
use tello_shared::telemetry::{self, TelemetryData};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Buffered updates before the receive loop applies backpressure
const CHANNEL_CAPACITY: usize = 100;

pub struct TelemetryListener {
    socket: UdpSocket,
}

impl TelemetryListener {
    /// Bind the telemetry socket
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        info!("Telemetry listener bound to {}", socket.local_addr()?);
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Wait for the next well-formed update
    pub async fn recv_one(&self) -> io::Result<TelemetryData> {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        loop {
            let (len, from) = self.socket.recv_from(&mut buf).await?;
            match telemetry::parse_datagram(&buf[..len]) {
                Ok(data) => return Ok(data),
                Err(e) => warn!("Dropping telemetry from {}: {}", from, e),
            }
        }
    }

    /// Run the receive loop on its own task
    ///
    /// The loop stops on a socket error or as soon as the receiver is
    /// dropped, even while no datagram is arriving.
    pub fn spawn(self) -> (JoinHandle<()>, mpsc::Receiver<TelemetryData>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let handle = tokio::spawn(async move {
            self.receive_loop(tx).await;
        });
        (handle, rx)
    }

    async fn receive_loop(self, tx: mpsc::Sender<TelemetryData>) {
        loop {
            let received = tokio::select! {
                received = self.recv_one() => received,
                _ = tx.closed() => {
                    debug!("Telemetry receiver dropped, stopping");
                    break;
                }
            };

            let data = match received {
                Ok(data) => data,
                Err(e) => {
                    error!("Telemetry socket error: {}", e);
                    break;
                }
            };

            if tx.send(data).await.is_err() {
                debug!("Telemetry receiver dropped, stopping");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    const STATUS: &str = "pitch:0;roll:0;yaw:90;vgx:0;vgy:0;vgz:0;templ:55;temph:58;tof:10;h:120;bat:76;baro:1.50;time:12;agx:0.00;agy:0.00;agz:-1000.00;\r\n";

    async fn listener() -> (TelemetryListener, UdpSocket) {
        let listener = TelemetryListener::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let device = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        device
            .connect(listener.local_addr().unwrap())
            .await
            .unwrap();
        (listener, device)
    }

    #[tokio::test]
    async fn test_recv_one_skips_garbage() {
        let (listener, device) = listener().await;

        device.send(b"not telemetry").await.unwrap();
        device.send(STATUS.as_bytes()).await.unwrap();

        let data = timeout(Duration::from_secs(2), listener.recv_one())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(data.battery, 76);
        assert_eq!(data.height, 120);
        assert_eq!(data.attitude.yaw, 90);
    }

    #[tokio::test]
    async fn test_spawned_loop_forwards_updates() {
        let (listener, device) = listener().await;
        let (handle, mut rx) = listener.spawn();

        device.send(STATUS.as_bytes()).await.unwrap();
        device.send(STATUS.as_bytes()).await.unwrap();

        for _ in 0..2 {
            let data = timeout(Duration::from_secs(2), rx.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(data.flight_time, 12);
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_loop_ends_when_receiver_dropped() {
        let (listener, _device) = listener().await;
        let (handle, rx) = listener.spawn();

        drop(rx);

        // No datagram is sent; the task must still finish
        timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }
}

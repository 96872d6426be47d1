//! Command session: the single point of contact with the device

use crate::transport::{Transport, TransportConnector, TransportError};
use std::time::Duration;
use tello_shared::{endpoints, response, CommandMode, CommandOutcome, DroneCommand, ModeTransition};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Owns the transport and the command-mode flag for one device
///
/// Every exchange is one request datagram followed by exactly one reply
/// datagram; there is no pipelining, so a session must have a single owner.
pub struct CommandSession<C: TransportConnector> {
    connector: C,
    transport: Option<C::Transport>,
    mode: CommandMode,
    response_timeout: Duration,
}

impl<C: TransportConnector> CommandSession<C> {
    /// Create a closed session; call [`open`](Self::open) before exchanging
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            transport: None,
            mode: CommandMode::Idle,
            response_timeout: Duration::from_millis(endpoints::RESPONSE_TIMEOUT_MS),
        }
    }

    /// Create a session and open its transport eagerly
    pub async fn connect(connector: C, response_timeout: Duration) -> Result<Self, TransportError> {
        let mut session = Self::new(connector).with_timeout(response_timeout);
        session.open().await?;
        Ok(session)
    }

    pub fn with_timeout(mut self, response_timeout: Duration) -> Self {
        self.response_timeout = response_timeout;
        self
    }

    /// Open the transport if it is not already open
    pub async fn open(&mut self) -> Result<(), TransportError> {
        if self.transport.is_none() {
            let transport = self.connector.connect().await?;
            debug!("Opened {} transport", self.connector.name());
            self.transport = Some(transport);
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    pub fn is_in_command_mode(&self) -> bool {
        self.mode.is_ready()
    }

    pub fn transport_name(&self) -> &'static str {
        self.connector.name()
    }

    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    /// Send `command` and return the reply text verbatim
    ///
    /// Replies left over from earlier timed-out exchanges are discarded
    /// before sending. Fails when the transport is closed, the socket errors,
    /// or no reply arrives within the response timeout. Nothing is retried.
    pub async fn send_and_await(&mut self, command: &str) -> Result<String, TransportError> {
        let transport = self.transport.as_mut().ok_or(TransportError::NotConnected)?;

        // A reply to an exchange that already timed out must not answer this one
        for stale in transport.drain().await? {
            warn!(
                "Discarding late reply before '{}': {}",
                command,
                String::from_utf8_lossy(&stale)
            );
        }

        debug!(">>> {}", command);
        transport.send(command.as_bytes()).await?;

        let reply = timeout(self.response_timeout, transport.recv())
            .await
            .map_err(|_| TransportError::Timeout(self.response_timeout))??;

        let text = String::from_utf8_lossy(&reply).into_owned();
        debug!("<<< {}", text);
        Ok(text)
    }

    /// Put the device into command mode unless it already is
    ///
    /// Re-opens a transport released by [`disconnect`](Self::disconnect).
    pub async fn ensure_command_mode(&mut self) -> CommandOutcome {
        if self.mode.is_ready() {
            return CommandOutcome::success(response::OK);
        }

        if let Err(e) = self.open().await {
            warn!("Failed to open {} transport: {}", self.connector.name(), e);
            return CommandOutcome::failure(e.to_string());
        }

        let init = DroneCommand::Command.to_string();
        let reply = match self.send_and_await(&init).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Command mode exchange failed: {}", e);
                return CommandOutcome::failure(e.to_string());
            }
        };

        match self.mode.on_mode_response(&reply) {
            ModeTransition::Refused { response } => {
                warn!("Device refused command mode: {}", response);
                CommandOutcome::failure(response)
            }
            _ => {
                info!("Device entered command mode");
                CommandOutcome::success(reply)
            }
        }
    }

    /// Leave command mode and release the transport
    pub async fn disconnect(&mut self) {
        if let ModeTransition::Entered(_) = self.mode.on_disconnect() {
            info!("Left command mode");
        }

        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                warn!("Error closing {} transport: {}", self.connector.name(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockConnector;

    async fn session(connector: &MockConnector) -> CommandSession<MockConnector> {
        CommandSession::connect(connector.clone(), Duration::from_millis(50))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_send_and_await_returns_reply_verbatim() {
        let connector = MockConnector::with_replies(["87\r\n"]);
        let mut session = session(&connector).await;

        let reply = session.send_and_await("battery?").await.unwrap();
        assert_eq!(reply, "87\r\n");
        assert_eq!(connector.sent(), vec!["battery?"]);
    }

    #[tokio::test]
    async fn test_send_and_await_times_out() {
        let connector = MockConnector::new();
        let mut session = session(&connector).await;

        let result = session.send_and_await("takeoff").await;
        assert!(matches!(result, Err(TransportError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_late_reply_is_not_taken_for_the_next_one() {
        let connector = MockConnector::new();
        let mut session = session(&connector).await;

        let result = session.send_and_await("takeoff").await;
        assert!(matches!(result, Err(TransportError::Timeout(_))));

        // The takeoff reply shows up after the timeout, then the device
        // answers the query
        connector.push_late("ok");
        connector.push_replies(["87"]);

        let reply = session.send_and_await("battery?").await.unwrap();
        assert_eq!(reply, "87");
        assert_eq!(connector.sent(), vec!["takeoff", "battery?"]);
    }

    #[tokio::test]
    async fn test_udp_late_reply_is_discarded() {
        use crate::transport::UdpConnector;
        use tokio::net::UdpSocket;

        let device = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let connector = UdpConnector::new(device.local_addr().unwrap())
            .with_local_bind("127.0.0.1:0".parse().unwrap());
        let mut session = CommandSession::connect(connector, Duration::from_millis(100))
            .await
            .unwrap();

        let result = session.send_and_await("takeoff").await;
        assert!(matches!(result, Err(TransportError::Timeout(_))));

        // Device answers the timed-out request late
        let mut buf = [0u8; 64];
        let (n, peer) = device.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"takeoff");
        device.send_to(b"ok", peer).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let responder = tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let (n, peer) = device.recv_from(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"battery?");
            device.send_to(b"87", peer).await.unwrap();
        });

        let reply = session.send_and_await("battery?").await.unwrap();
        assert_eq!(reply, "87");
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_session_does_not_connect_implicitly() {
        let connector = MockConnector::with_replies(["ok"]);
        let mut session = CommandSession::new(connector.clone());

        let result = session.send_and_await("takeoff").await;
        assert!(matches!(result, Err(TransportError::NotConnected)));
        assert_eq!(connector.connects(), 0);
    }

    #[tokio::test]
    async fn test_command_mode_lifecycle() {
        let connector = MockConnector::with_replies(["ok"]);
        let mut session = session(&connector).await;

        assert!(!session.is_in_command_mode());

        let outcome = session.ensure_command_mode().await;
        assert!(outcome.succeeded());
        assert_eq!(outcome.message(), "ok");
        assert!(session.is_in_command_mode());

        session.disconnect().await;
        assert!(!session.is_in_command_mode());
        assert!(!session.is_connected());
        assert_eq!(connector.closes(), 1);
    }

    #[tokio::test]
    async fn test_ensure_command_mode_is_idempotent() {
        let connector = MockConnector::with_replies(["ok"]);
        let mut session = session(&connector).await;

        session.ensure_command_mode().await;
        let outcome = session.ensure_command_mode().await;

        assert!(outcome.succeeded());
        // Only one exchange on the wire
        assert_eq!(connector.sent(), vec!["command"]);
    }

    #[tokio::test]
    async fn test_refused_command_mode() {
        let connector = MockConnector::with_replies(["error"]);
        let mut session = session(&connector).await;

        let outcome = session.ensure_command_mode().await;
        assert!(!outcome.succeeded());
        assert_eq!(outcome.message(), "error");
        assert!(!session.is_in_command_mode());
    }

    #[tokio::test]
    async fn test_command_mode_timeout_is_failure() {
        let connector = MockConnector::new();
        let mut session = session(&connector).await;

        let outcome = session.ensure_command_mode().await;
        assert!(!outcome.succeeded());
        assert!(outcome.message().starts_with("No reply within"));
        assert!(!session.is_in_command_mode());
    }

    #[tokio::test]
    async fn test_reopen_after_disconnect() {
        let connector = MockConnector::with_replies(["ok", "ok"]);
        let mut session = session(&connector).await;

        session.ensure_command_mode().await;
        session.disconnect().await;

        let outcome = session.ensure_command_mode().await;
        assert!(outcome.succeeded());
        assert!(session.is_connected());
        assert_eq!(connector.connects(), 2);
        assert_eq!(connector.sent(), vec!["command", "command"]);
    }

    #[tokio::test]
    async fn test_failed_command_keeps_mode() {
        let connector = MockConnector::with_replies(["ok", "error"]);
        let mut session = session(&connector).await;

        session.ensure_command_mode().await;
        let reply = session.send_and_await("flip f").await.unwrap();

        assert_eq!(reply, "error");
        assert!(session.is_in_command_mode());
    }
}

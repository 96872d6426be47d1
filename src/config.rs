//! Client configuration

use std::net::SocketAddr;
use std::time::Duration;
use tello_shared::endpoints;

/// Network settings for one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelloConfig {
    /// Device command endpoint
    pub command_address: SocketAddr,
    /// Local address the command socket binds to
    pub local_bind: SocketAddr,
    /// How long one exchange waits for the reply datagram
    pub response_timeout: Duration,
    /// Local address the telemetry listener binds to
    pub telemetry_bind: SocketAddr,
}

impl Default for TelloConfig {
    fn default() -> Self {
        Self {
            command_address: endpoints::COMMAND_ADDRESS,
            local_bind: endpoints::LOCAL_BIND,
            response_timeout: Duration::from_millis(endpoints::RESPONSE_TIMEOUT_MS),
            telemetry_bind: endpoints::TELEMETRY_BIND,
        }
    }
}

impl TelloConfig {
    /// Create config from environment variables with fallback to defaults
    ///
    /// `TELLO_ADDRESS` accepts either a bare IP (port taken from `TELLO_PORT`)
    /// or a full `ip:port`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();

        let port = lookup("TELLO_PORT")
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(default.command_address.port());

        let command_address = lookup("TELLO_ADDRESS")
            .and_then(|v| {
                v.parse::<SocketAddr>()
                    .ok()
                    .or_else(|| v.parse().ok().map(|ip| SocketAddr::new(ip, port)))
            })
            .unwrap_or_else(|| SocketAddr::new(default.command_address.ip(), port));

        Self {
            command_address,
            local_bind: lookup("TELLO_BIND")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.local_bind),
            response_timeout: lookup("TELLO_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(default.response_timeout),
            telemetry_bind: lookup("TELLO_TELEMETRY_BIND")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.telemetry_bind),
        }
    }
}

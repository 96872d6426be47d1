#[cfg(test)]
pub mod mock;
pub mod traits;
pub mod udp;

pub use traits::{Transport, TransportConnector, TransportError};
pub use udp::{UdpConnector, UdpTransport};

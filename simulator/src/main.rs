//! Tello device simulator
//!
//! Answers the text protocol over UDP so the console and library can be run
//! end to end without hardware.
//!
//! ```bash
//! tello-sim --bind 127.0.0.1:8889 --telemetry-target 127.0.0.1:8890
//! ```

mod device;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use device::SimulatedDevice;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const MAX_DATAGRAM_SIZE: usize = 2048;

/// Tello simulator - answers SDK commands over UDP
#[derive(Parser, Debug)]
#[command(name = "tello-sim")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Command endpoint to listen on
    #[arg(short = 'b', long, env = "TELLO_SIM_BIND", default_value = "127.0.0.1:8889")]
    bind: SocketAddr,

    /// Where to stream telemetry status strings
    #[arg(short = 't', long, env = "TELLO_SIM_TELEMETRY", value_name = "ADDR")]
    telemetry_target: Option<SocketAddr>,

    /// Telemetry period in milliseconds
    #[arg(long, default_value_t = 1000)]
    telemetry_interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();

    let socket = UdpSocket::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    info!("Simulator listening on {}", socket.local_addr()?);

    let device = Arc::new(Mutex::new(SimulatedDevice::new()));

    if let Some(target) = args.telemetry_target {
        info!("  Telemetry to {}", target);
        let device = device.clone();
        let period = Duration::from_millis(args.telemetry_interval_ms);
        tokio::spawn(async move {
            if let Err(e) = stream_telemetry(device, target, period).await {
                error!("Telemetry stream stopped: {}", e);
            }
        });
    }

    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
    loop {
        let (len, from) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(e) => {
                error!("Receive error: {}", e);
                continue;
            }
        };

        let request = String::from_utf8_lossy(&buf[..len]).into_owned();
        let reply = device.lock().await.respond(&request);
        debug!("{} {} -> {}", from, request.trim(), reply);

        if let Err(e) = socket.send_to(reply.as_bytes(), from).await {
            error!("Failed to reply to {}: {}", from, e);
        }
    }
}

async fn stream_telemetry(
    device: Arc<Mutex<SimulatedDevice>>,
    target: SocketAddr,
    period: Duration,
) -> Result<()> {
    let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
    let mut ticker = tokio::time::interval(period);

    loop {
        ticker.tick().await;
        let status = {
            let mut device = device.lock().await;
            device.tick();
            device.telemetry().to_status_string()
        };
        socket.send_to(status.as_bytes(), target).await?;
    }
}

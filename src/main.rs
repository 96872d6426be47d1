//! Interactive Tello console
//!
//! Reads one command per line from stdin and prints the device reply.
//!
//! ```bash
//! # Talk to a real device on its access point
//! tello
//!
//! # Talk to the simulator, with telemetry
//! tello --address 127.0.0.1:8889 --telemetry
//!
//! # Log every exchange
//! RUST_LOG=debug tello
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tello_pilot::command::dispatcher;
use tello_pilot::telemetry::TelemetryListener;
use tello_pilot::{CommandSession, Pilot, Repl, TelloConfig, UdpConnector};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Tello console - drive a drone with typed commands
#[derive(Parser, Debug)]
#[command(name = "tello")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Device command endpoint (overrides TELLO_ADDRESS/TELLO_PORT)
    #[arg(short = 'a', long, value_name = "ADDR")]
    address: Option<SocketAddr>,

    /// Local address for the command socket (overrides TELLO_BIND)
    #[arg(short = 'b', long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Reply timeout in milliseconds (overrides TELLO_TIMEOUT_MS)
    #[arg(short = 't', long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Listen for telemetry and log each update
    #[arg(long, env = "TELLO_TELEMETRY")]
    telemetry: bool,

    /// Telemetry listen address (overrides TELLO_TELEMETRY_BIND)
    #[arg(long, value_name = "ADDR")]
    telemetry_bind: Option<SocketAddr>,
}

impl Args {
    fn apply(&self, mut config: TelloConfig) -> TelloConfig {
        if let Some(address) = self.address {
            config.command_address = address;
        }
        if let Some(bind) = self.bind {
            config.local_bind = bind;
        }
        if let Some(ms) = self.timeout_ms {
            config.response_timeout = Duration::from_millis(ms);
        }
        if let Some(bind) = self.telemetry_bind {
            config.telemetry_bind = bind;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();
    let config = args.apply(TelloConfig::from_env());

    info!("Tello console starting");
    info!("  Device: {}", config.command_address);
    info!("  Reply timeout: {:?}", config.response_timeout);

    if args.telemetry {
        let listener = TelemetryListener::bind(config.telemetry_bind)
            .await
            .with_context(|| format!("Failed to bind telemetry on {}", config.telemetry_bind))?;
        let (_handle, mut updates) = listener.spawn();
        tokio::spawn(async move {
            while let Some(data) = updates.recv().await {
                info!(
                    "Telemetry: battery {}% height {}cm yaw {} time {}s",
                    data.battery, data.height, data.attitude.yaw, data.flight_time
                );
            }
        });
    }

    let connector = UdpConnector::new(config.command_address).with_local_bind(config.local_bind);
    let session = CommandSession::connect(connector, config.response_timeout)
        .await
        .context("Failed to open command socket")?;
    let mut repl = Repl::new(Pilot::new(session));

    let verbs: Vec<&str> = dispatcher::verbs().collect();
    println!("Commands: {}", verbs.join(", "));

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            warn!("Input closed, disconnecting");
            repl.pilot_mut().disconnect().await;
            break;
        };

        if line.trim().is_empty() {
            continue;
        }

        let reply = repl.dispatch(&line).await;
        println!("{}", reply.trim_end());

        if dispatcher::is_quit(&line) {
            break;
        }
    }

    info!("Tello console stopped");
    Ok(())
}

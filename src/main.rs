//! rr-balancer
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request     ┌──────────┐    ┌──────────────────┐
//!     ──────────────────▶│   http   │───▶│  BackendPool     │
//!                        │  server  │    │  get_next_peer() │
//!     Client Response    │          │◀───│  (round robin)   │
//!     ◀──────────────────│          │    └────────▲─────────┘
//!                        └────┬─────┘             │ mark_status
//!                             │ forward      ┌────┴─────────┐
//!                             ▼              │ HealthMonitor│
//!                          Backend ◀─────────│  TCP probes  │
//!                                            └──────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use rr_balancer::cli::Cli;
use rr_balancer::observability::{logging, metrics};
use rr_balancer::{HttpServer, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init(&config.observability.log_level)?;

    tracing::info!("rr-balancer v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = config.backends.len(),
        health_interval_secs = config.health_check.interval_secs,
        probe_timeout_secs = config.health_check.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let server = HttpServer::new(config.clone())?;
    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(shutdown.trigger_on_signal());

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

//! Edge Data-Aggregation Gateway
//!
//! A gateway that fans a single inbound request out to heterogeneous
//! backing stores, each under its own deadline, and merges the partial
//! results deterministically.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌────────────────────────────────────────────────┐
//!                        │              AGGREGATION GATEWAY               │
//!                        │                                                │
//!   Client Request       │  ┌────────┐   ┌──────────────┐                 │
//!   ─────────────────────┼─▶│  http  │──▶│ orchestrator │── guard ──▶ kv ─┼──▶ key-value store
//!                        │  │ server │   │  (fan-out)   │── guard ──▶ db ─┼──▶ relational store
//!                        │  └────────┘   └──────┬───────┘── guard ──▶ r2 ─┼──▶ object store
//!                        │                      │ join (config order)     │
//!   Client Response      │  ┌────────────┐      ▼                         │
//!   ◀────────────────────┼──│ serializer │◀─ AggregatedResult             │
//!                        │  └────────────┘                                │
//!                        │                                                │
//!                        │  ┌──────────────────────────────────────────┐  │
//!                        │  │          Cross-Cutting Concerns          │  │
//!                        │  │  config │ health │ observability │ cycle │  │
//!                        │  └──────────────────────────────────────────┘  │
//!                        └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use edge_gateway::config::{load_config, GatewayConfig};
use edge_gateway::lifecycle::Shutdown;
use edge_gateway::observability::{logging, metrics};
use edge_gateway::GatewayServer;

#[derive(Parser)]
#[command(name = "edge-gateway")]
#[command(about = "Edge-side data-aggregation gateway", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init(&config.observability.log_level);

    tracing::info!("edge-gateway v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        dependencies = config.dependencies.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server = GatewayServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

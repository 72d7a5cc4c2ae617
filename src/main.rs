//! Probe shield gateway (v1)
//!
//! Screens every request path against the probe signature set and forwards
//! the rest to one upstream application.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                 PROBE SHIELD                 │
//!                    │                                              │
//!  Client Request    │  ┌─────────┐   ┌────────────┐   ┌─────────┐  │
//!  ──────────────────┼─▶│  http   │──▶│   shield   │──▶│ forward │──┼──▶ Upstream
//!                    │  │ server  │   │ middleware │   │ handler │  │    App
//!                    │  └─────────┘   └─────┬──────┘   └─────────┘  │
//!                    │                      │ Block                 │
//!  410/404/403 ◀─────┼──────────────────────┘                       │
//!  (empty body)      │                                              │
//!                    │  rules (built-ins + additions - exclusions)  │
//!                    │  config (TOML, hot reload) · observability   │
//!                    └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use probe_shield::config::{load_config, watcher::ConfigWatcher, GatewayConfig};
use probe_shield::http::HttpServer;
use probe_shield::lifecycle::{signals, Shutdown};
use probe_shield::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "probe-shield")]
#[command(about = "Reject scanner probes before they reach your application", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload the [shield] section when the configuration file changes.
    #[arg(long, requires = "config")]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init_logging(&config.observability);

    tracing::info!("probe-shield v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        block_status = %config.shield.block_status,
        additional_patterns = config.shield.additional_patterns.len(),
        excluded_patterns = config.shield.excluded_patterns.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let (config_updates, _watcher) = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, rx) = ConfigWatcher::new(path);
            (rx, Some(watcher.run()?))
        }
        _ => {
            let (_, rx) = mpsc::unbounded_channel();
            (rx, None)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    let server_task = tokio::spawn(server.run(listener, config_updates, server_shutdown));

    signals::wait_for_shutdown().await;
    shutdown.trigger();
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}

//! Standalone telemetry exporter.
//!
//! Runs the exporter as its own process. Applications normally embed it
//! with `telemetry_exporter::spawn` instead.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use telemetry_exporter::collectors::{CountingAllocator, PrometheusRegistry};
use telemetry_exporter::config::load_config;
use telemetry_exporter::lifecycle::signals::wait_for_signal;
use telemetry_exporter::observability::logging::init_logging;
use telemetry_exporter::{Dispatcher, ExporterServer, Shutdown};

#[global_allocator]
static ALLOC: CountingAllocator = CountingAllocator;

#[derive(Parser)]
#[command(name = "telemetry-exporter")]
#[command(about = "Serve liveness, metrics, runtime stats and thread dumps over HTTP", long_about = None)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind host (overrides config and environment).
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides config and environment).
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.listener.host = host;
    }
    if let Some(port) = cli.port {
        config.listener.port = port;
    }

    init_logging(&config.observability);
    tracing::info!("telemetry-exporter v{} starting", env!("CARGO_PKG_VERSION"));

    let registry = PrometheusRegistry::install()?;
    let dispatcher = Dispatcher::with_registry(Arc::new(registry));

    let listener = TcpListener::bind(config.listener.bind_address()).await?;

    let shutdown = Shutdown::new();
    let server = ExporterServer::new(config, dispatcher);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    wait_for_signal().await;
    shutdown.trigger();
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}

//! courier server.
//!
//! Serves the configured route table behind the Basic-auth gate. Routes named
//! `health` answer with a liveness document; every other route is served by
//! the echo handler, which reports the matched route and the calling
//! application.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use courier::config::{load_config, CourierConfig};
use courier::http::{handlers, HandlerSet, HttpServer};
use courier::lifecycle::{shutdown::Shutdown, signals::trigger_on_signal};
use courier::observability::{logging::init_logging, metrics::init_metrics};

#[derive(Parser)]
#[command(name = "courier")]
#[command(about = "Authenticated HTTP route server", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "COURIER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => CourierConfig::default(),
    };

    init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "courier starting");

    tracing::info!(
        bind_address = %config.server.bind_address,
        routes = config.routes.len(),
        applications = config.applications.len(),
        request_timeout_secs = config.server.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let handlers = HandlerSet::new()
        .insert("health", handlers::health)
        .fallback(handlers::echo);
    let server = HttpServer::new(&config, &handlers)?;

    let listener = TcpListener::bind(&config.server.bind_address).await?;

    let shutdown = Shutdown::new();
    tokio::spawn(trigger_on_signal(shutdown.clone()));

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

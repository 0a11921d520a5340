//! `resourceful` server binary.
//!
//! Serves the demo controller map (`index` view, `notes`, `session`) with
//! the configured listener, mount path, logging and metrics.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use resourceful::config::resolve_config;
use resourceful::demo::{self, NoteStore};
use resourceful::lifecycle::Shutdown;
use resourceful::observability::{logging, metrics};
use resourceful::{HttpServer, RouteTable};

#[derive(Parser)]
#[command(name = "resourceful")]
#[command(about = "Serve resource controllers over HTTP", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref(), cli.bind)?;

    logging::init_logging(&config.observability)?;
    tracing::info!("resourceful v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        mount_path = %config.routing.mount_path,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let table = RouteTable::build_with(&demo::controllers(), config.routing.strict_names)?;
    tracing::info!(
        controllers = table.mount_order().len(),
        routes = table.routes().len(),
        "Route table built"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Shutdown::new();

    HttpServer::new(config, table)
        .with_extension(NoteStore::new())
        .run(listener, &shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use linekv::cli::{Cli, Command, ServerArgs};
use linekv::{client, server, store};

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity; anything unset or unparsable means info.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Server(args) => run_server(args).await,
        Command::Client(args) => client::run(args).await,
    }
}

async fn run_server(args: ServerArgs) -> Result<()> {
    let metrics_addr: SocketAddr = format!("{}:{}", args.host, args.metrics_port)
        .parse()
        .context("invalid metrics listen address")?;
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .context("failed to install Prometheus exporter")?;

    metrics::describe_gauge!("linekv_keys_total", "Number of keys in the store");
    metrics::describe_histogram!(
        "linekv_command_duration_seconds",
        "Command processing latency in seconds"
    );

    let store = store::shared();
    let addr = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "linekv listening");

    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("failed to install SIGTERM handler")?;
        tokio::select! {
            _ = server::run(listener, store) => {}
            _ = signal::ctrl_c() => info!("received SIGINT, shutting down"),
            _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        }
    }

    #[cfg(not(unix))]
    tokio::select! {
        _ = server::run(listener, store) => {}
        _ = signal::ctrl_c() => info!("received SIGINT, shutting down"),
    }

    Ok(())
}

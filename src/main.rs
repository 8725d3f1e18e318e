//! Service entry point: CLI parsing, logging, configuration, HTTP server.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use fdsnws_dataselect::config::ServiceConfig;
use fdsnws_dataselect::server;

/// FDSN dataselect web service over a miniSEED ring archive
#[derive(Parser, Debug)]
#[command(name = "fdsnws-dataselect")]
#[command(about = "Serve archived miniSEED waveform data over HTTP")]
struct Args {
    /// Configuration file (TOML)
    #[arg(short = 'c', long = "conf")]
    conf: PathBuf,

    /// Increase log verbosity
    #[arg(short, long)]
    verbose: bool,

    /// Override the configured HTTP port
    #[arg(long, env = "DATASELECT_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // RUST_LOG takes precedence, then -v, then info.
    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    let mut config = ServiceConfig::load(&args.conf)
        .with_context(|| format!("failed to load configuration from {}", args.conf.display()))?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!(
        template = %config.mseed.mseed_write,
        record_size = config.mseed.record_size,
        maxqueryhours = config.dataselect.maxqueryhours,
        host = %config.server.host,
        port = config.server.port,
        "Starting fdsnws-dataselect"
    );

    server::run(config).await
}

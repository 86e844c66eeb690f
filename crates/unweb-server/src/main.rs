//! `unweb-server`: serve the unweb HTTP API.

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use unweb::config::{DEFAULT_MAX_CONTENT_BYTES, DEFAULT_MAX_UPLOAD_BYTES};
use unweb::{ConversionConfig, Converter};
use unweb_server::{router, AppState};

/// HTTP API converting pasted HTML, uploaded files and URLs to Markdown.
#[derive(Parser, Debug)]
#[command(name = "unweb-server", version, about)]
struct Cli {
    /// Address to bind.
    #[arg(long, env = "UNWEB_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on.
    #[arg(short, long, env = "UNWEB_PORT", default_value_t = 8080)]
    port: u16,

    /// Allowed CORS origin; repeat for several. None means any origin.
    #[arg(long = "cors-origin", env = "UNWEB_CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Vec<String>,

    /// Remote fetch timeout in seconds.
    #[arg(long, env = "UNWEB_FETCH_TIMEOUT", default_value_t = 60,
          value_parser = clap::value_parser!(u64).range(1..))]
    fetch_timeout: u64,

    /// Maximum remote document size in bytes.
    #[arg(long, env = "UNWEB_MAX_FETCH_BYTES", default_value_t = DEFAULT_MAX_CONTENT_BYTES)]
    max_fetch_bytes: u64,

    /// Maximum uploaded file size in bytes.
    #[arg(long, env = "UNWEB_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "UNWEB_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = ConversionConfig::builder()
        .request_timeout(Duration::from_secs(cli.fetch_timeout))
        .max_content_bytes(cli.max_fetch_bytes)
        .max_upload_bytes(cli.max_upload_bytes)
        .build()
        .context("Invalid configuration")?;
    let converter = Converter::new(config).context("Failed to initialise converter")?;
    let state = AppState::new(converter).with_cors_origins(cli.cors_origins.clone());

    let listener = tokio::net::TcpListener::bind((cli.host.as_str(), cli.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", cli.host, cli.port))?;
    let addr: SocketAddr = listener.local_addr().context("Failed to read bound address")?;
    info!("unweb-server listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("unweb-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

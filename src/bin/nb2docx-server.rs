//! HTTP service binary for nb2docx.

use anyhow::Context;
use clap::Parser;
use nb2docx::server::{build_router, AppState, DEFAULT_MAX_UPLOAD_BYTES};
use nb2docx::ConversionConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Serve notebook-to-document conversion over HTTP.
#[derive(Parser, Debug)]
#[command(name = "nb2docx-server", version)]
struct Args {
    /// Interface to bind.
    #[arg(long, env = "NB2DOCX_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Largest accepted request body, in megabytes.
    #[arg(long, env = "NB2DOCX_MAX_UPLOAD_MB", default_value_t = DEFAULT_MAX_UPLOAD_BYTES / (1024 * 1024))]
    max_upload_mb: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    tracing::info!("Starting nb2docx server...");

    let state = AppState::new(ConversionConfig::default());
    let app = build_router(state, args.max_upload_mb * 1024 * 1024);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("nb2docx listening on {}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  - POST /api/convert (multipart)");
    tracing::info!("  - POST /api/convert-json");
    tracing::info!("  - GET|POST /api/track-conversion");
    tracing::info!("  - GET|POST /api/track-visit");
    tracing::info!("  - GET  /health");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,nb2docx=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

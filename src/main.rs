use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use docchat_relay::ai::gemini::{GeminiClient, GeminiHttpClient};
use docchat_relay::models::Config;
use docchat_relay::router::UploadRouter;
use docchat_relay::server::{build_router, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "docchat-relay")]
#[command(about = "Relay chat messages and uploads to a Gemini model")]
struct CliArgs {
    /// Port to listen on (overrides PORT).
    #[arg(long, short)]
    port: Option<u16>,

    /// Model identifier (overrides GEMINI_MODEL).
    #[arg(long)]
    model: Option<String>,

    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docchat_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(model) = args.model {
        config.model = model;
    }

    let http = GeminiHttpClient::new(config.api_key.clone(), config.model.clone())
        .with_base_url(config.base_url.clone())
        .with_timeout(config.timeout_secs.map(Duration::from_secs));
    info!("Model provider: Gemini (model: {})", http.model());

    let model = Arc::new(GeminiClient::from_http(http));
    let state = AppState::new(UploadRouter::new(model, config.max_upload_bytes));
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", args.host, config.port))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Chat UI at http://{}", addr);
    info!(
        "Upload limit: {} bytes; endpoints /api/chat /api/document /api/image /api/audio /api/upload",
        config.max_upload_bytes
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

//! contact-lookup HTTP server
//!
//! Environment:
//!   LOOKUP_UPSTREAM_URL - lookup form endpoint (required unless --config is given)
//!   LOOKUP_COOKIES      - static cookie header for the upstream site (optional)
//!   PORT / LOOKUP_HOST  - bind address (default 0.0.0.0:3000)
//!   RUST_LOG            - log filter

use clap::Parser;
use contact_lookup::api::{create_router, AppState};
use contact_lookup::utils::{logger, validation::Validate};
use contact_lookup::{LookupPipeline, ServerArgs};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();

    logger::init_server_logger(args.source.verbose, args.log_json);
    tracing::info!("Starting contact-lookup server");

    let config = match args.source.load().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    tracing::info!(
        "Upstream: {} (timeout {}s, cookie {})",
        config.upstream_url,
        config.timeout_secs,
        if config.cookie_header().is_some() { "set" } else { "not set" }
    );

    let pipeline = LookupPipeline::from_config(Arc::new(config))?;
    let app = create_router(Arc::new(AppState::new(pipeline)));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("🚀 Listening on http://{}", addr);
    tracing::info!("   GET  /api/track?phone=...");
    tracing::info!("   POST /api/track");
    tracing::info!("   GET  /health");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

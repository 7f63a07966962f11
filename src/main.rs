// twinrag - monitored and cached RAG service for a professional digital twin
// Author: kelexine (https://github.com/kelexine)

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use twinrag::cli::Args;
use twinrag::config::AppConfig;
use twinrag::llm::GroqClient;
use twinrag::pipeline::{LlmBackend, RagService};
use twinrag::server::create_router;
use twinrag::utils::logging;
use twinrag::vector::build_vector_store;

fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let mut config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting twinrag v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Runtime sized from config
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers.max(1))
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    runtime.block_on(serve(config))
}

async fn serve(config: AppConfig) -> Result<()> {
    // Phase 4: Collaborators
    let llm: Arc<dyn LlmBackend> = Arc::new(GroqClient::new(&config.llm)?);
    if !llm.is_available() {
        warn!("No LLM API key configured; responses will be raw search results");
    }
    let search = build_vector_store(&config.vector, Some(llm.clone()))?;

    // Phase 5: Monitored pipeline
    let service = Arc::new(RagService::new(llm, search, &config.monitoring));
    info!(
        "Response cache: {} entries, TTL {}s; metrics history {}",
        config.monitoring.cache_max_size,
        config.monitoring.cache_ttl_seconds,
        config.monitoring.max_metrics_history
    );

    // Phase 6: Build and start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("parsing listen address")?;
    let app = create_router(config, service);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 7: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

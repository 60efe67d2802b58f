//! splicer-server: HTTP API for splicing tagged clips.
//!
//! This crate ties the splicer-* crates together into a running server:
//!
//! - Axum-based HTTP API (`/splice`, `/tags`, `/query`, `/watch`)
//! - [`orchestrator::SpliceOrchestrator`] coordinating validation, tag
//!   indexing, filename reservation and encoding
//! - Graceful shutdown via signal handling

pub mod context;
pub mod error;
pub mod middleware;
pub mod orchestrator;
pub mod router;
pub mod routes;

use std::net::SocketAddr;

use splicer_core::config::Config;
use tokio::net::lookup_host;

use crate::context::AppContext;

/// Prepare the output directory. An existing directory is fine.
pub fn prepare_output_dir(config: &Config) -> splicer_core::Result<()> {
    let dir = &config.output.directory;
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(dir)?;
    tracing::info!("Created output directory {}", dir.display());
    Ok(())
}

/// Start the splicer server.
///
/// Creates the output directory, discovers tools, builds the [`AppContext`],
/// and serves HTTP until a shutdown signal is received.
pub async fn start(config: Config) -> splicer_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    prepare_output_dir(&config)?;

    let ctx = AppContext::new(config.clone());
    for info in ctx.tools.check_all() {
        if info.available {
            tracing::info!(
                "Tool found: {} ({})",
                info.name,
                info.version.as_deref().unwrap_or("unknown version")
            );
        } else {
            tracing::warn!("Tool not found: {}", info.name);
        }
    }

    let host_port = format!("{}:{}", config.server.host, config.server.port);
    let addr: SocketAddr = lookup_host(&host_port)
        .await?
        .next()
        .ok_or_else(|| splicer_core::Error::Internal(format!("Invalid server address: {host_port}")))?;

    let app = router::build_router(ctx);

    tracing::info!(
        "Writing clips to {} as .{}",
        config.output.directory.display(),
        config.output.extension
    );
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| splicer_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}

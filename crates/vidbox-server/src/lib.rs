//! vidbox-server: the HTTP media-delivery server.
//!
//! Ties the core crate into a running Axum application:
//!
//! - stream dispatcher with token-gated direct and transcode delivery
//! - subtitle conversion endpoint
//! - graceful shutdown via signal handling

pub mod context;
pub mod error;
pub mod router;
pub mod routes;
pub mod streaming;

use std::net::SocketAddr;
use std::sync::Arc;

use vidbox_core::config::Config;
use vidbox_core::MediaCatalog;

use crate::context::AppContext;

/// Start the vidbox server.
///
/// Initializes the [`AppContext`] over the injected catalog, binds the
/// listener, and serves until a shutdown signal arrives.
pub async fn start(config: Config, catalog: Arc<dyn MediaCatalog>) -> vidbox_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| vidbox_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let ctx = AppContext::new(config, catalog);
    let app = router::build_router(ctx);

    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| vidbox_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| vidbox_core::Error::Internal(format!("Server error: {e}")))?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}

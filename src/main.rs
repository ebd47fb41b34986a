//! Portal Guard service
//!
//! Serves the cache and rate limiters over HTTP for the portal front-end.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portal_guard::api::create_router;
use portal_guard::{spawn_sweep_task, AppState, Config};

/// Main entry point for the Portal Guard service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Build the cache and limiter registry
/// 4. Start the expiry sweep, if enabled
/// 5. Serve HTTP until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portal_guard=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Portal Guard");

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_entries={}, default_ttl={}s, namespace={}, durable_mirror={}, port={}, cleanup_interval={}s",
        config.max_entries,
        config.default_ttl,
        config.cache_namespace,
        config.durable_mirror,
        config.server_port,
        config.cleanup_interval
    );

    let state = AppState::from_config(&config).context("invalid configuration")?;
    info!("Cache and rate limiters initialized");

    let sweep_handle = if config.cleanup_interval > 0 {
        let handle = spawn_sweep_task(
            state.cache.clone(),
            Duration::from_secs(config.cleanup_interval),
        );
        info!("Background expiry sweep started");
        Some(handle)
    } else {
        info!("Background expiry sweep disabled");
        None
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweep.
async fn shutdown_signal(sweep_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = sweep_handle {
        handle.abort();
        warn!("Expiry sweep aborted");
    }
}

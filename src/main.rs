//! Fabl Cache - HTTP front end for the Fabl cache service
//!
//! Loads configuration, connects the configured backend and serves the
//! cache API until SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fabl_cache::api::create_router;
use fabl_cache::cache::{MemoryBackend, RedisBackend};
use fabl_cache::config::BackendKind;
use fabl_cache::{spawn_cleanup_task, AppState, CacheService, Config};

/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the configured backend and connect the cache service
/// 4. Start the expiry sweep when running in memory
/// 5. Serve the router until a shutdown signal, then close the cache
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fabl_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Fabl cache service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, namespace={}, port={}",
        config.backend, config.namespace, config.server_port
    );

    let (cache, cleanup_handle) = build_cache(&config);
    cache.connect().await;
    info!("Cache state after connect: {}", cache.state());

    let app = create_router(AppState::new(cache.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cleanup_handle {
        handle.abort();
    }
    cache.disconnect().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Builds the cache service for the configured backend.
///
/// A Redis URL that does not parse leaves the service disabled rather than
/// stopping startup.
fn build_cache(config: &Config) -> (Arc<CacheService>, Option<JoinHandle<()>>) {
    match config.backend {
        BackendKind::Memory => {
            let backend = Arc::new(MemoryBackend::new(config.max_entries));
            let handle = spawn_cleanup_task(backend.clone(), config.cleanup_interval);
            let service = CacheService::new(backend, config.namespace.clone(), config.ttl.clone());
            (Arc::new(service), Some(handle))
        }
        BackendKind::Redis => {
            let service = match RedisBackend::new(
                &config.redis_url,
                config.connect_timeout,
                config.command_timeout,
            ) {
                Ok(backend) => {
                    CacheService::new(Arc::new(backend), config.namespace.clone(), config.ttl.clone())
                }
                Err(e) => {
                    warn!("Invalid Redis URL, running without cache: {}", e);
                    CacheService::disabled(config.namespace.clone(), config.ttl.clone())
                }
            };
            (Arc::new(service), None)
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
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
}

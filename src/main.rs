//! Refresh-ahead cache server
//!
//! Serves users and blogs from a slow origin through a shared Redis cache
//! that refreshes entries ahead of expiry.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use refresh_ahead::api::create_router;
use refresh_ahead::cache::{CacheStore, MemoryStore, RedisStore};
use refresh_ahead::config::Backend;
use refresh_ahead::repo::Repo;
use refresh_ahead::{spawn_cleanup_task, AppState, Config, RefreshSettings};

/// Main entry point for the refresh-ahead cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the cache store (Redis, or in-process memory)
/// 4. Seed the demo repository
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refresh_ahead=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting refresh-ahead cache server");

    let config = Config::from_env();
    let settings = RefreshSettings::from_config(&config);
    info!(
        backend = ?config.backend,
        cache_expiration_secs = settings.freshness.cache_expiration().as_secs(),
        refresh_ahead_factor = settings.freshness.refresh_ahead_factor(),
        lock_ttl_secs = settings.lock_ttl.as_secs(),
        port = config.server_port,
        "Configuration loaded"
    );

    let (store, cleanup_handle): (Arc<dyn CacheStore>, Option<JoinHandle<()>>) =
        match config.backend {
            Backend::Redis => {
                let store = RedisStore::connect(&config)
                    .await
                    .context("failed to connect to Redis")?;
                (Arc::new(store) as Arc<dyn CacheStore>, None)
            }
            Backend::Memory => {
                let store = Arc::new(MemoryStore::new());
                let handle = spawn_cleanup_task(
                    store.clone(),
                    Duration::from_secs(config.cleanup_interval_secs.max(1)),
                );
                (store as Arc<dyn CacheStore>, Some(handle))
            }
        };

    let repo = Arc::new(Repo::new(Duration::from_millis(config.repo_latency_ms)));
    let (users, blogs) = repo.seed_demo().await;
    for id in &users {
        info!("Seeded user: /users/{}", id);
    }
    for id in &blogs {
        info!("Seeded blog: /blogs/{}", id);
    }

    let state = AppState::new(store, repo, settings);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// In-flight background refreshes are not awaited; any lock they hold
/// expires on its own.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
}

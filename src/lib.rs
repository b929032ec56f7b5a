//! Refresh-ahead cache
//!
//! Serves expensive resources from a shared Redis cache, refreshing entries in
//! the background shortly before they expire, with at most one refresh per
//! key in flight across all replicas.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod refresh;
pub mod repo;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use refresh::{CacheOrchestrator, Loader, RefreshCoordinator, RefreshSettings};
pub use tasks::spawn_cleanup_task;

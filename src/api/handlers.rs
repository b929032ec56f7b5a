//! API Handlers
//!
//! HTTP request handlers for the demo resources and service endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::cache::{CacheStore, KeyScheme};
use crate::error::{CacheError, Result};
use crate::models::{
    Blog, HealthResponse, NamespaceStats, RenameUserRequest, StatsResponse, User,
};
use crate::refresh::{CacheOrchestrator, RefreshSettings};
use crate::repo::{BlogLoader, Repo, UserLoader};

/// Cache key namespace for user bodies.
pub const USERS_NAMESPACE: &str = "cache_by_uuid:users";
/// Cache key namespace for blog bodies.
pub const BLOGS_NAMESPACE: &str = "cache_by_uuid:blogs";

/// Application state shared across all handlers.
///
/// One orchestrator per cached resource type, all sharing one store.
#[derive(Clone)]
pub struct AppState {
    /// Origin data
    pub repo: Arc<Repo>,
    /// Refresh-ahead cache for users
    pub users: Arc<CacheOrchestrator>,
    /// Refresh-ahead cache for blogs
    pub blogs: Arc<CacheOrchestrator>,
}

impl AppState {
    /// Wires the repository and per-resource caches onto `store`.
    pub fn new(store: Arc<dyn CacheStore>, repo: Arc<Repo>, settings: RefreshSettings) -> Self {
        let users = CacheOrchestrator::new(
            KeyScheme::resource(USERS_NAMESPACE),
            store.clone(),
            Arc::new(UserLoader(repo.clone())),
            settings,
        );
        let blogs = CacheOrchestrator::new(
            KeyScheme::resource(BLOGS_NAMESPACE),
            store,
            Arc::new(BlogLoader(repo.clone())),
            settings,
        );
        Self {
            repo,
            users: Arc::new(users),
            blogs: Arc::new(blogs),
        }
    }
}

/// Handler for GET /users/:id
///
/// Reads straight from the repository; the cache sits in front of it.
pub async fn get_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<User>> {
    Ok(Json(state.repo.read_user(id).await?))
}

/// Handler for PUT /users/:id
///
/// Writes are not cached; the new name shows up once the entry is refreshed.
pub async fn rename_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameUserRequest>,
) -> Result<Json<User>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    if !state.repo.rename_user(id, req.name).await {
        return Err(CacheError::NotFound(format!("user {id}")));
    }
    Ok(Json(state.repo.read_user(id).await?))
}

/// Handler for GET /blogs/:id
pub async fn get_blog(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Blog>> {
    Ok(Json(state.repo.read_blog(id).await?))
}

/// Handler for GET /stats
///
/// Returns per-namespace cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let caches = [(USERS_NAMESPACE, &state.users), (BLOGS_NAMESPACE, &state.blogs)]
        .into_iter()
        .map(|(namespace, cache)| {
            NamespaceStats::new(
                namespace,
                cache.stats(),
                cache.freshness().refresh_ahead_window().as_secs_f64(),
            )
        })
        .collect();

    Json(StatsResponse { caches })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

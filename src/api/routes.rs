//! API Routes
//!
//! Configures the Axum router with the cached resource routes and service endpoints.

use axum::{
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{get_blog, get_user, health_handler, rename_user, stats_handler, AppState};
use super::middleware::refresh_ahead;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /users/:id` - User, served through the refresh-ahead cache
/// - `PUT /users/:id` - Rename a user (bypasses the cache)
/// - `GET /blogs/:id` - Blog, served through the refresh-ahead cache
/// - `GET /stats` - Cache statistics per namespace
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Route layers run after routing, so the middleware sees the `:id` param.
    let users = Router::new()
        .route("/users/:id", get(get_user).put(rename_user))
        .route_layer(middleware::from_fn_with_state(
            state.users.clone(),
            refresh_ahead,
        ));
    let blogs = Router::new()
        .route("/blogs/:id", get(get_blog))
        .route_layer(middleware::from_fn_with_state(
            state.blogs.clone(),
            refresh_ahead,
        ));

    Router::new()
        .merge(users)
        .merge(blogs)
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::cache::{FreshnessConfig, MemoryStore};
    use crate::refresh::RefreshSettings;
    use crate::repo::Repo;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let settings = RefreshSettings {
            freshness: FreshnessConfig::new(Duration::from_secs(100), 0.5),
            lock_ttl: Duration::from_secs(30),
            loader_timeout: Duration::from_secs(5),
        };
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            Arc::new(Repo::new(Duration::ZERO)),
            settings,
        );
        create_router(state)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_id_is_bad_request() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/users/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_user_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/users/00000000-0000-0000-0000-000000000000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

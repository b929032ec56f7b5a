//! API Module
//!
//! HTTP handlers, the refresh-ahead middleware, and routing for the demo service.
//!
//! # Endpoints
//! - `GET /users/:id` - User, served through the refresh-ahead cache
//! - `PUT /users/:id` - Rename a user
//! - `GET /blogs/:id` - Blog, served through the refresh-ahead cache
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use middleware::{refresh_ahead, MAX_CACHED_BODY, X_CACHE};
pub use routes::create_router;

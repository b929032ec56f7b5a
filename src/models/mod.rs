//! Resource, request and response models for the demo service
//!
//! Cached bodies are produced by serializing these structs with serde, so the
//! stored layout is fixed by their field declarations.

pub mod requests;
pub mod resources;
pub mod responses;

// Re-export commonly used types
pub use requests::RenameUserRequest;
pub use resources::{Blog, User};
pub use responses::{ErrorResponse, HealthResponse, NamespaceStats, StatsResponse};

//! Resource models served through the cache.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
}

/// A micro-blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    pub id: Uuid,
    pub content: String,
}

//! Loader boundary
//!
//! The origin a cache entry is (re)built from.

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{CacheError, LoaderError, Result};

/// Produces the bytes to cache for a resource.
///
/// Implementations do not retry; the caller bounds each call with a deadline.
#[async_trait]
pub trait Loader: Send + Sync + 'static {
    async fn load(&self, id: Uuid) -> std::result::Result<Vec<u8>, LoaderError>;
}

/// Runs `loader` for `id`, failing with `LoaderTimeout` past `deadline`.
pub async fn load_with_deadline(
    loader: &dyn Loader,
    id: Uuid,
    deadline: Duration,
) -> Result<Vec<u8>> {
    match tokio::time::timeout(deadline, loader.load(id)).await {
        Ok(loaded) => Ok(loaded?),
        Err(_) => Err(CacheError::LoaderTimeout(deadline)),
    }
}

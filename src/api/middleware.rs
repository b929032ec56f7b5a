//! Refresh-ahead middleware
//!
//! Puts a [`CacheOrchestrator`] in front of a resource route. On a miss the
//! downstream handler produces the response and its body is cached.

use std::sync::Arc;

use axum::{
    body::{Body, HttpBody},
    extract::{Path, Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;
use uuid::Uuid;

use crate::cache::Decision;
use crate::error::{CacheError, Result};
use crate::refresh::{CacheOrchestrator, Lookup};

/// Header reporting how the cache handled a request.
pub const X_CACHE: &str = "x-cache";

/// Largest response body the middleware will buffer for caching. Larger
/// responses are served uncached.
pub const MAX_CACHED_BODY: usize = 1024 * 1024; // 1 MB

/// Middleware for routes carrying a resource id in `:id`.
pub async fn refresh_ahead(
    State(cache): State<Arc<CacheOrchestrator>>,
    Path(id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response> {
    if cache.bypass_and_count(request.method()) {
        let mut response = next.run(request).await;
        set_cache_header(&mut response, "bypass");
        return Ok(response);
    }

    let path = request.uri().path().to_owned();
    match cache.lookup(id, &path).await? {
        Lookup::Hit { body, decision } => Ok(cached_response(body, decision)),
        Lookup::Miss { cache_key } => {
            let mut response = next.run(request).await;
            if !response.status().is_success() {
                debug!(key = %cache_key, status = %response.status(), "not caching error response");
                return Ok(response);
            }

            // Bodies of unknown or oversized length are passed through uncached.
            let cacheable = response
                .body()
                .size_hint()
                .upper()
                .is_some_and(|len| len <= MAX_CACHED_BODY as u64);
            if !cacheable {
                debug!(key = %cache_key, "response body unbounded or too large, not caching");
                set_cache_header(&mut response, Decision::Miss.as_str());
                return Ok(response);
            }

            let (mut parts, body) = response.into_parts();
            let bytes = axum::body::to_bytes(body, MAX_CACHED_BODY)
                .await
                .map_err(|e| CacheError::Internal(format!("failed to buffer response: {e}")))?;

            cache.fill(&cache_key, &bytes).await?;

            parts
                .headers
                .insert(X_CACHE, HeaderValue::from_static(Decision::Miss.as_str()));
            Ok(Response::from_parts(parts, Body::from(bytes)))
        }
    }
}

fn cached_response(body: Vec<u8>, decision: Decision) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::HeaderName::from_static(X_CACHE), decision.as_str()),
        ],
        body,
    )
        .into_response()
}

fn set_cache_header(response: &mut Response, value: &'static str) {
    response
        .headers_mut()
        .insert(X_CACHE, HeaderValue::from_static(value));
}

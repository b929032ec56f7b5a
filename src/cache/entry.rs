//! Cache Entry Module
//!
//! Defines what a lifetime-aware read returns from the cache store.

use std::time::Duration;

// == Remaining Lifetime ==
/// Remaining lifetime of a stored entry as reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Entry expires after this duration
    Remaining(Duration),
    /// Entry was written without an expiry
    NoExpiry,
}

impl Ttl {
    // == From PTTL ==
    /// Interprets a Redis `PTTL` reply.
    ///
    /// `-1` means the key has no expiry. `-2` (key missing) and any other
    /// negative value yield `None`; callers treat that as absent.
    pub fn from_pttl(millis: i64) -> Option<Self> {
        match millis {
            -1 => Some(Ttl::NoExpiry),
            m if m >= 0 => Some(Ttl::Remaining(Duration::from_millis(m as u64))),
            _ => None,
        }
    }

    /// Returns the remaining duration, or None for entries without expiry.
    pub fn remaining(&self) -> Option<Duration> {
        match self {
            Ttl::Remaining(d) => Some(*d),
            Ttl::NoExpiry => None,
        }
    }
}

// == Cached Value ==
/// A value read from the cache together with its remaining lifetime.
///
/// Both halves come from a single store exchange, so the pair is always
/// consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedValue {
    /// The stored bytes, typically a serialized response body
    pub value: Vec<u8>,
    /// Remaining lifetime at read time
    pub ttl: Ttl,
}

impl CachedValue {
    pub fn new(value: Vec<u8>, ttl: Ttl) -> Self {
        Self { value, ttl }
    }
}

//! Cache key layout
//!
//! Keys are persisted in a shared store, so their format is part of the
//! service's contract with every other replica.

use std::fmt::Display;

/// Suffix appended to a cache key to form its refresh lock key.
pub const REFRESH_LOCK_SUFFIX: &str = ":refresh_lock";

/// Namespace used by the path-keyed scheme.
pub const PATH_NAMESPACE: &str = "cache_by_path";

/// How a request maps to a cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyScheme {
    /// `<namespace>:<id>`, keyed on resource identity
    Resource { namespace: String },
    /// `cache_by_path:<path>`, keyed on the request path with `%` and `:`
    /// percent-encoded so a path can never produce a lock key
    Path,
}

impl KeyScheme {
    pub fn resource(namespace: impl Into<String>) -> Self {
        KeyScheme::Resource {
            namespace: namespace.into(),
        }
    }

    /// Builds the cache key for a resource id, or for a request path under
    /// the path scheme.
    pub fn cache_key(&self, id: impl Display, path: &str) -> String {
        match self {
            KeyScheme::Resource { namespace } => format!("{namespace}:{id}"),
            KeyScheme::Path => format!("{PATH_NAMESPACE}:{}", escape_path(path)),
        }
    }
}

fn escape_path(path: &str) -> String {
    path.replace('%', "%25").replace(':', "%3A")
}

/// Lock key guarding refreshes of `cache_key`.
pub fn lock_key_for(cache_key: &str) -> String {
    format!("{cache_key}{REFRESH_LOCK_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_key() {
        let scheme = KeyScheme::resource("cache_by_uuid");
        assert_eq!(scheme.cache_key(42, "/users/42"), "cache_by_uuid:42");
    }

    #[test]
    fn test_path_key() {
        assert_eq!(
            KeyScheme::Path.cache_key(42, "/users/42"),
            "cache_by_path:/users/42"
        );
    }

    #[test]
    fn test_path_key_cannot_collide_with_lock_key() {
        let lock = lock_key_for(&KeyScheme::Path.cache_key(0, "/a"));
        let forged = KeyScheme::Path.cache_key(0, "/a:refresh_lock");
        assert_ne!(forged, lock);
        assert_eq!(forged, "cache_by_path:/a%3Arefresh_lock");
        assert!(!forged.ends_with(REFRESH_LOCK_SUFFIX));
    }

    #[test]
    fn test_path_key_escaping_is_unambiguous() {
        assert_ne!(
            KeyScheme::Path.cache_key(0, "/a:b"),
            KeyScheme::Path.cache_key(0, "/a%3Ab")
        );
    }

    #[test]
    fn test_lock_key() {
        assert_eq!(lock_key_for("cache_by_uuid:1"), "cache_by_uuid:1:refresh_lock");
    }
}

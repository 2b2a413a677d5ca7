//! Bridge from server `reload` hints to query cache invalidation.
//!
//! The mapping from reload action to cache key is deliberately narrow:
//! one trigger, one key. Extending it means adding an explicit match arm,
//! never pattern-generalizing.

/// Named query results the backend can mark stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The current user's dispute list.
    UserDisputes,
}

impl QueryKey {
    /// Key string as used by the host application's query cache.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKey::UserDisputes => "userDisputes",
        }
    }
}

/// Host-side query cache seam.
///
/// `invalidate` marks the named result stale so the next read refetches
/// from the server. Implementations must be cheap and non-blocking; the
/// session loop calls this inline.
#[cfg_attr(test, mockall::automock)]
pub trait QueryCache: Send + Sync {
    /// Mark the query result under `key` stale.
    fn invalidate(&self, key: QueryKey);
}

/// Query cache that ignores every invalidation.
///
/// Useful for handles whose views hold no cached queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopQueryCache;

impl QueryCache for NoopQueryCache {
    fn invalidate(&self, _key: QueryKey) {}
}

/// Which cache key (if any) a reload action invalidates.
pub(crate) fn invalidation_for(action: &str) -> Option<QueryKey> {
    match action {
        "decision_initiated" => Some(QueryKey::UserDisputes),
        _ => None,
    }
}

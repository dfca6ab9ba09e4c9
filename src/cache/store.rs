//! Cache store abstraction
//!
//! The store owns archive storage, transport, retries and eviction. The
//! resolver only consumes its lookup contract.

use crate::error::JitcacheResult;
use async_trait::async_trait;

/// A key returned by a successful lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreMatch {
    /// The stored key that matched
    pub key: String,
    /// Whether cached content was written to the agreed cache location
    pub materialized: bool,
}

/// Key-value archive store with exact and prefix matching
///
/// Contract for `lookup`:
/// - an exact match on `primary_key` wins
/// - otherwise `fallback_prefixes` are tried in order, and the most recently
///   written key sharing the first matching prefix is returned
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a cache entry and materialize it on a match
    async fn lookup(
        &self,
        primary_key: &str,
        fallback_prefixes: &[String],
    ) -> JitcacheResult<Option<StoreMatch>>;

    /// Human-readable store name for logs
    fn store_name(&self) -> &'static str;
}

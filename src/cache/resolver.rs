//! Cache key resolution and the restore policy
//!
//! Keys are partitioned by namespace, cache name, runner OS and tool
//! version, and invalidated daily by a date suffix. A restore tries today's
//! exact key first, then falls back to the newest entry from any earlier
//! date via the dateless prefix. There is exactly one fallback tier.
//!
//! A restore never fails: a disabled restore, an empty store and an
//! unreachable store all end in a miss, and the caller does a cold build.

use crate::cache::identity::{validate_segment, CacheIdentity};
use crate::cache::key::CacheKey;
use crate::cache::store::CacheStore;
use crate::error::JitcacheResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Default key namespace
pub const DEFAULT_NAMESPACE: &str = "numba";

/// Why a restore ended the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreReason {
    /// Restore was turned off for this run
    Disabled,
    /// Today's key was found
    ExactMatch,
    /// An earlier date's key was found via the fallback prefix
    PrefixMatch,
    /// Nothing usable was found, or the store could not be reached
    NotFound,
}

impl fmt::Display for RestoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::ExactMatch => write!(f, "exact match"),
            Self::PrefixMatch => write!(f, "prefix match"),
            Self::NotFound => write!(f, "not found"),
        }
    }
}

/// Outcome of a single restore attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreResult {
    pub hit: bool,
    pub matched_key: Option<String>,
    pub reason: RestoreReason,
}

impl RestoreResult {
    fn miss(reason: RestoreReason) -> Self {
        Self {
            hit: false,
            matched_key: None,
            reason,
        }
    }

    fn hit(key: String, reason: RestoreReason) -> Self {
        Self {
            hit: true,
            matched_key: Some(key),
            reason,
        }
    }

    /// Whether the following build starts without a warm cache
    pub fn is_cold_build(&self) -> bool {
        !self.hit
    }
}

/// Derives cache keys and drives restores against a store
#[derive(Debug, Clone)]
pub struct CacheKeyResolver {
    namespace: String,
}

impl CacheKeyResolver {
    /// Create a resolver for a key namespace
    pub fn new(namespace: impl Into<String>) -> JitcacheResult<Self> {
        let namespace = namespace.into();
        validate_segment("namespace", &namespace)?;
        Ok(Self { namespace })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Compute the keys for `identity` on the UTC date of `now`
    pub fn resolve(&self, identity: &CacheIdentity, now: DateTime<Utc>) -> CacheKey {
        CacheKey::new(
            &[
                self.namespace.as_str(),
                identity.cache_name(),
                identity.runner_os().name(),
                identity.tool_version(),
            ],
            now,
        )
    }

    /// Try to restore a cache for `identity`, reporting which key matched
    pub async fn restore(
        &self,
        store: &dyn CacheStore,
        identity: &CacheIdentity,
        now: DateTime<Utc>,
    ) -> RestoreResult {
        if !identity.restore_enabled() {
            info!("Cache restore disabled, build will be cold");
            return RestoreResult::miss(RestoreReason::Disabled);
        }

        let key = self.resolve(identity, now);
        debug!(
            "Looking up {} (fallback {}) in {} store",
            key.primary,
            key.fallback_prefix,
            store.store_name()
        );

        match store.lookup(&key.primary, &key.fallback_prefixes()).await {
            Ok(Some(found)) => {
                let reason = if found.key == key.primary {
                    RestoreReason::ExactMatch
                } else if key.is_fallback_of(&found.key) {
                    RestoreReason::PrefixMatch
                } else {
                    warn!(
                        "Store returned {} which is not a key of {}, treating as miss",
                        found.key, key.fallback_prefix
                    );
                    return RestoreResult::miss(RestoreReason::NotFound);
                };
                if !found.materialized {
                    warn!("Store matched {} but did not materialize it", found.key);
                }
                info!("Cache hit ({}): {}", reason, found.key);
                RestoreResult::hit(found.key, reason)
            }
            Ok(None) => {
                info!("Cache miss for {}", key.primary);
                RestoreResult::miss(RestoreReason::NotFound)
            }
            Err(e) => {
                warn!("Cache store unavailable, treating as miss: {}", e);
                RestoreResult::miss(RestoreReason::NotFound)
            }
        }
    }
}

impl Default for CacheKeyResolver {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

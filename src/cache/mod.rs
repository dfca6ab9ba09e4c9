//! Compiler cache keys and restore
//!
//! A cache entry is addressed by a dated key:
//!
//! ```text
//! <namespace>-<cache name>-<runner OS>-<tool version>-<DD/MM/YYYY>
//! ```
//!
//! A restore tries today's key, then the newest key sharing the same
//! dateless prefix.
//!
//! | Outcome | Reason | Build |
//! |---------|--------|-------|
//! | Hit | exact match | warm |
//! | Hit | prefix match | warm (yesterday's artifacts or older) |
//! | Miss | not found | cold |
//! | Miss | disabled | cold |

pub mod identity;
pub mod key;
pub mod local;
pub mod resolver;
pub mod store;

pub use identity::CacheIdentity;
pub use key::CacheKey;
pub use local::LocalStore;
pub use resolver::{CacheKeyResolver, RestoreReason, RestoreResult};
pub use store::{CacheStore, StoreMatch};

//! jitcache - JIT compiler cache helper for CI
//!
//! Derives dated cache keys for a compiler cache, restores the newest
//! matching cache with a dateless fallback, and publishes the compiler's
//! cache environment to later pipeline steps.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod platform;
pub mod sink;

pub use error::{JitcacheError, JitcacheResult};

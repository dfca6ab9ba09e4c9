//! Configuration schema for jitcache
//!
//! Configuration is stored at `~/.config/jitcache/config.toml`

use crate::cache::identity::validate_key_segment;
use crate::cache::resolver::DEFAULT_NAMESPACE;
use crate::cache::{CacheKeyResolver, LocalStore};
use crate::error::JitcacheResult;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cache key and restore settings
    pub cache: CacheConfig,

    /// Local cache store settings
    pub store: StoreConfig,

    /// JIT compiler environment
    pub compiler: CompilerConfig,
}

impl Config {
    /// Key resolver for the configured namespace
    pub fn resolver(&self) -> JitcacheResult<CacheKeyResolver> {
        CacheKeyResolver::new(self.cache.namespace.as_str())
    }

    /// Store at `store.path` that restores into `cache.dir`
    pub fn store(&self) -> LocalStore {
        LocalStore::new(&self.store.path, &self.cache.dir)
    }

    /// Check the settings keys and restores depend on
    pub fn validate(&self) -> Result<(), String> {
        self.resolver().map_err(|e| format!("cache.namespace: {e}"))?;
        validate_key_segment("name", &self.cache.name).map_err(|e| format!("cache.name: {e}"))?;

        let dir = &self.cache.dir;
        let store = &self.store.path;
        if dir.as_os_str().is_empty() {
            return Err("cache.dir must not be empty".to_string());
        }
        // A restore replaces cache.dir wholesale
        if store.starts_with(dir) || dir.starts_with(store) {
            return Err(format!(
                "store.path {} and cache.dir {} must not contain each other",
                store.display(),
                dir.display()
            ));
        }
        Ok(())
    }
}

/// Cache key and restore settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Leading key segment shared by all caches of this tool
    pub namespace: String,

    /// Default cache name when none is given on the command line
    pub name: String,

    /// Directory the compiler writes its cache to, and restores land in
    pub dir: PathBuf,

    /// Attempt a restore (false forces cold builds)
    pub restore: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            name: "build".to_string(),
            dir: PathBuf::from(".numba_cache"),
            restore: true,
        }
    }
}

/// Local cache store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store root directory
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("jitcache")
                .join("store"),
        }
    }
}

/// JIT compiler target settings
///
/// A generic CPU target keeps cached machine code loadable on every runner
/// in a heterogeneous fleet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// CPU name the compiler targets
    pub cpu_name: String,

    /// CPU feature flags the compiler targets
    pub cpu_features: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            cpu_name: "generic".to_string(),
            cpu_features: "+64bit +cmov +cx16 +cx8 +fxsr +mmx +pclmul +popcnt +sse +sse2 \
                           +sse3 +sse4.1 +sse4.2 +ssse3 +xsave"
                .to_string(),
        }
    }
}

//! Cache identity: the per-run inputs that partition the cache

use crate::cache::key::SEGMENT_SEPARATOR;
use crate::error::{JitcacheError, JitcacheResult};
use crate::platform::RunnerOs;
use serde::Serialize;

/// Who a cache entry belongs to
///
/// Built once per pipeline run. Fields are validated on construction so
/// every key derived from an identity is safe for the store's prefix
/// matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheIdentity {
    cache_name: String,
    runner_os: RunnerOs,
    tool_version: String,
    restore_enabled: bool,
}

impl CacheIdentity {
    /// Create a validated identity with restore enabled
    pub fn new(
        cache_name: impl Into<String>,
        runner_os: RunnerOs,
        tool_version: impl Into<String>,
    ) -> JitcacheResult<Self> {
        let cache_name = cache_name.into();
        let tool_version = tool_version.into();

        validate_key_segment("cache_name", &cache_name)?;
        validate_key_segment("runner_os", runner_os.name())?;
        validate_key_segment("tool_version", &tool_version)?;

        Ok(Self {
            cache_name,
            runner_os,
            tool_version,
            restore_enabled: true,
        })
    }

    /// Enable or disable the restore attempt (disabled forces a cold build)
    pub fn with_restore(mut self, enabled: bool) -> Self {
        self.restore_enabled = enabled;
        self
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn runner_os(&self) -> &RunnerOs {
        &self.runner_os
    }

    pub fn tool_version(&self) -> &str {
        &self.tool_version
    }

    pub fn restore_enabled(&self) -> bool {
        self.restore_enabled
    }
}

/// Like [`validate_segment`], and also reject the key separator
///
/// Every segment after the namespace must be a single token, otherwise
/// `{build-Linux-3.11, Linux, 3.12}` would produce keys under the fallback
/// prefix of `{build, Linux, 3.11}`.
pub(crate) fn validate_key_segment(field: &'static str, value: &str) -> JitcacheResult<()> {
    validate_segment(field, value)?;
    if value.contains(SEGMENT_SEPARATOR) {
        return Err(JitcacheError::identity(
            field,
            format!("'{value}' must not contain '{SEGMENT_SEPARATOR}'"),
        ));
    }
    Ok(())
}

/// Reject values that would break key matching
pub(crate) fn validate_segment(field: &'static str, value: &str) -> JitcacheResult<()> {
    if value.is_empty() {
        return Err(JitcacheError::identity(field, "must not be empty"));
    }
    if let Some(c) = value
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || matches!(c, '*' | ','))
    {
        return Err(JitcacheError::identity(
            field,
            format!("'{value}' contains forbidden character {c:?}"),
        ));
    }
    Ok(())
}

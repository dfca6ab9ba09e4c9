//! Error types for jitcache
//!
//! All modules use `JitcacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for jitcache operations
pub type JitcacheResult<T> = Result<T, JitcacheError>;

/// All errors that can occur in jitcache
#[derive(Error, Debug)]
pub enum JitcacheError {
    // Identity errors
    #[error("Invalid cache identity: {field} {reason}")]
    InvalidIdentity { field: &'static str, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Store errors
    #[error("Cache store unavailable at {path}: {reason}")]
    StoreUnavailable { path: PathBuf, reason: String },

    #[error("Corrupt cache store index {path}: {reason}")]
    StoreIndex { path: PathBuf, reason: String },

    #[error("Archive operation failed for {key}: {reason}")]
    Archive { key: String, reason: String },

    #[error("Nothing to save: cache directory {0} does not exist")]
    NothingToSave(PathBuf),

    // Sink errors
    #[error("Environment file variable {0} is not set")]
    SinkUnavailable(&'static str),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl JitcacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an identity validation error
    pub fn identity(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidIdentity {
            field,
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidIdentity { .. } => {
                Some("Key fields must be non-empty and free of whitespace, '*' and ','; only the namespace may contain '-'")
            }
            Self::SinkUnavailable(_) => Some("Run inside a GitHub Actions step, or drop --github"),
            Self::NothingToSave(_) => Some("Run the build first so the compiler populates its cache"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = JitcacheError::identity("tool_version", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid cache identity: tool_version must not be empty"
        );
    }

    #[test]
    fn error_hint() {
        let err = JitcacheError::SinkUnavailable("GITHUB_ENV");
        assert_eq!(
            err.hint(),
            Some("Run inside a GitHub Actions step, or drop --github")
        );
        assert!(JitcacheError::io("x", std::io::Error::other("y"))
            .hint()
            .is_none());
    }
}

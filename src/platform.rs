//! Runner platform identification
//!
//! The runner OS is part of every cache key and also selects which archive
//! tool the CI cache service should use on that platform.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform a CI job runs on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RunnerOs {
    /// Linux runners
    Linux,
    /// Windows runners
    Windows,
    /// macOS runners
    MacOs,
    /// Any other platform identifier, kept verbatim
    Other(String),
}

/// Archive tool the cache service runs on a given platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveTool {
    /// Executable name or path
    pub program: &'static str,
    /// Directory that must be on PATH for `program` to resolve, if any
    pub path_entry: Option<&'static str>,
}

// Windows' bundled bsdtar mangles symlinks and long paths; use Git's GNU tar.
const GNU_TAR_WINDOWS: ArchiveTool = ArchiveTool {
    program: "tar.exe",
    path_entry: Some(r"C:\Program Files\Git\usr\bin"),
};
const GNU_TAR: ArchiveTool = ArchiveTool {
    program: "tar",
    path_entry: None,
};
const GNU_TAR_MACOS: ArchiveTool = ArchiveTool {
    program: "gtar",
    path_entry: None,
};

impl RunnerOs {
    /// Detect the platform this process is running on
    pub fn detect() -> Self {
        match std::env::consts::OS {
            "linux" => Self::Linux,
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            other => Self::Other(other.to_string()),
        }
    }

    /// Canonical identifier, as CI runners report it
    pub fn name(&self) -> &str {
        match self {
            Self::Linux => "Linux",
            Self::Windows => "Windows",
            Self::MacOs => "macOS",
            Self::Other(name) => name,
        }
    }

    /// Archive tool for this platform
    pub fn archive_tool(&self) -> ArchiveTool {
        match self {
            Self::Windows => GNU_TAR_WINDOWS,
            Self::MacOs => GNU_TAR_MACOS,
            Self::Linux | Self::Other(_) => GNU_TAR,
        }
    }
}

impl FromStr for RunnerOs {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "linux" => Self::Linux,
            "windows" => Self::Windows,
            "macos" | "osx" | "darwin" => Self::MacOs,
            _ => Self::Other(s.to_string()),
        })
    }
}

impl From<String> for RunnerOs {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(os) => os,
            Err(never) => match never {},
        }
    }
}

impl From<RunnerOs> for String {
    fn from(os: RunnerOs) -> Self {
        os.name().to_string()
    }
}

impl fmt::Display for RunnerOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

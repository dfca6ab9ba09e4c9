//! Configuration sinks for publishing environment to later CI steps
//!
//! Everything the compiler reads from its environment is written through a
//! [`ConfigurationSink`], never by mutating this process's environment.

use crate::config::Config;
use crate::error::{JitcacheError, JitcacheResult};
use crate::platform::RunnerOs;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Compiler cache directory variable
pub const CACHE_DIR_VAR: &str = "NUMBA_CACHE_DIR";
/// Target CPU name variable
pub const CPU_NAME_VAR: &str = "NUMBA_CPU_NAME";
/// Target CPU feature list variable
pub const CPU_FEATURES_VAR: &str = "NUMBA_CPU_FEATURES";

/// Destination for key/value configuration
pub trait ConfigurationSink {
    /// Publish a variable
    fn set(&mut self, key: &str, value: &str) -> JitcacheResult<()>;

    /// Prepend a directory to PATH for later steps
    fn add_path(&mut self, dir: &str) -> JitcacheResult<()>;
}

/// In-memory sink
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub vars: BTreeMap<String, String>,
    pub paths: Vec<String>,
}

impl ConfigurationSink for MemorySink {
    fn set(&mut self, key: &str, value: &str) -> JitcacheResult<()> {
        self.vars.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn add_path(&mut self, dir: &str) -> JitcacheResult<()> {
        self.paths.push(dir.to_string());
        Ok(())
    }
}

/// Writes POSIX `export` statements, for `eval "$(jitcache env)"`
pub struct ShellSink<W: Write> {
    out: W,
}

impl<W: Write> ShellSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

impl<W: Write> ConfigurationSink for ShellSink<W> {
    fn set(&mut self, key: &str, value: &str) -> JitcacheResult<()> {
        writeln!(self.out, "export {}={}", key, shell_quote(value))
            .map_err(|e| JitcacheError::io(format!("writing {key}"), e))
    }

    fn add_path(&mut self, dir: &str) -> JitcacheResult<()> {
        writeln!(self.out, "export PATH={}:\"$PATH\"", shell_quote(dir))
            .map_err(|e| JitcacheError::io("writing PATH", e))
    }
}

/// Appends to the GitHub Actions environment, path and output files
#[derive(Debug, Clone)]
pub struct GithubSink {
    vars_file: PathBuf,
    path_file: Option<PathBuf>,
}

const HEREDOC_DELIMITER: &str = "JITCACHE_EOF";

impl GithubSink {
    /// Sink for `$GITHUB_ENV` and `$GITHUB_PATH`
    pub fn environment() -> JitcacheResult<Self> {
        Ok(Self {
            vars_file: env_file("GITHUB_ENV")?,
            path_file: Some(env_file("GITHUB_PATH")?),
        })
    }

    /// Sink for `$GITHUB_OUTPUT` step outputs
    pub fn outputs() -> JitcacheResult<Self> {
        Ok(Self {
            vars_file: env_file("GITHUB_OUTPUT")?,
            path_file: None,
        })
    }

    /// Sink over explicit files
    pub fn with_files(vars_file: PathBuf, path_file: Option<PathBuf>) -> Self {
        Self {
            vars_file,
            path_file,
        }
    }

    fn append(path: &Path, text: &str) -> JitcacheResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| JitcacheError::io(format!("opening {}", path.display()), e))?;
        file.write_all(text.as_bytes())
            .map_err(|e| JitcacheError::io(format!("appending to {}", path.display()), e))
    }
}

fn env_file(var: &'static str) -> JitcacheResult<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or(JitcacheError::SinkUnavailable(var))
}

impl ConfigurationSink for GithubSink {
    fn set(&mut self, key: &str, value: &str) -> JitcacheResult<()> {
        let line = if value.contains('\n') {
            format!("{key}<<{HEREDOC_DELIMITER}\n{value}\n{HEREDOC_DELIMITER}\n")
        } else {
            format!("{key}={value}\n")
        };
        Self::append(&self.vars_file, &line)
    }

    fn add_path(&mut self, dir: &str) -> JitcacheResult<()> {
        let path_file = self
            .path_file
            .as_ref()
            .ok_or(JitcacheError::SinkUnavailable("GITHUB_PATH"))?;
        Self::append(path_file, &format!("{dir}\n"))
    }
}

/// Environment the JIT compiler reads its cache settings from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerEnv {
    pub cache_dir: String,
    pub cpu_name: String,
    pub cpu_features: String,
}

impl CompilerEnv {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cache_dir: config.cache.dir.display().to_string(),
            cpu_name: config.compiler.cpu_name.clone(),
            cpu_features: config.compiler.cpu_features.clone(),
        }
    }

    /// Publish compiler variables and the platform's archive tool location
    pub fn publish(&self, os: &RunnerOs, sink: &mut dyn ConfigurationSink) -> JitcacheResult<()> {
        sink.set(CACHE_DIR_VAR, &self.cache_dir)?;
        sink.set(CPU_NAME_VAR, &self.cpu_name)?;
        sink.set(CPU_FEATURES_VAR, &self.cpu_features)?;

        let tool = os.archive_tool();
        if let Some(dir) = tool.path_entry {
            debug!("Using {} from {} on {}", tool.program, dir, os);
            sink.add_path(dir)?;
        }
        Ok(())
    }
}

//! CLI argument definitions using clap derive

use crate::cache::CacheIdentity;
use crate::config::Config;
use crate::error::JitcacheResult;
use crate::platform::RunnerOs;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// jitcache - JIT compiler cache helper for CI
///
/// Configures the compiler's cache environment and restores the most
/// recent cache for this platform and toolchain.
#[derive(Parser, Debug)]
#[command(name = "jitcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,

    /// Configuration file path
    #[arg(short, long, global = true, env = "JITCACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the cache key and fallback prefix for this run
    Key(KeyArgs),

    /// Restore the newest matching cache
    Restore(RestoreArgs),

    /// Save the compiler cache directory under today's key
    Save(SaveArgs),

    /// Publish the compiler cache environment
    Env(EnvArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Inputs that identify a cache
#[derive(Args, Debug, Clone)]
pub struct IdentityArgs {
    /// Cache name (default: from config)
    #[arg(short, long, env = "JITCACHE_NAME")]
    pub name: Option<String>,

    /// Runner OS (default: detected)
    #[arg(long, env = "RUNNER_OS")]
    pub os: Option<String>,

    /// Toolchain version whose compiled artifacts are cached
    #[arg(short, long, env = "JITCACHE_TOOL_VERSION")]
    pub tool_version: String,

    /// Use this UTC date instead of today (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
}

impl IdentityArgs {
    /// Build a validated identity, filling gaps from config
    pub fn identity(&self, config: &Config) -> JitcacheResult<CacheIdentity> {
        let name = self.name.as_deref().unwrap_or(&config.cache.name);
        let os = match self.os.as_deref() {
            Some(os) => RunnerOs::from(os.to_string()),
            None => RunnerOs::detect(),
        };
        CacheIdentity::new(name, os, self.tool_version.as_str())
    }

    /// The instant keys are computed for
    pub fn now(&self) -> DateTime<Utc> {
        match self.date.and_then(|d| d.and_hms_opt(0, 0, 0)) {
            Some(midnight) => midnight.and_utc(),
            None => Utc::now(),
        }
    }
}

/// Arguments for the key command
#[derive(Parser, Debug)]
pub struct KeyArgs {
    #[command(flatten)]
    pub identity: IdentityArgs,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the restore command
#[derive(Parser, Debug)]
pub struct RestoreArgs {
    #[command(flatten)]
    pub identity: IdentityArgs,

    /// Skip the restore and force a cold build
    #[arg(long)]
    pub no_restore: bool,

    /// Also write cache-hit and matched-key to $GITHUB_OUTPUT
    #[arg(long)]
    pub github_output: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the save command
#[derive(Parser, Debug)]
pub struct SaveArgs {
    #[command(flatten)]
    pub identity: IdentityArgs,
}

/// Arguments for the env command
#[derive(Parser, Debug)]
pub struct EnvArgs {
    /// Runner OS (default: detected)
    #[arg(long, env = "RUNNER_OS")]
    pub os: Option<String>,

    /// Append to $GITHUB_ENV and $GITHUB_PATH instead of printing
    #[arg(long)]
    pub github: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for key and restore
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Table,
    /// JSON output
    Json,
    /// Bare values, one per line
    Plain,
}

/// Log line format
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Parse a date in YYYY-MM-DD format
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{s}', expected YYYY-MM-DD: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_valid() {
        assert_eq!(
            parse_date("2024-03-05").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
    }

    #[test]
    fn parse_date_invalid() {
        assert!(parse_date("05/03/2024").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn cli_parses_restore() {
        let cli = Cli::parse_from([
            "jitcache",
            "restore",
            "--os",
            "Linux",
            "--tool-version",
            "3.11",
            "--no-restore",
        ]);
        match cli.command {
            Commands::Restore(args) => {
                assert!(args.no_restore);
                assert_eq!(args.identity.tool_version, "3.11");
                assert_eq!(args.identity.os.as_deref(), Some("Linux"));
            }
            _ => panic!("expected Restore command"),
        }
    }

    #[test]
    fn identity_defaults_from_config() {
        let cli = Cli::parse_from([
            "jitcache", "key", "--os", "macos", "-t", "3.12", "--date", "2024-03-05",
        ]);
        let Commands::Key(args) = cli.command else {
            panic!("expected Key command");
        };

        let identity = args.identity.identity(&Config::default()).unwrap();
        assert_eq!(identity.cache_name(), "build");
        assert_eq!(identity.runner_os(), &RunnerOs::MacOs);
        assert_eq!(args.identity.now().date_naive().to_string(), "2024-03-05");
    }

    #[test]
    fn cli_parses_config_init() {
        let cli = Cli::parse_from(["jitcache", "config", "init", "--force"]);
        match cli.command {
            Commands::Config(ConfigArgs {
                action: Some(ConfigAction::Init { force }),
            }) => assert!(force),
            _ => panic!("expected Config Init command"),
        }
    }

    #[test]
    fn cli_parses_verbose_and_log_format() {
        let cli = Cli::parse_from(["jitcache", "-vv", "--log-format", "json", "config"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.log_format, LogFormat::Json));
    }
}

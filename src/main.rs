//! jitcache - JIT compiler cache helper for CI
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use jitcache::cli::{Cli, Commands, LogFormat};
use jitcache::config::ConfigManager;
use jitcache::error::JitcacheResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> JitcacheResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("jitcache=warn"),
        1 => EnvFilter::new("jitcache=info"),
        _ => EnvFilter::new("jitcache=debug"),
    };

    // Logs go to stderr so `eval "$(jitcache env)"` sees only exports
    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }

    let manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    debug!("Using config {}", manager.path().display());
    let config = manager.load().await?;

    match cli.command {
        Commands::Key(args) => jitcache::cli::commands::key(args, &config).await,
        Commands::Restore(args) => jitcache::cli::commands::restore(args, &config).await,
        Commands::Save(args) => jitcache::cli::commands::save(args, &config).await,
        Commands::Env(args) => jitcache::cli::commands::env(args, &config).await,
        Commands::Config(args) => jitcache::cli::commands::config(args, &config, &manager).await,
    }
}

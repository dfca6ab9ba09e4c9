//! Restore command - warm the compiler cache from the store

use crate::cache::{RestoreReason, RestoreResult};
use crate::cli::args::{OutputFormat, RestoreArgs};
use crate::config::Config;
use crate::error::JitcacheResult;
use crate::sink::{ConfigurationSink, GithubSink};
use console::style;
use tracing::warn;

/// Execute the restore command
///
/// A miss is reported, never returned as an error.
pub async fn execute(args: RestoreArgs, config: &Config) -> JitcacheResult<()> {
    let resolver = config.resolver()?;
    let identity = args
        .identity
        .identity(config)?
        .with_restore(config.cache.restore && !args.no_restore);

    let store = config.store();
    let result = resolver
        .restore(&store, &identity, args.identity.now())
        .await;

    if args.github_output {
        // Step outputs are best effort
        let written = GithubSink::outputs().and_then(|mut sink| write_outputs(&mut sink, &result));
        if let Err(e) = written {
            warn!("Could not write step outputs: {}", e);
        }
    }

    match args.format {
        OutputFormat::Table => print_result(&result),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Plain => println!("{}", result.matched_key.as_deref().unwrap_or("")),
    }

    Ok(())
}

/// Publish `cache-hit` and `matched-key` step outputs
pub fn write_outputs(
    sink: &mut dyn ConfigurationSink,
    result: &RestoreResult,
) -> JitcacheResult<()> {
    sink.set("cache-hit", if result.hit { "true" } else { "false" })?;
    sink.set("matched-key", result.matched_key.as_deref().unwrap_or(""))
}

fn print_result(result: &RestoreResult) {
    match (&result.matched_key, result.reason) {
        (Some(key), RestoreReason::ExactMatch) => {
            println!("{} Cache restored: {}", style("✓").green(), key);
        }
        (Some(key), _) => {
            println!(
                "{} Cache restored from earlier run: {}",
                style("✓").green(),
                key
            );
        }
        (None, RestoreReason::Disabled) => {
            println!("{} Cache restore disabled, cold build", style("•").dim());
        }
        (None, _) => {
            println!("{} No cache found, cold build", style("•").yellow());
        }
    }
}

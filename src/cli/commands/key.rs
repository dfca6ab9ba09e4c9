//! Key command - print the cache keys for this run

use crate::cli::args::{KeyArgs, OutputFormat};
use crate::config::Config;
use crate::error::JitcacheResult;
use console::style;

/// Execute the key command
pub async fn execute(args: KeyArgs, config: &Config) -> JitcacheResult<()> {
    let resolver = config.resolver()?;
    let identity = args.identity.identity(config)?;
    let key = resolver.resolve(&identity, args.identity.now());

    match args.format {
        OutputFormat::Table => {
            println!("{:<10} {}", style("Primary").bold(), key.primary);
            println!("{:<10} {}", style("Fallback").bold(), key.fallback_prefix);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&key)?),
        OutputFormat::Plain => {
            println!("{}", key.primary);
            println!("{}", key.fallback_prefix);
        }
    }

    Ok(())
}

//! Save command - store the compiler cache under today's key

use crate::cli::args::SaveArgs;
use crate::config::Config;
use crate::error::JitcacheResult;
use console::style;

/// Execute the save command
pub async fn execute(args: SaveArgs, config: &Config) -> JitcacheResult<()> {
    let resolver = config.resolver()?;
    let identity = args.identity.identity(config)?;
    let key = resolver.resolve(&identity, args.identity.now());

    let store = config.store();
    let entry = store.save(&key.primary, &config.cache.dir).await?;

    println!(
        "{} Saved {} to {}",
        style("✓").green(),
        entry.key,
        store.root().display()
    );
    Ok(())
}

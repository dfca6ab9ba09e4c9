//! Env command - publish the compiler cache environment

use crate::cli::args::EnvArgs;
use crate::config::Config;
use crate::error::JitcacheResult;
use crate::platform::RunnerOs;
use crate::sink::{CompilerEnv, GithubSink, ShellSink};
use tracing::info;

/// Execute the env command
pub async fn execute(args: EnvArgs, config: &Config) -> JitcacheResult<()> {
    let os = args
        .os
        .map(RunnerOs::from)
        .unwrap_or_else(RunnerOs::detect);
    let env = CompilerEnv::from_config(config);

    if args.github {
        let mut sink = GithubSink::environment()?;
        env.publish(&os, &mut sink)?;
        info!("Published compiler environment for {}", os);
    } else {
        let mut sink = ShellSink::new(std::io::stdout().lock());
        env.publish(&os, &mut sink)?;
    }

    Ok(())
}

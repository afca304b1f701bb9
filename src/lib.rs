// src/lib.rs

pub mod cleanup;
pub mod cli;
pub mod driver;
pub mod environment;
pub mod errors;
pub mod job;
pub mod logging;
pub mod scheduler;
pub mod steps;

use crate::cli::{CliArgs, Command};
use crate::errors::Result;

/// High-level entry point used by `main.rs`.
///
/// Dispatches one executor stage and returns the process exit code to
/// report back to the runner.
pub async fn run(args: CliArgs) -> Result<i32> {
    match args.command {
        Command::Run(run_args) => steps::run_step(run_args).await,
        Command::Config => {
            let config = driver::DriverConfig::from_env()?;
            driver::emit(&config, std::io::stdout().lock())?;
            Ok(0)
        }
        Command::Cleanup => {
            cleanup::remove_runner_tmpdir().await?;
            Ok(0)
        }
    }
}

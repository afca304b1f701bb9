// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! The runner invokes one binary for every executor stage, so the stages are
//! modelled as subcommands: `run`, `config` and `cleanup`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `ordrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ordrun",
    version,
    about = "Custom-executor driver that runs CI job scripts through ord_soumet.",
    long_about = None
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ORDRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run one job step, delegating build steps to the scheduler.
    Run(RunArgs),
    /// Print the driver configuration document for the runner.
    Config,
    /// Remove the temporary directory the runner created for this job.
    Cleanup,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Path to the job script generated by the runner.
    pub script: PathBuf,

    /// Step name passed by the runner (e.g. "step_script").
    pub step: String,

    /// Prefix for creation of the per-job working directory.
    ///
    /// Defaults to the runner-provided `TMPDIR`.
    #[arg(long, value_name = "DIR")]
    pub tmpdir: Option<PathBuf>,

    /// Do not delete the per-job working directory after completion.
    #[arg(long, env = "ORDRUN_KEEP_TMP")]
    pub keep_tmp: bool,

    /// Seconds to sleep between scheduler status queries.
    #[arg(long, default_value_t = 4, value_name = "SECONDS")]
    pub poll_interval: u64,

    /// Extra arguments appended to the ord_soumet submission command.
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "SUBMIT_ARGS"
    )]
    pub submit_args: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

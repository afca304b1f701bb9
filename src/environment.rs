// src/environment.rs

//! Helpers for the environment contract between the runner and the driver.
//!
//! The runner exports job-level variables with a `CUSTOM_ENV_` prefix; the
//! subset prefixed `CUSTOM_ENV_ORD_SOUMET_` is unpacked into submission
//! flags. It also exports the exit codes the driver must use to report
//! "the job script failed" versus "the driver itself failed".

use anyhow::{Context, anyhow};
use tokio::process::Command;
use tracing::warn;

use crate::errors::Result;

/// Environment prefix unpacked into `ord_soumet` flags.
pub const SUBMIT_ARG_ENV_PREFIX: &str = "CUSTOM_ENV_ORD_SOUMET_";

/// Look up a variable the way a shell would resolve it.
///
/// The runner has been observed to hand its child processes an environment
/// block containing the same variable twice (notably `TMPDIR`). The process
/// environment table keeps the first occurrence, while `sh` resolves the
/// last one, and the last one is the value the runner actually means. So
/// the lookup is delegated to `sh` instead of `std::env`.
///
/// Returns `None` when the variable is unset or empty.
pub async fn shell_env_lookup(name: &str) -> Result<Option<String>> {
    if !is_valid_var_name(name) {
        return Err(anyhow!("invalid environment variable name '{name}'").into());
    }

    let output = Command::new("sh")
        .arg("-c")
        .arg(format!("printf %s \"${name}\""))
        .output()
        .await
        .with_context(|| format!("running sh to resolve ${name}"))?;

    if !output.status.success() {
        return Err(anyhow!("sh lookup of ${name} exited with {}", output.status).into());
    }

    let value = String::from_utf8(output.stdout)
        .map_err(|e| anyhow!("value of ${name} is not valid UTF-8: {e}"))?;

    if value.is_empty() {
        Ok(None)
    } else {
        Ok(Some(value))
    }
}

fn is_valid_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Unpack `<prefix><NAME>=<value>` pairs into `-<name lowercased> <value>`
/// flag pairs, sorted by variable name so the command line is deterministic.
pub fn submit_args_from_vars<I>(prefix: &str, vars: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut matches: Vec<(String, String)> = vars
        .into_iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(prefix)
                .filter(|flag| !flag.is_empty())
                .map(|flag| (flag.to_lowercase(), value))
        })
        .collect();
    matches.sort();

    let mut args = Vec::with_capacity(matches.len() * 2);
    for (flag, value) in matches {
        args.push(format!("-{flag}"));
        args.push(value);
    }
    args
}

/// [`submit_args_from_vars`] over the process environment.
pub fn submit_args_from_env(prefix: &str) -> Vec<String> {
    submit_args_from_vars(prefix, std::env::vars())
}

/// Exit codes the runner expects back from the driver.
#[derive(Debug, Clone, Copy)]
pub struct ExitCodes {
    /// Reported when the wrapped job script exited non-zero.
    pub build_failure: i32,
    /// Reported when the driver could not do its own work, including when
    /// the job's exit status could not be determined at all.
    pub system_failure: i32,
}

impl ExitCodes {
    pub fn from_env() -> Self {
        Self {
            build_failure: read_exit_code("BUILD_FAILURE_EXIT_CODE", 1),
            system_failure: read_exit_code("SYSTEM_FAILURE_EXIT_CODE", 2),
        }
    }
}

fn read_exit_code(name: &str, default: i32) -> i32 {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(code) => code,
            Err(_) => {
                warn!(var = name, value = %raw, default, "unparsable exit code variable; using default");
                default
            }
        },
        Err(_) => {
            warn!(var = name, default, "exit code variable not set; using default");
            default
        }
    }
}

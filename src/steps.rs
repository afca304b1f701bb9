// src/steps.rs

//! The `run` executor stage: step dispatch and exit-code mapping.
//!
//! Only the build steps are worth a scheduler round-trip; the runner's
//! bookkeeping steps (fetching sources, uploading artifacts, ...) run
//! locally under `bash` exactly as the default shell executor would.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use tokio::process::Command;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info};

use crate::cli::RunArgs;
use crate::environment::{self, ExitCodes, SUBMIT_ARG_ENV_PREFIX};
use crate::errors::Result;
use crate::job::{CancelFlag, JobCoordinator};
use crate::scheduler::{OrdSchedulerBackend, SchedulerBackend};

/// Steps that are submitted to the scheduler.
const SCHEDULED_STEPS: &[&str] = &["build_script", "step_script"];

pub async fn run_step(args: RunArgs) -> Result<i32> {
    let exit_codes = ExitCodes::from_env();

    let exit_code = if SCHEDULED_STEPS.contains(&args.step.as_str()) {
        run_scheduled(&args).await?
    } else {
        run_local(&args.script).await?
    };

    Ok(map_exit_code(&args.step, exit_code, exit_codes))
}

/// Map a step's exit status onto the code this process reports back to the
/// runner: success, "the job script failed", or "the driver could not tell".
pub fn map_exit_code(step: &str, code: Option<i32>, exit_codes: ExitCodes) -> i32 {
    match code {
        Some(0) => 0,
        Some(code) => {
            error!(step, code, "step script failed");
            exit_codes.build_failure
        }
        None => {
            error!(step, "could not determine step script exit code");
            exit_codes.system_failure
        }
    }
}

async fn run_local(script: &Path) -> Result<Option<i32>> {
    info!(script = %script.display(), "running step locally");
    let status = Command::new("bash")
        .arg(script)
        .status()
        .await
        .with_context(|| format!("running step script {:?}", script))?;
    Ok(status.code())
}

async fn run_scheduled(args: &RunArgs) -> Result<Option<i32>> {
    let workdir_prefix = match &args.tmpdir {
        Some(dir) => Some(dir.clone()),
        None => environment::shell_env_lookup("TMPDIR")
            .await?
            .map(PathBuf::from),
    };

    let mut submit_args = environment::submit_args_from_env(SUBMIT_ARG_ENV_PREFIX);
    submit_args.extend(args.submit_args.iter().cloned());

    let mut job = JobCoordinator::new(
        &args.script,
        submit_args,
        workdir_prefix.as_deref(),
        args.keep_tmp,
        OrdSchedulerBackend::new(),
    )?;
    info!(dir = %job.workdir().display(), "creating job files");

    spawn_cancel_listeners(job.cancel_flag());

    // Teardown must run on every path out of the lifecycle, so the
    // fallible part is factored out and its result inspected afterwards.
    let outcome = drive(&mut job, Duration::from_secs(args.poll_interval)).await;
    job.teardown();
    outcome
}

async fn drive<S: SchedulerBackend>(
    job: &mut JobCoordinator<S>,
    poll_interval: Duration,
) -> Result<Option<i32>> {
    job.start().await?;
    job.wait(poll_interval).await?;
    job.get_exit_code()
}

/// SIGINT/SIGTERM from the runner request cancellation; the poll loop does
/// the actual delete call at its next iteration.
fn spawn_cancel_listeners(flag: CancelFlag) {
    {
        let flag = flag.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for SIGINT: {e}");
                return;
            }
            info!("received SIGINT; requesting job cancellation");
            flag.request();
        });
    }

    tokio::spawn(async move {
        let mut term = match signal(SignalKind::terminate()) {
            Ok(term) => term,
            Err(e) => {
                eprintln!("failed to listen for SIGTERM: {e}");
                return;
            }
        };
        term.recv().await;
        info!("received SIGTERM; requesting job cancellation");
        flag.request();
    });
}

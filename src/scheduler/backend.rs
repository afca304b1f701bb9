// src/scheduler/backend.rs

//! Pluggable scheduler backend abstraction.
//!
//! The coordinator talks to a `SchedulerBackend` instead of spawning
//! scheduler commands itself. This makes it easy to swap in a fake
//! scheduler in tests while keeping the production implementation here.
//!
//! - `OrdSchedulerBackend` is the real implementation: it shells out to the
//!   `ord_soumet` / `jobst` / `jobdel` CLI tools.
//! - Tests can provide their own `SchedulerBackend` that records calls and
//!   plays back scripted statuses.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{Context, anyhow};
use tokio::process::Command;
use tracing::{info, warn};

use crate::errors::{OrdrunError, Result};

use super::JobStatus;

const SUBMIT_CMD: &str = "ord_soumet";
const STATUS_CMD: &str = "jobst";
const DELETE_CMD: &str = "jobdel";

/// Trait abstracting the three scheduler operations.
///
/// All three are implemented as external commands in production; the trait
/// exists so the job lifecycle can be driven end-to-end in tests without a
/// scheduler installation.
pub trait SchedulerBackend: Send {
    /// Submit the wrapper script, appending `submit_args` to the submission
    /// command. Stdout of the submission command is captured through
    /// `id_capture` (a file inside the job working directory) and its single
    /// line is returned as the job id.
    ///
    /// A non-zero submission command or an empty id is fatal: no job exists.
    fn submit<'a>(
        &'a mut self,
        wrapper: &'a Path,
        submit_args: &'a [String],
        id_capture: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

    /// Query the status of a submitted job, scoped to `cell_name` when one
    /// was given at submission.
    ///
    /// A failing query or a query with no record is `Ok(JobStatus::Unknown)`;
    /// more than one record for a single job id is an error.
    fn query_status<'a>(
        &'a mut self,
        job_id: &'a str,
        cell_name: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<JobStatus>> + Send + 'a>>;

    /// Delete/cancel a submitted job. Failures are returned as errors;
    /// callers treat cancellation as best-effort and only log them.
    fn cancel<'a>(
        &'a mut self,
        job_id: &'a str,
        cell_name: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Real scheduler backend used in production.
#[derive(Debug, Default)]
pub struct OrdSchedulerBackend;

impl OrdSchedulerBackend {
    pub fn new() -> Self {
        Self
    }
}

impl SchedulerBackend for OrdSchedulerBackend {
    fn submit<'a>(
        &'a mut self,
        wrapper: &'a Path,
        submit_args: &'a [String],
        id_capture: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            info!(
                wrapper = %wrapper.display(),
                args = ?submit_args,
                "running submission command"
            );

            let capture = std::fs::File::create(id_capture)
                .with_context(|| format!("creating id capture file {:?}", id_capture))?;

            let status = Command::new(SUBMIT_CMD)
                .arg(wrapper)
                .args(submit_args)
                .stdout(Stdio::from(capture))
                .status()
                .await
                .with_context(|| format!("spawning {SUBMIT_CMD}"))?;

            if !status.success() {
                return Err(OrdrunError::SubmissionFailed(format!(
                    "{SUBMIT_CMD} exited with {status}"
                )));
            }

            let job_id = std::fs::read_to_string(id_capture)
                .with_context(|| format!("reading id capture file {:?}", id_capture))?
                .trim()
                .to_string();

            if job_id.is_empty() {
                return Err(OrdrunError::SubmissionFailed(format!(
                    "{SUBMIT_CMD} did not print a job id"
                )));
            }

            Ok(job_id)
        })
    }

    fn query_status<'a>(
        &'a mut self,
        job_id: &'a str,
        cell_name: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<JobStatus>> + Send + 'a>> {
        Box::pin(async move {
            let mut cmd = Command::new(STATUS_CMD);
            if let Some(cell) = cell_name {
                cmd.args(["-c", cell]);
            }
            cmd.args(["-j", job_id, "--format", "csv"]);

            info!(job_id, cell = cell_name.unwrap_or("-"), "running status query");

            let output = match cmd.output().await {
                Ok(output) => output,
                Err(e) => {
                    warn!(job_id, error = %e, "failed to run {STATUS_CMD}");
                    return Ok(JobStatus::Unknown);
                }
            };

            if !output.status.success() {
                warn!(
                    job_id,
                    status = %output.status,
                    "{STATUS_CMD} returned non-zero"
                );
                return Ok(JobStatus::Unknown);
            }

            let stdout = String::from_utf8_lossy(&output.stdout);
            parse_status_output(&stdout, job_id)
        })
    }

    fn cancel<'a>(
        &'a mut self,
        job_id: &'a str,
        cell_name: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let mut cmd = Command::new(DELETE_CMD);
            if let Some(cell) = cell_name {
                cmd.args(["-c", cell]);
            }
            cmd.arg(job_id);

            info!(job_id, cell = cell_name.unwrap_or("-"), "running delete command");

            let status = cmd
                .status()
                .await
                .with_context(|| format!("spawning {DELETE_CMD}"))?;

            if !status.success() {
                return Err(anyhow!("{DELETE_CMD} exited with {status}").into());
            }

            Ok(())
        })
    }
}

/// Parse the stdout of the status query for one job.
///
/// The query is scoped to a single job id, so more than one record means the
/// scoping is broken and polling results can no longer be trusted. That is
/// a hard error, not something to paper over.
pub fn parse_status_output(stdout: &str, job_id: &str) -> Result<JobStatus> {
    let records: Vec<&str> = stdout.lines().filter(|l| !l.trim().is_empty()).collect();

    match records.as_slice() {
        [] => Ok(JobStatus::Unknown),
        [record] => {
            let fields: Vec<&str> = record.split(',').collect();
            match fields.get(2) {
                Some(code) => Ok(JobStatus::from_code(code.trim())),
                None => {
                    warn!(job_id, record = %record, "status record has no status field");
                    Ok(JobStatus::Unknown)
                }
            }
        }
        _ => Err(OrdrunError::AmbiguousStatus {
            job_id: job_id.to_string(),
        }),
    }
}

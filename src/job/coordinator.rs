// src/job/coordinator.rs

//! The job lifecycle coordinator.
//!
//! Owns the working directory and drives one scheduler job from packaging
//! through submission, polling and exit-code retrieval to teardown. There is
//! exactly one job per process invocation; the only concurrent actor is the
//! output streamer, and the only shared state is the cancellation flag.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, anyhow};
use tracing::{info, warn};

use crate::errors::Result;
use crate::scheduler::{JobStatus, SchedulerBackend, cell_name_from_args, query_job_id};

use super::packager::{self, JobFiles};
use super::streamer::OutputStreamer;
use super::workspace::Workspace;

/// Cancellation token shared between the coordinator and signal handlers.
///
/// Signal handlers only ever set the flag; the poll loop consumes it at the
/// top of each iteration. Cancellation never interrupts an in-flight
/// scheduler command.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// State machine: Unsubmitted → Submitted → (polling) → Terminal → TornDown.
pub struct JobCoordinator<S: SchedulerBackend> {
    scheduler: S,
    workspace: Workspace,
    files: JobFiles,
    user_script_src: PathBuf,
    submit_args: Vec<String>,
    cell_name: Option<String>,
    keep_workdir: bool,
    /// Raw id returned by the submission command; `None` until submitted.
    job_id: Option<String>,
    /// Normalized id used for status/delete calls; derived from `job_id`.
    query_id: Option<String>,
    cancel_flag: CancelFlag,
    cancel_sent: bool,
    streamer: Option<OutputStreamer>,
    torn_down: bool,
}

impl<S: SchedulerBackend> JobCoordinator<S> {
    /// Create the working directory and fix the job's file layout. The cell
    /// name is parsed from the submission arguments once, here.
    pub fn new(
        user_script: &Path,
        submit_args: Vec<String>,
        workdir_prefix: Option<&Path>,
        keep_workdir: bool,
        scheduler: S,
    ) -> Result<Self> {
        let workspace = Workspace::create(workdir_prefix)?;
        let files = JobFiles::new(workspace.root());
        let cell_name = cell_name_from_args(&submit_args);

        Ok(Self {
            scheduler,
            workspace,
            files,
            user_script_src: user_script.to_path_buf(),
            submit_args,
            cell_name,
            keep_workdir,
            job_id: None,
            query_id: None,
            cancel_flag: CancelFlag::new(),
            cancel_sent: false,
            streamer: None,
            torn_down: false,
        })
    }

    /// The token signal handlers use to request cancellation.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel_flag.clone()
    }

    pub fn workdir(&self) -> &Path {
        self.workspace.root()
    }

    pub fn files(&self) -> &JobFiles {
        &self.files
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    /// Begin streaming, package the script and submit it.
    ///
    /// The streamer starts first so output written by the wrapper is picked
    /// up from the first byte; submission is last, so a fatal failure in any
    /// earlier step means no job ever reaches the scheduler.
    pub async fn start(&mut self) -> Result<()> {
        self.streamer = Some(OutputStreamer::begin(&self.files.output_file)?);
        packager::package(&self.user_script_src, &self.files)?;

        let job_id = self
            .scheduler
            .submit(&self.files.wrapper, &self.submit_args, &self.files.job_id_file)
            .await?;

        let query_id = query_job_id(&job_id, self.cell_name.as_deref());
        info!(job_id = %job_id, query_id = %query_id, "job submitted");
        self.query_id = Some(query_id);
        self.job_id = Some(job_id);
        Ok(())
    }

    /// Poll scheduler status until a terminal state is reported.
    ///
    /// A pending cancellation request is honoured at the top of each
    /// iteration, which also covers requests that arrived before the job id
    /// was known. There is no iteration bound: the job waits for the
    /// scheduler indefinitely, and a broken scheduler connection surfaces as
    /// a terminal `Unknown` from the query itself.
    pub async fn wait(&mut self, poll_interval: Duration) -> Result<JobStatus> {
        loop {
            if self.cancel_flag.is_requested() {
                self.issue_cancel().await;
            }

            let status = self.query_status().await?;
            info!(
                job_id = self.job_id.as_deref().unwrap_or("-"),
                status = %status,
                "job status"
            );

            if status.is_terminal() {
                return Ok(status);
            }

            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Request cancellation.
    ///
    /// Before submission there is nothing to delete yet, so the request is
    /// recorded and honoured on the first poll iteration after the id
    /// becomes known. After submission the delete command is issued right
    /// away. Safe to call any number of times; at most one delete command is
    /// run per job.
    pub async fn cancel(&mut self) {
        self.cancel_flag.request();
        if self.job_id.is_none() {
            info!("cancel requested before job id is known; deferring to next poll");
            return;
        }
        self.issue_cancel().await;
    }

    /// Read the exit status the wrapper recorded.
    ///
    /// `Ok(None)` means the file does not exist: the wrapper never ran to
    /// completion (e.g. the job was cancelled first) and the exit status is
    /// genuinely unknown, as opposed to a guessed success.
    pub fn get_exit_code(&self) -> Result<Option<i32>> {
        match std::fs::read_to_string(&self.files.exit_code_file) {
            Ok(text) => {
                let code = text
                    .trim()
                    .parse()
                    .with_context(|| format!("parsing exit code file content {text:?}"))?;
                Ok(Some(code))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    job_id = self.job_id.as_deref().unwrap_or("-"),
                    "no exit code file for job"
                );
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Stop the streamer and (unless configured otherwise) remove the
    /// working directory. Idempotent: destructive actions run exactly once
    /// no matter which exit path got here first.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        if let Some(mut streamer) = self.streamer.take() {
            streamer.stop();
        }

        if self.keep_workdir {
            info!(dir = %self.workspace.root().display(), "keeping job working directory");
            return;
        }
        if let Err(e) = self.workspace.destroy() {
            warn!(
                dir = %self.workspace.root().display(),
                error = %e,
                "failed to remove job working directory"
            );
        }
    }

    async fn query_status(&mut self) -> Result<JobStatus> {
        let id = self
            .query_id
            .clone()
            .ok_or_else(|| anyhow!("status query before job submission"))?;
        self.scheduler
            .query_status(&id, self.cell_name.as_deref())
            .await
    }

    /// Run the delete command once for the known job id; failures are
    /// logged, never propagated.
    async fn issue_cancel(&mut self) {
        if self.cancel_sent {
            return;
        }
        let Some(id) = self.query_id.clone() else {
            return;
        };
        self.cancel_sent = true;

        info!(job_id = %id, "cancelling job");
        if let Err(e) = self.scheduler.cancel(&id, self.cell_name.as_deref()).await {
            warn!(job_id = %id, error = %e, "delete command failed");
        }
    }
}

use std::collections::VecDeque;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use ordrun::errors::Result;
use ordrun::scheduler::{JobStatus, SchedulerBackend};

/// A fake scheduler backend that:
/// - records every submit/status/cancel call
/// - plays back a scripted sequence of statuses (empty script => `Unknown`)
/// - optionally runs the wrapper script locally on submit, so the output
///   and exit-code files are produced the way a real job would produce them.
pub struct FakeScheduler {
    job_id: String,
    run_wrapper_on_submit: bool,
    statuses: Arc<Mutex<VecDeque<JobStatus>>>,
    pub submissions: Arc<Mutex<Vec<(PathBuf, Vec<String>)>>>,
    pub status_queries: Arc<Mutex<Vec<String>>>,
    pub cancels: Arc<Mutex<Vec<(String, Option<String>)>>>,
}

impl FakeScheduler {
    pub fn new(job_id: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            run_wrapper_on_submit: false,
            statuses: Arc::new(Mutex::new(VecDeque::new())),
            submissions: Arc::new(Mutex::new(Vec::new())),
            status_queries: Arc::new(Mutex::new(Vec::new())),
            cancels: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Script the statuses returned by successive queries.
    pub fn with_statuses<I>(self, statuses: I) -> Self
    where
        I: IntoIterator<Item = JobStatus>,
    {
        self.statuses.lock().unwrap().extend(statuses);
        self
    }

    /// Execute the wrapper under `bash` when it is "submitted".
    pub fn run_wrapper_on_submit(mut self) -> Self {
        self.run_wrapper_on_submit = true;
        self
    }
}

impl SchedulerBackend for FakeScheduler {
    fn submit<'a>(
        &'a mut self,
        wrapper: &'a Path,
        submit_args: &'a [String],
        id_capture: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            self.submissions
                .lock()
                .unwrap()
                .push((wrapper.to_path_buf(), submit_args.to_vec()));

            // Mimic the real backend's stdout capture.
            std::fs::write(id_capture, format!("{}\n", self.job_id))?;

            if self.run_wrapper_on_submit {
                let status = tokio::process::Command::new("bash")
                    .arg(wrapper)
                    .status()
                    .await?;
                assert!(status.success(), "wrapper script failed: {status}");
            }

            Ok(self.job_id.clone())
        })
    }

    fn query_status<'a>(
        &'a mut self,
        job_id: &'a str,
        _cell_name: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<JobStatus>> + Send + 'a>> {
        Box::pin(async move {
            self.status_queries.lock().unwrap().push(job_id.to_string());
            let next = self.statuses.lock().unwrap().pop_front();
            Ok(next.unwrap_or(JobStatus::Unknown))
        })
    }

    fn cancel<'a>(
        &'a mut self,
        job_id: &'a str,
        cell_name: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.cancels
                .lock()
                .unwrap()
                .push((job_id.to_string(), cell_name.map(str::to_string)));
            Ok(())
        })
    }
}

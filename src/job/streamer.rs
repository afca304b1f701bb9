// src/job/streamer.rs

//! Near-real-time forwarding of the job's output file to our stdout.

use std::path::Path;
use std::process::Stdio;

use anyhow::Context;
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, warn};

use crate::errors::Result;

/// A `tail -f` follow process attached to the job's output file.
///
/// The file is touched before the follow process starts, and the follow
/// process starts before the job is submitted, so no output can be written
/// before there is a reader. `-n +1` replays from the first byte in case
/// the wrapper wins the race between spawn and attach.
#[derive(Debug)]
pub struct OutputStreamer {
    child: Option<Child>,
}

impl OutputStreamer {
    /// Touch `output_file` and start following it onto our own stdout.
    pub fn begin(output_file: &Path) -> Result<Self> {
        Self::spawn(output_file, Stdio::inherit())
    }

    /// Like [`begin`](Self::begin), but with the follow process's stdout
    /// piped so a caller can observe the streamed bytes. Used by tests.
    pub fn begin_piped(output_file: &Path) -> Result<Self> {
        Self::spawn(output_file, Stdio::piped())
    }

    fn spawn(output_file: &Path, stdout: Stdio) -> Result<Self> {
        std::fs::File::create(output_file)
            .with_context(|| format!("creating output file {:?}", output_file))?;

        let child = Command::new("tail")
            .args(["-n", "+1", "-f"])
            .arg(output_file)
            .stdout(stdout)
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawning tail -f for {:?}", output_file))?;

        debug!(file = %output_file.display(), pid = child.id(), "output streamer started");
        Ok(Self { child: Some(child) })
    }

    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.as_mut().and_then(|c| c.stdout.take())
    }

    /// Send the follow process a kill signal. Its death is not awaited;
    /// `kill_on_drop` covers the case where the signal is lost.
    pub fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            debug!(pid = child.id(), "stopping output streamer");
            if let Err(e) = child.start_kill() {
                warn!(error = %e, "failed to signal output streamer");
            }
        }
    }
}

// src/job/packager.rs

//! Packaging of the user script into a submittable wrapper job.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::errors::Result;

/// The fixed file layout inside a job working directory.
#[derive(Debug, Clone)]
pub struct JobFiles {
    /// Copy of the runner-generated script. The original lives in a temp
    /// location the runner may clean up underneath us, so the job is made
    /// self-contained before submission.
    pub user_script: PathBuf,
    /// The wrapper script handed to the scheduler.
    pub wrapper: PathBuf,
    /// Combined stdout+stderr of the user script, append-only.
    pub output_file: PathBuf,
    /// Single integer: the user script's exit status.
    pub exit_code_file: PathBuf,
    /// Transient capture of the submission command's stdout.
    pub job_id_file: PathBuf,
}

impl JobFiles {
    pub fn new(dir: &Path) -> Self {
        Self {
            user_script: dir.join("user_script.sh"),
            wrapper: dir.join("user_job"),
            output_file: dir.join("output_file"),
            exit_code_file: dir.join("exit_code_file"),
            job_id_file: dir.join("jobid"),
        }
    }
}

/// Copy the user script into the working directory and write the wrapper.
///
/// The wrapper appends the script's combined output to `output_file` and
/// records its exit status in `exit_code_file`; the scheduler runs the
/// wrapper, while the driver only ever watches those two files.
pub fn package(user_script_src: &Path, files: &JobFiles) -> Result<()> {
    std::fs::copy(user_script_src, &files.user_script).with_context(|| {
        format!(
            "copying user script {:?} to {:?}",
            user_script_src, files.user_script
        )
    })?;

    // The copy is run under bash rather than executed directly, so the
    // source script's permission bits don't matter.
    let wrapper = format!(
        "#!/bin/bash\nbash '{}' >> '{}' 2>&1\necho $? > '{}'\n",
        files.user_script.display(),
        files.output_file.display(),
        files.exit_code_file.display(),
    );
    std::fs::write(&files.wrapper, &wrapper)
        .with_context(|| format!("writing wrapper script {:?}", files.wrapper))?;

    debug!(wrapper = %files.wrapper.display(), "wrote wrapper script:\n{wrapper}");
    Ok(())
}

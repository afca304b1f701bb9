// src/job/workspace.rs

//! Per-job temporary directory handling.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::errors::Result;

/// The uniquely-named directory holding one job's files.
///
/// Created at coordinator construction and removed at teardown. Removal is
/// not tied to `Drop`: the coordinator decides when (and whether) to destroy
/// it, and destruction must succeed on every exit path including ones where
/// the directory is already partially or fully gone.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create a fresh `ordrun_job_*` directory under `prefix` (or the system
    /// temp directory when no prefix is given).
    pub fn create(prefix: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("ordrun_job_");

        let dir = match prefix {
            Some(p) => builder
                .tempdir_in(p)
                .with_context(|| format!("creating job directory under {:?}", p))?,
            None => builder.tempdir().context("creating job directory")?,
        };

        // The coordinator owns the lifetime; opt out of tempfile's
        // drop-based deletion.
        Ok(Self { root: dir.keep() })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Recursively remove the directory, tolerating non-existence.
    pub fn destroy(&self) -> Result<()> {
        match std::fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// src/cleanup.rs

//! The `cleanup` executor stage.
//!
//! The runner launches every stage with `TMPDIR=$TMPDIR/custom-executorXXXX`.
//! It creates that directory and puts job files into it but never deletes
//! it, so this stage does.

use std::io::ErrorKind;

use anyhow::anyhow;
use tracing::info;

use crate::environment::shell_env_lookup;
use crate::errors::Result;

/// Remove the runner-provided `$TMPDIR`, tolerating an already-missing
/// directory. Refuses to run when `TMPDIR` is unset rather than guessing a
/// path to delete.
pub async fn remove_runner_tmpdir() -> Result<()> {
    let tmpdir = shell_env_lookup("TMPDIR")
        .await?
        .ok_or_else(|| anyhow!("TMPDIR is not set; refusing to clean up"))?;

    info!(dir = %tmpdir, "removing runner temporary directory");
    match std::fs::remove_dir_all(&tmpdir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

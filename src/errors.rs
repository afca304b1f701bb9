// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrdrunError {
    #[error("Job submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Status query for job '{job_id}' returned more than one record")]
    AmbiguousStatus { job_id: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, OrdrunError>;

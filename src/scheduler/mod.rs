// src/scheduler/mod.rs

//! Interface to the remote batch scheduler.
//!
//! The scheduler itself is opaque: submission, status and deletion are
//! external CLI commands with a small text contract. Everything the rest of
//! the crate needs is behind [`SchedulerBackend`], so tests can substitute a
//! fake that never shells out.

pub mod backend;
pub mod ids;

pub use backend::{OrdSchedulerBackend, SchedulerBackend, parse_status_output};
pub use ids::{cell_name_from_args, query_job_id};

use std::fmt;

/// Scheduler-reported job status.
///
/// `Other` covers status codes this driver does not know about; they are
/// not terminal, so the poll loop keeps waiting on them. `Unknown` means
/// the query itself failed or returned no record, and is treated as
/// terminal so a broken scheduler connection cannot wedge the poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Running,
    Ended,
    Cancelled,
    Deleted,
    Other(String),
    Unknown,
}

impl JobStatus {
    /// Parse the status field of a `jobst` CSV record.
    pub fn from_code(code: &str) -> Self {
        match code {
            "Q" => JobStatus::Queued,
            "R" => JobStatus::Running,
            "E" => JobStatus::Ended,
            "CA" => JobStatus::Cancelled,
            "CD" => JobStatus::Deleted,
            other => JobStatus::Other(other.to_string()),
        }
    }

    /// Statuses that end the poll loop.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Ended | JobStatus::Cancelled | JobStatus::Deleted | JobStatus::Unknown
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Ended => write!(f, "ended"),
            JobStatus::Cancelled => write!(f, "cancelled"),
            JobStatus::Deleted => write!(f, "deleted"),
            JobStatus::Other(code) => write!(f, "other({code})"),
            JobStatus::Unknown => write!(f, "unknown"),
        }
    }
}

//! Queued units of work.
//!
//! Two job kinds share the single `sequencer` queue: periodic housekeeping
//! jobs from the heartbeat and transaction jobs from the HTTP ingress. The
//! queue assigns ids and owns the delivery lifecycle; producers and the
//! worker only ever hand a job to the next stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Queue-assigned job identifier. Monotonically increasing within the store,
/// so ids are ordering-informative for jobs from a single producer stream.
pub type JobId = i64;

/// Job kind, dispatched on by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobKind {
    /// Periodic housekeeping job from the heartbeat producer.
    Auto,
    /// Client-submitted transaction carrying witness fields.
    Transaction,
}

impl JobKind {
    /// Wire name used as the job name in the queue store.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Auto => "autoJob",
            JobKind::Transaction => "transaction",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "autoJob" => Some(JobKind::Auto),
            "transaction" => Some(JobKind::Transaction),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Queue-assigned delivery state.
///
/// `Waiting -> Active -> {Completed | Failed}`, where a failed delivery with
/// attempts left goes back to `Waiting` for redelivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Waiting,
    Active,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Waiting => "waiting",
            JobStatus::Active => "active",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "waiting" => Some(JobStatus::Waiting),
            "active" => Some(JobStatus::Active),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    /// Terminal states are queue-assigned and never left again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// A job as stored in and delivered by the queue.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub kind: JobKind,
    pub payload: serde_json::Value,
    pub status: JobStatus,
    /// Delivery attempts so far (incremented on claim).
    pub attempts: u32,
    pub max_attempts: u32,
    pub enqueued_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// The fixed sentinel payload carried by every `Auto` job.
pub fn auto_payload() -> serde_json::Value {
    serde_json::json!({ "command": 0 })
}

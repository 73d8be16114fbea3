//! Request/response types for the ingress API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Job, JobId};

/// Body of `POST /send`. The `value` object carries the witness fields and
/// is forwarded to the queue untouched on admission.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub value: Option<serde_json::Value>,
}

/// Job status echo for `GET /job/{id}`.
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub id: JobId,
    pub kind: String,
    pub status: String,
    pub attempts: u32,
    pub max_attempts: u32,
    pub enqueued_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl From<Job> for JobStatusResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            kind: job.kind.as_str().to_string(),
            status: job.status.as_str().to_string(),
            attempts: job.attempts,
            max_attempts: job.max_attempts,
            enqueued_at: job.enqueued_at,
            claimed_at: job.claimed_at,
            finished_at: job.finished_at,
            last_error: job.last_error,
        }
    }
}

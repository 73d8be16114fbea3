//! Trait definitions for the sequencer's queue hand-off.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{Job, JobId, JobKind};

use super::Result;

/// Ordered, durable hand-off between producers (HTTP ingress, heartbeat)
/// and the worker.
///
/// Delivery is at-least-once per job: a claimed job whose outcome is never
/// reported, or is reported failed, becomes claimable again until its
/// attempt budget runs out. Claiming is mutually exclusive; a job is held by
/// at most one worker at a time.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Append a job and return the store-assigned id.
    async fn enqueue(&self, kind: JobKind, payload: serde_json::Value) -> Result<JobId>;

    /// Claim the oldest waiting job, marking it active. `None` when idle.
    async fn claim(&self) -> Result<Option<Job>>;

    /// Report successful processing. Terminal.
    async fn complete(&self, id: JobId) -> Result<()>;

    /// Report failed processing. The queue either requeues the job for
    /// redelivery or, once attempts are exhausted, parks it as failed.
    async fn fail(&self, id: JobId, error: &str) -> Result<()>;

    /// Fetch a job by id for status observation.
    async fn get(&self, id: JobId) -> Result<Option<Job>>;

    /// Number of jobs currently waiting to be claimed.
    async fn waiting_count(&self) -> Result<u64>;
}

//! Queue consumer that drains the sequencer queue.
//!
//! Claims one job at a time and dispatches by kind: housekeeping jobs are
//! logged, transaction jobs are forwarded to the node. The worker only
//! reports outcomes; redelivery and backoff belong to the queue.
//!
//! # Configuration
//!
//! - `WORKER_POLL_INTERVAL_MS` - claim poll period when idle (default: 500)
//! - `WORKER_COUNT` - number of concurrent claim loops (default: 1)

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::domain::{Job, JobKind, RawWitness, TxWitness};
use crate::infra::{JobQueue, ShutdownSignal};
use crate::metrics::MetricsRegistry;
use crate::rpc::TxSubmitter;

/// Configuration for the sequencer worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Claim poll period when the queue is idle.
    pub poll_interval: Duration,
    /// Number of concurrent claim loops.
    pub worker_count: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            worker_count: 1,
        }
    }
}

impl WorkerConfig {
    /// Load configuration from environment.
    pub fn from_env() -> Self {
        let poll_interval = std::env::var("WORKER_POLL_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(500));

        let worker_count = std::env::var("WORKER_COUNT")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(1);

        Self {
            poll_interval,
            worker_count,
        }
    }
}

/// One claim loop over the sequencer queue.
pub struct SequencerWorker {
    queue: Arc<dyn JobQueue>,
    submitter: Arc<dyn TxSubmitter>,
    metrics: Arc<MetricsRegistry>,
    shutdown: ShutdownSignal,
    poll_interval: Duration,
}

impl SequencerWorker {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        submitter: Arc<dyn TxSubmitter>,
        metrics: Arc<MetricsRegistry>,
        shutdown: ShutdownSignal,
        poll_interval: Duration,
    ) -> Self {
        Self {
            queue,
            submitter,
            metrics,
            shutdown,
            poll_interval,
        }
    }

    /// Run until shutdown. Drains the queue on every poll tick.
    pub async fn run(self) {
        info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Starting sequencer worker"
        );

        let mut shutdown = self.shutdown.clone();
        let mut ticker = interval(self.poll_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    while self.run_once().await {
                        if shutdown.is_shutdown() {
                            break;
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("Sequencer worker shutting down");
                    break;
                }
            }
        }
    }

    /// Claim and process at most one job. Returns whether a job was handled.
    pub async fn run_once(&self) -> bool {
        let job = match self.queue.claim().await {
            Ok(Some(job)) => job,
            Ok(None) => return false,
            Err(e) => {
                error!(error = %e, "Failed to claim a job");
                return false;
            }
        };

        match job.kind {
            JobKind::Auto => self.handle_auto(job).await,
            JobKind::Transaction => self.handle_transaction(job).await,
        }
        true
    }

    /// Housekeeping jobs are observed locally; no external call.
    async fn handle_auto(&self, job: Job) {
        info!(job_id = job.id, payload = %job.payload, "Handle auto job");
        self.metrics.inc_counter("jobs_completed_autoJob").await;
        if let Err(e) = self.queue.complete(job.id).await {
            error!(job_id = job.id, error = %e, "Failed to mark auto job completed");
        }
    }

    async fn handle_transaction(&self, job: Job) {
        debug!(job_id = job.id, "Handle transaction job");

        let witness = match extract_witness(&job) {
            Ok(witness) => witness,
            Err(reason) => {
                warn!(job_id = job.id, reason, "Transaction job has no usable witness");
                self.report_failure(job.id, reason).await;
                return;
            }
        };

        match self.submitter.submit_witnesses(&[witness]).await {
            Ok(response) => {
                debug!(job_id = job.id, response = %response, "Transaction submitted");
                self.metrics.inc_counter("jobs_completed_transaction").await;
                if let Err(e) = self.queue.complete(job.id).await {
                    error!(job_id = job.id, error = %e, "Failed to mark transaction completed");
                }
            }
            Err(e) => {
                warn!(job_id = job.id, error = %e, "Transaction submission failed");
                self.report_failure(job.id, &e.to_string()).await;
            }
        }
    }

    async fn report_failure(&self, job_id: i64, reason: &str) {
        self.metrics.inc_counter("jobs_failed_transaction").await;
        if let Err(e) = self.queue.fail(job_id, reason).await {
            error!(job_id, error = %e, "Failed to report job failure");
        }
    }
}

/// Pull the witness out of a transaction job's `{ "value": ... }` payload.
///
/// Admission already verified the signature; a parse failure here means the
/// payload was corrupted in the store, so the job is failed rather than
/// panicking the loop.
fn extract_witness(job: &Job) -> Result<TxWitness, &'static str> {
    let value = job.payload.get("value").ok_or("payload has no value")?;
    let raw = RawWitness::from_value(value).ok_or("value is missing witness fields")?;
    raw.parse().ok_or("witness fields failed to parse")
}

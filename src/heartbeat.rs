//! Periodic housekeeping job producer.
//!
//! Enqueues one `Auto` job per tick, independent of HTTP traffic. A failed
//! enqueue is logged and dropped; the tick is lost, not retried, and the
//! timer keeps running. This stream is deliberately at-most-once, unlike
//! transaction jobs.
//!
//! # Configuration
//!
//! - `HEARTBEAT_INTERVAL_MS` - tick period (default: 5000)

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{debug, error, info};

use crate::domain::{auto_payload, JobId, JobKind};
use crate::infra::{JobQueue, ShutdownSignal};
use crate::metrics::MetricsRegistry;

/// Configuration for the heartbeat producer.
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Tick period.
    pub interval: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5000),
        }
    }
}

impl HeartbeatConfig {
    /// Load configuration from environment.
    pub fn from_env() -> Self {
        let interval = std::env::var("HEARTBEAT_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(5000));
        Self { interval }
    }
}

/// Fixed-period `Auto` job producer owned by the service lifecycle.
pub struct HeartbeatProducer {
    queue: Arc<dyn JobQueue>,
    metrics: Arc<MetricsRegistry>,
    shutdown: ShutdownSignal,
    interval: Duration,
}

impl HeartbeatProducer {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        metrics: Arc<MetricsRegistry>,
        shutdown: ShutdownSignal,
        interval: Duration,
    ) -> Self {
        Self {
            queue,
            metrics,
            shutdown,
            interval,
        }
    }

    /// Run until shutdown, producing one job per tick.
    pub async fn run(self) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Starting heartbeat producer"
        );

        let mut shutdown = self.shutdown.clone();
        let mut ticker = interval(self.interval);
        // The first interval tick fires immediately; skip it so the first
        // job lands one full period after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.produce_once().await;
                }
                _ = shutdown.recv() => {
                    info!("Heartbeat producer shutting down");
                    break;
                }
            }
        }
    }

    /// Attempt one tick's enqueue. Returns the job id when the queue
    /// accepted it, `None` when the tick was lost.
    pub async fn produce_once(&self) -> Option<JobId> {
        match self.queue.enqueue(JobKind::Auto, auto_payload()).await {
            Ok(id) => {
                debug!(job_id = id, "Enqueued auto job");
                self.metrics.inc_counter("jobs_enqueued_autoJob").await;
                Some(id)
            }
            Err(e) => {
                error!(error = %e, "Error adding automatic job to the queue");
                self.metrics.inc_counter("heartbeat_ticks_lost").await;
                None
            }
        }
    }
}

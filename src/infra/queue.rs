//! SQLite-backed durable job queue.
//!
//! A single `jobs` table is the system of record for delivery: ids come
//! from `AUTOINCREMENT` (monotonic per store), claiming is a single atomic
//! `UPDATE ... RETURNING`, and failed deliveries are requeued until the
//! per-job attempt budget is spent.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, FromRow};

use crate::domain::{Job, JobId, JobKind, JobStatus};
use crate::infra::{JobQueue, Result, SequencerError};

use async_trait::async_trait;

/// Durable queue over a SQLite connection pool.
pub struct SqliteJobQueue {
    pool: SqlitePool,
    max_attempts: u32,
}

impl SqliteJobQueue {
    /// Create a queue with the given connection pool.
    pub fn new(pool: SqlitePool, max_attempts: u32) -> Self {
        Self { pool, max_attempts }
    }

    /// Create a queue from a database URL.
    pub async fn from_url(url: &str, max_attempts: u32) -> Result<Self> {
        let pool = SqlitePool::connect(url).await?;
        Ok(Self::new(pool, max_attempts))
    }

    /// Initialize the database schema.
    pub async fn initialize(&self) -> Result<()> {
        crate::migrations::run_sqlite(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl JobQueue for SqliteJobQueue {
    async fn enqueue(&self, kind: JobKind, payload: serde_json::Value) -> Result<JobId> {
        let payload_json = serde_json::to_string(&payload)?;
        let result = sqlx::query(
            r#"
            INSERT INTO jobs (kind, payload, status, attempts, max_attempts, enqueued_at)
            VALUES (?, ?, 'waiting', 0, ?, ?)
            "#,
        )
        .bind(kind.as_str())
        .bind(&payload_json)
        .bind(self.max_attempts as i64)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn claim(&self) -> Result<Option<Job>> {
        // Single-statement claim keeps concurrent workers from taking the
        // same job.
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs
            SET status = 'active', attempts = attempts + 1, claimed_at = ?
            WHERE id = (SELECT id FROM jobs WHERE status = 'waiting' ORDER BY id ASC LIMIT 1)
              AND status = 'waiting'
            RETURNING id, kind, payload, status, attempts, max_attempts,
                      enqueued_at, claimed_at, finished_at, last_error
            "#,
        )
        .bind(Utc::now().to_rfc3339())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Job::try_from).transpose()
    }

    async fn complete(&self, id: JobId) -> Result<()> {
        let result = sqlx::query(
            "UPDATE jobs SET status = 'completed', finished_at = ? WHERE id = ? AND status = 'active'",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(SequencerError::JobNotFound(id));
        }
        Ok(())
    }

    async fn fail(&self, id: JobId, error: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = CASE WHEN attempts >= max_attempts THEN 'failed' ELSE 'waiting' END,
                finished_at = CASE WHEN attempts >= max_attempts THEN ? ELSE finished_at END,
                last_error = ?
            WHERE id = ? AND status = 'active'
            "#,
        )
        .bind(Utc::now().to_rfc3339())
        .bind(error)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(SequencerError::JobNotFound(id));
        }
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, kind, payload, status, attempts, max_attempts,
                   enqueued_at, claimed_at, finished_at, last_error
            FROM jobs
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Job::try_from).transpose()
    }

    async fn waiting_count(&self) -> Result<u64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs WHERE status = 'waiting'")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 as u64)
    }
}

/// Raw row from the jobs table.
#[derive(Debug, FromRow)]
struct JobRow {
    id: i64,
    kind: String,
    payload: String,
    status: String,
    attempts: i64,
    max_attempts: i64,
    enqueued_at: String,
    claimed_at: Option<String>,
    finished_at: Option<String>,
    last_error: Option<String>,
}

impl TryFrom<JobRow> for Job {
    type Error = SequencerError;

    fn try_from(row: JobRow) -> Result<Self> {
        let corrupt = |message: String| SequencerError::CorruptJob {
            id: row.id,
            message,
        };

        let kind = JobKind::parse(&row.kind)
            .ok_or_else(|| corrupt(format!("unknown kind {:?}", row.kind)))?;
        let status = JobStatus::parse(&row.status)
            .ok_or_else(|| corrupt(format!("unknown status {:?}", row.status)))?;
        let payload: serde_json::Value = serde_json::from_str(&row.payload)
            .map_err(|e| corrupt(format!("invalid payload JSON: {e}")))?;

        let parse_ts = |s: &str| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| corrupt(format!("invalid timestamp: {e}")))
        };

        Ok(Job {
            id: row.id,
            kind,
            payload,
            status,
            attempts: row.attempts as u32,
            max_attempts: row.max_attempts as u32,
            enqueued_at: parse_ts(&row.enqueued_at)?,
            claimed_at: row.claimed_at.as_deref().map(parse_ts).transpose()?,
            finished_at: row.finished_at.as_deref().map(parse_ts).transpose()?,
            last_error: row.last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auto_payload;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_queue(max_attempts: u32) -> SqliteJobQueue {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();
        let queue = SqliteJobQueue::new(pool, max_attempts);
        queue.initialize().await.unwrap();
        queue
    }

    #[tokio::test]
    async fn enqueue_assigns_increasing_ids() {
        let queue = create_test_queue(3).await;

        let first = queue.enqueue(JobKind::Auto, auto_payload()).await.unwrap();
        let second = queue
            .enqueue(JobKind::Transaction, json!({"value": {"msg": "aa"}}))
            .await
            .unwrap();
        assert!(second > first);
        assert_eq!(queue.waiting_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn claim_is_fifo_and_exclusive() {
        let queue = create_test_queue(3).await;
        let first = queue.enqueue(JobKind::Auto, auto_payload()).await.unwrap();
        queue
            .enqueue(JobKind::Transaction, json!({"value": {}}))
            .await
            .unwrap();

        let claimed = queue.claim().await.unwrap().unwrap();
        assert_eq!(claimed.id, first);
        assert_eq!(claimed.status, JobStatus::Active);
        assert_eq!(claimed.attempts, 1);

        // The active job is not claimable again.
        let next = queue.claim().await.unwrap().unwrap();
        assert_ne!(next.id, first);
        assert!(queue.claim().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn complete_is_terminal() {
        let queue = create_test_queue(3).await;
        let id = queue.enqueue(JobKind::Auto, auto_payload()).await.unwrap();

        let job = queue.claim().await.unwrap().unwrap();
        queue.complete(job.id).await.unwrap();

        let stored = queue.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Completed);
        assert!(stored.finished_at.is_some());
        assert!(queue.claim().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_jobs_are_redelivered_until_attempts_run_out() {
        let queue = create_test_queue(2).await;
        let id = queue
            .enqueue(JobKind::Transaction, json!({"value": {}}))
            .await
            .unwrap();

        // First delivery fails: back to waiting.
        let job = queue.claim().await.unwrap().unwrap();
        queue.fail(job.id, "submitTxError").await.unwrap();
        let stored = queue.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Waiting);
        assert_eq!(stored.last_error.as_deref(), Some("submitTxError"));

        // Second delivery exhausts the budget: terminal failure.
        let job = queue.claim().await.unwrap().unwrap();
        assert_eq!(job.attempts, 2);
        queue.fail(job.id, "submitTxError").await.unwrap();
        let stored = queue.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Failed);
        assert!(queue.claim().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reporting_an_unclaimed_job_is_an_error() {
        let queue = create_test_queue(3).await;
        let id = queue.enqueue(JobKind::Auto, auto_payload()).await.unwrap();

        assert!(matches!(
            queue.complete(id).await,
            Err(SequencerError::JobNotFound(_))
        ));
        assert!(matches!(
            queue.fail(9999, "nope").await,
            Err(SequencerError::JobNotFound(_))
        ));
    }

    #[tokio::test]
    async fn payload_survives_the_roundtrip() {
        let queue = create_test_queue(3).await;
        let payload = json!({"value": {"msg": "deadbeef", "pkx": "01"}});
        queue
            .enqueue(JobKind::Transaction, payload.clone())
            .await
            .unwrap();

        let job = queue.claim().await.unwrap().unwrap();
        assert_eq!(job.kind, JobKind::Transaction);
        assert_eq!(job.payload, payload);
    }
}

//! SQLite schema bootstrap for the job queue.

use sqlx::sqlite::SqlitePool;

/// Create the queue schema if it does not exist. Safe to run on every start.
pub async fn run_sqlite(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            kind         TEXT NOT NULL,
            payload      TEXT NOT NULL,
            status       TEXT NOT NULL DEFAULT 'waiting',
            attempts     INTEGER NOT NULL DEFAULT 0,
            max_attempts INTEGER NOT NULL,
            enqueued_at  TEXT NOT NULL,
            claimed_at   TEXT,
            finished_at  TEXT,
            last_error   TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs (status, id)")
        .execute(pool)
        .await?;

    Ok(())
}

//! Common test utilities and fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use sqlx::sqlite::SqlitePoolOptions;

use zkc_sequencer::crypto::{sign_witness, Ed25519Verifier};
use zkc_sequencer::metrics::MetricsRegistry;
use zkc_sequencer::server::AppState;
use zkc_sequencer::{JobQueue, SignatureGate, SqliteJobQueue};

/// In-memory queue backed by a single pooled connection.
pub async fn in_memory_queue(max_attempts: u32) -> Arc<SqliteJobQueue> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .unwrap();
    let queue = SqliteJobQueue::new(pool, max_attempts);
    queue.initialize().await.unwrap();
    Arc::new(queue)
}

/// Application state over the given queue, with the real Ed25519 gate.
pub fn test_state(queue: Arc<dyn JobQueue>) -> AppState {
    AppState {
        queue,
        gate: Arc::new(SignatureGate::new(Arc::new(Ed25519Verifier))),
        metrics: Arc::new(MetricsRegistry::new()),
    }
}

/// A correctly signed `value` object for `POST /send`.
pub fn signed_value(msg: &[u8]) -> serde_json::Value {
    let key = SigningKey::generate(&mut OsRng);
    serde_json::to_value(sign_witness(&key, msg)).unwrap()
}

/// Serve a router on an ephemeral port, returning its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/")
}

/// Pull the job id out of a `201` response text
/// (`... added to the queue with job <id>`).
pub fn job_id_from_body(body: &str) -> i64 {
    body.rsplit(' ').next().unwrap().parse().unwrap()
}

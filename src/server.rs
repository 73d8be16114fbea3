//! HTTP server bootstrap for the zkc sequencer.
//!
//! This module wires together:
//! - configuration
//! - the SQLite-backed job queue
//! - the signature gate and node RPC client
//! - background tasks (worker loops, heartbeat)
//! - the Axum router

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use crate::crypto::{Ed25519Verifier, SignatureGate};
use crate::heartbeat::{HeartbeatConfig, HeartbeatProducer};
use crate::infra::{JobQueue, ShutdownCoordinator, SqliteJobQueue};
use crate::metrics::MetricsRegistry;
use crate::rpc::{NodeClient, NodeClientConfig};
use crate::worker::{SequencerWorker, WorkerConfig};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL for the queue store.
    pub database_url: String,
    /// Server listen address.
    pub listen_addr: SocketAddr,
    /// Maximum queue store connections.
    pub max_connections: u32,
    /// Downstream node endpoint.
    pub node_rpc_url: String,
    /// Per-call node RPC timeout.
    pub node_rpc_timeout: Duration,
    /// Image id transactions are submitted against.
    pub image_md5: String,
    /// Delivery attempt budget per job.
    pub job_max_attempts: u32,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://zkc-sequencer.db?mode=rwc".to_string());

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let listen_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .expect("Invalid listen address");

        let max_connections: u32 = std::env::var("MAX_DB_CONNECTIONS")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5);

        let node_rpc_url = std::env::var("NODE_RPC_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:12345".to_string());

        let node_rpc_timeout = std::env::var("NODE_RPC_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let image_md5 = std::env::var("IMAGE_MD5").unwrap_or_default();

        let job_max_attempts = std::env::var("JOB_MAX_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(5);

        Self {
            database_url,
            listen_addr,
            max_connections,
            node_rpc_url,
            node_rpc_timeout,
            image_md5,
            job_max_attempts,
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<dyn JobQueue>,
    pub gate: Arc<SignatureGate>,
    pub metrics: Arc<MetricsRegistry>,
}

/// Start the sequencer service.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting zkc sequencer v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    info!("Configuration loaded");
    info!("  Listen address: {}", config.listen_addr);
    info!("  Queue store: {}", config.database_url);
    info!("  Node endpoint: {}", config.node_rpc_url);

    // Queue store
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    crate::migrations::run_sqlite(&pool).await?;
    info!("Queue schema ready");

    let queue: Arc<dyn JobQueue> = Arc::new(SqliteJobQueue::new(pool, config.job_max_attempts));

    // Admission gate and downstream client
    let gate = Arc::new(SignatureGate::new(Arc::new(Ed25519Verifier)));
    let node_client = Arc::new(NodeClient::new(NodeClientConfig {
        base_url: config.node_rpc_url.clone(),
        image_md5: config.image_md5.clone(),
        timeout: config.node_rpc_timeout,
    })?);

    let metrics = Arc::new(MetricsRegistry::new());

    // Background tasks
    let coordinator = ShutdownCoordinator::new();
    coordinator.spawn_signal_listener();

    let heartbeat_config = HeartbeatConfig::from_env();
    tokio::spawn(
        HeartbeatProducer::new(
            queue.clone(),
            metrics.clone(),
            coordinator.subscribe(),
            heartbeat_config.interval,
        )
        .run(),
    );

    let worker_config = WorkerConfig::from_env();
    info!("Starting {} worker loop(s)", worker_config.worker_count);
    for _ in 0..worker_config.worker_count {
        tokio::spawn(
            SequencerWorker::new(
                queue.clone(),
                node_client.clone(),
                metrics.clone(),
                coordinator.subscribe(),
                worker_config.poll_interval,
            )
            .run(),
        );
    }

    // HTTP server
    let state = AppState {
        queue,
        gate,
        metrics,
    };
    let app = build_router().with_state(state);

    info!("Starting HTTP server on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;

    let mut shutdown = coordinator.subscribe();
    info!("zkc sequencer is ready to accept connections");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.recv().await })
        .await?;

    // The server only exits on shutdown; make sure background tasks follow.
    coordinator.trigger();
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();
}

/// Assemble the full router: ingress routes plus service endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(crate::api::router())
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_snapshot))
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "healthy",
        "service": "zkc-sequencer",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness check endpoint: probes the queue store.
async fn readiness_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<axum::Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    match state.queue.waiting_count().await {
        Ok(waiting) => Ok(axum::Json(serde_json::json!({
            "status": "ready",
            "jobs_waiting": waiting,
        }))),
        Err(e) => Err((
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            format!("Queue unavailable: {e}"),
        )),
    }
}

/// Metrics snapshot endpoint.
async fn metrics_snapshot(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> axum::Json<serde_json::Value> {
    axum::Json(state.metrics.snapshot().await)
}

//! zkc Sequencer Library
//!
//! Ingestion-and-sequencing pipeline for a zkc execution node: signed
//! transactions are admitted over HTTP, ordered in a durable job queue
//! alongside periodic housekeeping jobs, and drained by a worker that
//! forwards transactions to the node over JSON-RPC.
//!
//! ## Modules
//!
//! - [`domain`] - Core types (witnesses, jobs, query keys)
//! - [`crypto`] - Signature admission gate
//! - [`infra`] - Durable queue, errors, shutdown coordination
//! - [`rpc`] - JSON-RPC client for the downstream node
//! - [`worker`] - Queue consumer
//! - [`heartbeat`] - Periodic housekeeping producer
//! - [`api`] - HTTP ingress routes
//! - [`metrics`] - In-process observability
//! - [`server`] - Service bootstrap

pub mod api;
pub mod crypto;
pub mod domain;
pub mod heartbeat;
pub mod infra;
pub mod metrics;
pub mod migrations;
pub mod rpc;
pub mod server;
pub mod worker;

// Re-export commonly used types
pub use domain::{auto_payload, Job, JobId, JobKind, JobStatus, QueryKey, RawWitness, TxWitness};

pub use crypto::{Ed25519Verifier, SignatureGate, SignatureVerifier};

pub use infra::{JobQueue, Result, SequencerError, ShutdownCoordinator, SqliteJobQueue};

pub use rpc::{encode_private_inputs, NodeClient, NodeClientConfig, RpcError, TxSubmitter};

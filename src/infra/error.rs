//! Error types for the zkc sequencer infrastructure.

use thiserror::Error;

use crate::domain::JobId;

/// Errors that can occur in the sequencer pipeline outside the RPC client.
#[derive(Error, Debug)]
pub enum SequencerError {
    /// Queue store error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Job not found
    #[error("job not found: {0}")]
    JobNotFound(JobId),

    /// Payload (de)serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored row could not be decoded into a job
    #[error("corrupt job record {id}: {message}")]
    CorruptJob { id: JobId, message: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for sequencer operations
pub type Result<T> = std::result::Result<T, SequencerError>;

//! Failure classification for node RPC calls.

use thiserror::Error;

/// Exactly one of these surfaces per failed call. The three kinds are
/// disjoint so callers can decide retry behavior by matching instead of
/// parsing messages.
#[derive(Error, Debug)]
pub enum RpcError {
    /// The HTTP call itself did not complete: network failure, timeout, or
    /// a non-200 status.
    #[error("{op}Error")]
    Transport {
        op: &'static str,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// HTTP 200 with an `error` field in the envelope: the node processed
    /// the request and reported an application-level failure.
    #[error("{op}ServerError {detail}")]
    Remote {
        op: &'static str,
        detail: serde_json::Value,
    },

    /// HTTP 200, no `error`, but the `result` does not have the shape this
    /// operation requires.
    #[error("{op}Error: invalid result: {detail}")]
    Protocol { op: &'static str, detail: String },
}

impl RpcError {
    /// The operation name the error was raised for (e.g. `submitTx`).
    pub fn op(&self) -> &'static str {
        match self {
            RpcError::Transport { op, .. }
            | RpcError::Remote { op, .. }
            | RpcError::Protocol { op, .. } => op,
        }
    }
}

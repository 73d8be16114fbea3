//! JSON-RPC client for the downstream zkc execution/proof node.
//!
//! One endpoint, one POST per call. HTTP 200 is necessary but not
//! sufficient: the envelope's `error` field is the authoritative failure
//! signal, and a structurally invalid `result` is never surfaced as
//! success.

mod client;
mod encode;
mod error;

pub use client::{NodeClient, NodeClientConfig, TxSubmitter, TX_WEIGHT};
pub use encode::encode_private_inputs;
pub use error::RpcError;

#[cfg(test)]
pub use client::MockTxSubmitter;

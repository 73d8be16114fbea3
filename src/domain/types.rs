//! Storage-slot addressing for downstream state queries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error parsing a decimal-token key from the wire.
#[derive(Debug, Error)]
pub enum QueryKeyError {
    #[error("invalid key token: {0:?}")]
    InvalidToken(String),
}

/// An ordered sequence of u64 slot components addressing one storage slot in
/// the execution node. Transported as decimal-string tokens; order is
/// significant and preserved exactly in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryKey(Vec<u64>);

impl QueryKey {
    pub fn new(components: Vec<u64>) -> Self {
        Self(components)
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u64> {
        self.0
    }

    /// Serialize to the decimal-string tokens used on the wire.
    pub fn to_tokens(&self) -> Vec<String> {
        self.0.iter().map(u64::to_string).collect()
    }

    /// Parse decimal-string tokens back into components, preserving order.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, QueryKeyError> {
        tokens
            .iter()
            .map(|t| {
                t.as_ref()
                    .parse::<u64>()
                    .map_err(|_| QueryKeyError::InvalidToken(t.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl From<Vec<u64>> for QueryKey {
    fn from(components: Vec<u64>) -> Self {
        Self(components)
    }
}

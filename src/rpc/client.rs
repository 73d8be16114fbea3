//! The node client and its typed operations.

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::{QueryKey, TxWitness};
use crate::infra::{Result as InfraResult, SequencerError};
use crate::rpc::{encode_private_inputs, RpcError};

/// Provisional transaction weight forwarded with every submission. The node
/// does not act on it yet.
pub const TX_WEIGHT: u64 = 100;

/// Downstream node connection settings.
#[derive(Debug, Clone)]
pub struct NodeClientConfig {
    /// Base URL of the node's JSON-RPC endpoint.
    pub base_url: String,
    /// Image id (md5) naming the program/state transactions apply to.
    pub image_md5: String,
    /// Per-call HTTP timeout.
    pub timeout: Duration,
}

/// JSON-RPC-over-HTTP client for one zkc node endpoint.
///
/// Stateless per call and safe for concurrent use; retries are the caller's
/// responsibility.
#[derive(Debug, Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    base_url: String,
    image_md5: String,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(serde::Deserialize)]
struct RpcEnvelope {
    result: Option<serde_json::Value>,
    error: Option<serde_json::Value>,
}

impl NodeClient {
    pub fn new(config: NodeClientConfig) -> InfraResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SequencerError::Configuration(format!("http client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url,
            image_md5: config.image_md5,
        })
    }

    pub fn image_md5(&self) -> &str {
        &self.image_md5
    }

    /// Issue one POST and apply the shared envelope-validation contract.
    async fn call(
        &self,
        op: &'static str,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
        };

        let response = self
            .http
            .post(&self.base_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::Transport {
                op,
                source: Some(e),
            })?;

        let response = response
            .error_for_status()
            .map_err(|e| RpcError::Transport {
                op,
                source: Some(e),
            })?;

        let envelope: RpcEnvelope = response.json().await.map_err(|e| RpcError::Protocol {
            op,
            detail: format!("undecodable envelope: {e}"),
        })?;

        if let Some(error) = envelope.error {
            return Err(RpcError::Remote { op, detail: error });
        }

        envelope.result.ok_or(RpcError::Protocol {
            op,
            detail: "missing result".to_string(),
        })
    }

    /// Latest key-value pair for a storage slot. Value order is preserved.
    pub async fn query_latest_kvpair(&self, key: &QueryKey) -> Result<Vec<u64>, RpcError> {
        const OP: &str = "queryLatestKvpair";
        let result = self
            .call(
                OP,
                "rpc-query-latest-kvpair",
                json!({ "image_md5": self.image_md5, "key": key.to_tokens() }),
            )
            .await?;

        let tokens: Vec<String> = match result.get("value") {
            Some(value) => {
                serde_json::from_value(value.clone()).map_err(|e| RpcError::Protocol {
                    op: OP,
                    detail: format!("non-string value entry: {e}"),
                })?
            }
            None => {
                return Err(RpcError::Protocol {
                    op: OP,
                    detail: "missing value".to_string(),
                })
            }
        };

        QueryKey::from_tokens(&tokens)
            .map(QueryKey::into_inner)
            .map_err(|e| RpcError::Protocol {
                op: OP,
                detail: e.to_string(),
            })
    }

    /// Serialized state for a storage slot, returned verbatim.
    pub async fn query_state(&self, key: &QueryKey) -> Result<String, RpcError> {
        const OP: &str = "queryState";
        let result = self
            .call(
                OP,
                "rpc-query-state",
                json!({ "image_md5": self.image_md5, "key": key.to_tokens() }),
            )
            .await?;

        match result.get("state").and_then(|s| s.as_str()) {
            Some(state) => Ok(state.to_string()),
            None => Err(RpcError::Protocol {
                op: OP,
                detail: "missing state".to_string(),
            }),
        }
    }

    /// Single-image state query (`query-state`), result returned opaque.
    pub async fn query_state_single(
        &self,
        key: &QueryKey,
    ) -> Result<serde_json::Value, RpcError> {
        self.call("queryState", "query-state", json!({ "key": key.to_tokens() }))
            .await
    }

    /// Submit a transaction batch for sequencing/proving. The result is
    /// opaque to this pipeline.
    pub async fn submit_tx(
        &self,
        public_inputs: &[String],
        private_inputs: &[String],
    ) -> Result<serde_json::Value, RpcError> {
        self.call(
            "submitTx",
            "submit-tx",
            json!({
                "image_md5": self.image_md5,
                "weight": TX_WEIGHT,
                "public_inputs": public_inputs,
                "private_inputs": private_inputs,
            }),
        )
        .await
    }

    /// Run a batch directly against the node, bypassing proof scheduling.
    pub async fn execute_batch_direct(
        &self,
        public_inputs: &[String],
        private_inputs: &[String],
    ) -> Result<serde_json::Value, RpcError> {
        let batch_hash = content_hash(b"batch", private_inputs);
        let tx_hash = content_hash(b"tx", private_inputs);
        self.call(
            "executeBatchDirect",
            "execute-batch-direct",
            json!({
                "hash": batch_hash,
                "txs": [{
                    "hash": tx_hash,
                    "image_md5": self.image_md5,
                    "weight": TX_WEIGHT,
                    "public_inputs": public_inputs,
                    "private_inputs": private_inputs,
                }],
            }),
        )
        .await
    }

    /// Generic execute call against a named target.
    pub async fn execute(
        &self,
        id: &str,
        params: &[String],
    ) -> Result<serde_json::Value, RpcError> {
        self.call("execute", "execute", json!({ "id": id, "params": params }))
            .await
    }
}

/// Worker-facing submission seam, mockable in tests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TxSubmitter: Send + Sync {
    /// Encode the witnesses as private inputs and submit them.
    async fn submit_witnesses(
        &self,
        witnesses: &[TxWitness],
    ) -> Result<serde_json::Value, RpcError>;
}

#[async_trait]
impl TxSubmitter for NodeClient {
    async fn submit_witnesses(
        &self,
        witnesses: &[TxWitness],
    ) -> Result<serde_json::Value, RpcError> {
        let private_inputs = encode_private_inputs(witnesses);
        self.submit_tx(&[], &private_inputs).await
    }
}

/// Unique content hash for batch/tx identification on the node.
fn content_hash(domain: &[u8], inputs: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(Uuid::new_v4().as_bytes());
    for input in inputs {
        hasher.update(input.as_bytes());
    }
    hex::encode(hasher.finalize())
}

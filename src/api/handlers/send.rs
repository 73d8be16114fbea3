//! Transaction submission handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use tracing::{error, info, warn};

use crate::api::types::SendRequest;
use crate::domain::{JobKind, RawWitness};
use crate::server::AppState;

/// POST /send - validate a signed transaction and enqueue it.
///
/// Validation order, each a hard gate: `value` must be present; the witness
/// must verify (malformed fields count as verification failure); the
/// enqueue must succeed. The response echoes the queue-assigned job id;
/// "accepted" is the only success signal the caller ever gets, execution is
/// asynchronous.
pub async fn send_transaction(
    State(state): State<AppState>,
    Json(request): Json<SendRequest>,
) -> Result<(StatusCode, String), (StatusCode, String)> {
    let value = request.value.ok_or((
        StatusCode::BAD_REQUEST,
        "Value is required".to_string(),
    ))?;

    let admitted = RawWitness::from_value(&value)
        .map(|witness| state.gate.verify(&witness))
        .unwrap_or(false);

    if !admitted {
        warn!("Rejecting transaction: invalid signature");
        state.metrics.inc_counter("transactions_rejected").await;
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Invalid signature".to_string(),
        ));
    }

    match state
        .queue
        .enqueue(JobKind::Transaction, json!({ "value": value }))
        .await
    {
        Ok(id) => {
            info!(job_id = id, "Transaction admitted");
            state.metrics.inc_counter("jobs_enqueued_transaction").await;
            Ok((
                StatusCode::CREATED,
                format!("Transaction {value} added to the queue with job {id}"),
            ))
        }
        Err(e) => {
            error!(error = %e, "Error adding job to the queue");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to add job to the queue".to_string(),
            ))
        }
    }
}

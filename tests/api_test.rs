//! Ingress API integration tests.
//!
//! Drive the full router in-process and assert the admission contract:
//! response texts, status codes, and exactly-when-admitted enqueueing.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use async_trait::async_trait;
use zkc_sequencer::domain::{Job, JobId, JobKind};
use zkc_sequencer::server::build_router;
use zkc_sequencer::{JobQueue, JobStatus, Result, SequencerError};

use common::*;

async fn post_send(app: axum::Router, body: serde_json::Value) -> (StatusCode, String) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/send")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn missing_value_is_rejected_before_the_queue() {
    let queue = in_memory_queue(3).await;
    let app = build_router().with_state(test_state(queue.clone()));

    let (status, body) = post_send(app, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Value is required");
    assert_eq!(queue.waiting_count().await.unwrap(), 0);
}

#[tokio::test]
async fn malformed_witness_fields_are_a_signature_failure() {
    let queue = in_memory_queue(3).await;
    let app = build_router().with_state(test_state(queue.clone()));

    // Not hex at all.
    let value = json!({
        "msg": "not-hex", "pkx": "00", "pky": "00",
        "sigx": "00", "sigy": "00", "sigr": "00",
    });
    let (status, body) = post_send(app.clone(), json!({ "value": value })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Invalid signature");

    // Fields missing entirely.
    let (status, body) = post_send(app, json!({ "value": {"msg": "aa"} })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Invalid signature");

    assert_eq!(queue.waiting_count().await.unwrap(), 0);
}

#[tokio::test]
async fn forged_signature_is_rejected() {
    let queue = in_memory_queue(3).await;
    let app = build_router().with_state(test_state(queue.clone()));

    let mut value = signed_value(b"pay alice 5");
    value["sigr"] = json!("0100000000000000000000000000000000000000000000000000000000000000");

    let (status, body) = post_send(app, json!({ "value": value })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Invalid signature");
    assert_eq!(queue.waiting_count().await.unwrap(), 0);
}

#[tokio::test]
async fn valid_transaction_is_admitted_with_its_job_id() {
    let queue = in_memory_queue(3).await;
    let app = build_router().with_state(test_state(queue.clone()));

    let value = signed_value(b"pay alice 5");
    let (status, body) = post_send(app, json!({ "value": value.clone() })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.starts_with("Transaction "));
    assert!(body.contains("added to the queue with job "));

    let id = job_id_from_body(&body);
    let job = queue.get(id).await.unwrap().unwrap();
    assert_eq!(job.kind, JobKind::Transaction);
    assert_eq!(job.status, JobStatus::Waiting);
    assert_eq!(job.payload, json!({ "value": value }));
}

#[tokio::test]
async fn job_status_endpoint_reflects_the_queue() {
    let queue = in_memory_queue(3).await;
    let app = build_router().with_state(test_state(queue.clone()));

    let value = signed_value(b"pay bob 9");
    let (_, body) = post_send(app.clone(), json!({ "value": value })).await;
    let id = job_id_from_body(&body);

    let request = Request::builder()
        .uri(format!("/job/{id}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let status: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(status["id"], id);
    assert_eq!(status["kind"], "transaction");
    assert_eq!(status["status"], "waiting");

    let request = Request::builder()
        .uri("/job/999999")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Queue stub whose enqueue always fails.
struct UnavailableQueue;

#[async_trait]
impl JobQueue for UnavailableQueue {
    async fn enqueue(&self, _kind: JobKind, _payload: serde_json::Value) -> Result<JobId> {
        Err(SequencerError::Internal("queue unavailable".to_string()))
    }

    async fn claim(&self) -> Result<Option<Job>> {
        Ok(None)
    }

    async fn complete(&self, id: JobId) -> Result<()> {
        Err(SequencerError::JobNotFound(id))
    }

    async fn fail(&self, id: JobId, _error: &str) -> Result<()> {
        Err(SequencerError::JobNotFound(id))
    }

    async fn get(&self, _id: JobId) -> Result<Option<Job>> {
        Ok(None)
    }

    async fn waiting_count(&self) -> Result<u64> {
        Ok(0)
    }
}

#[tokio::test]
async fn enqueue_failure_surfaces_as_a_generic_500() {
    let app = build_router().with_state(test_state(Arc::new(UnavailableQueue)));

    let value = signed_value(b"pay carol 2");
    let (status, body) = post_send(app, json!({ "value": value })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Failed to add job to the queue");
}

#[tokio::test]
async fn health_and_readiness_respond() {
    let queue = in_memory_queue(3).await;
    let app = build_router().with_state(test_state(queue));

    for uri in ["/health", "/ready", "/metrics"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }
}

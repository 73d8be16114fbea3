//! REST endpoints for the zkc sequencer.

use axum::routing::{get, post};
use axum::Router;

use crate::api::handlers::{get_job, send_transaction};
use crate::server::AppState;

/// Build the ingress router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/send", post(send_transaction))
        .route("/job/:id", get(get_job))
}

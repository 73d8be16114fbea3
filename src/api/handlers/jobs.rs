//! Job status handler.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::types::JobStatusResponse;
use crate::domain::JobId;
use crate::server::AppState;

/// GET /job/{id} - observe a job's delivery state.
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Json<JobStatusResponse>, (StatusCode, String)> {
    match state.queue.get(id).await {
        Ok(Some(job)) => Ok(Json(job.into())),
        Ok(None) => Err((StatusCode::NOT_FOUND, format!("Job {id} not found"))),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

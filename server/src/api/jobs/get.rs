use crate::api::ErrorResponse;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JobResponse {
    /// The job ID
    pub id: Uuid,
    /// Recipe this job belongs to
    pub recipe_id: Uuid,
    /// Job type (currently always "ocr")
    pub job_type: String,
    /// Current job status (queued, processing, completed, failed)
    pub status: String,
    /// Failure reason, prefixed with the stage that broke
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    tag = "jobs",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job status", body = JobResponse),
        (status = 404, description = "Job not found", body = ErrorResponse)
    )
)]
pub async fn get_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let job = match state.store.get_job(id) {
        Ok(Some(j)) => j,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Job not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to get job {}: {}", id, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to get job".to_string(),
                }),
            )
                .into_response();
        }
    };

    (
        StatusCode::OK,
        Json(JobResponse {
            id: job.id,
            recipe_id: job.recipe_id,
            job_type: job.job_type.as_str().to_string(),
            status: job.status.as_str().to_string(),
            error: job.error,
            created_at: job.created_at,
            completed_at: job.completed_at,
        }),
    )
        .into_response()
}

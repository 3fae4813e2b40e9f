use crate::api::ErrorResponse;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use sifted_core::IngestError;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngestRequest {
    /// Opaque reference to the uploaded document
    pub document_ref: String,
    /// Owning user (authentication happens upstream of this service)
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngestResponse {
    /// The recipe created by this ingestion
    pub recipe_id: Uuid,
    /// The ingestion job, for status lookups
    pub job_id: Uuid,
}

#[utoipa::path(
    post,
    path = "/api/recipes/ingest",
    tag = "recipes",
    request_body = IngestRequest,
    responses(
        (status = 200, description = "Document ingested and parsed", body = IngestResponse),
        (status = 422, description = "Extraction or parsing failed", body = ErrorResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn ingest_recipe(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> impl IntoResponse {
    match state
        .pipeline
        .ingest(request.user_id, &request.document_ref)
        .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(IngestResponse {
                recipe_id: outcome.recipe_id,
                job_id: outcome.job_id,
            }),
        )
            .into_response(),
        Err(e @ (IngestError::Extraction { .. } | IngestError::Parse { .. })) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Ingestion failed on store access: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to ingest document".to_string(),
                }),
            )
                .into_response()
        }
    }
}

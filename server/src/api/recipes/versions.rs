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

/// Version summary for listing version history
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VersionSummary {
    pub id: Uuid,
    /// Version kind: raw, parsed, or converted
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

/// Response for version list endpoint
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VersionListResponse {
    pub versions: Vec<VersionSummary>,
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/versions",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Version history, newest first", body = VersionListResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn list_versions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    // Verify the recipe exists before listing
    match state.store.get_recipe(id) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Recipe not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch recipe {}: {}", id, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipe".to_string(),
                }),
            )
                .into_response();
        }
    }

    let versions = match state.store.list_versions(id) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Failed to fetch versions for recipe {}: {}", id, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch versions".to_string(),
                }),
            )
                .into_response();
        }
    };

    let summaries: Vec<VersionSummary> = versions
        .into_iter()
        .map(|v| VersionSummary {
            id: v.id,
            kind: v.kind.as_str().to_string(),
            created_at: v.created_at,
        })
        .collect();

    (
        StatusCode::OK,
        Json(VersionListResponse {
            versions: summaries,
        }),
    )
        .into_response()
}

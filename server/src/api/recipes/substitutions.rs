use crate::api::recipes::convert::SubstitutionView;
use crate::api::ErrorResponse;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Response for the substitution audit list
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubstitutionListResponse {
    pub substitutions: Vec<SubstitutionView>,
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/substitutions",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Substitutions applied to this recipe", body = SubstitutionListResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn list_substitutions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
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

    match state.store.list_substitutions(id) {
        Ok(records) => (
            StatusCode::OK,
            Json(SubstitutionListResponse {
                substitutions: records.into_iter().map(SubstitutionView::from).collect(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch substitutions for recipe {}: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch substitutions".to_string(),
                }),
            )
                .into_response()
        }
    }
}

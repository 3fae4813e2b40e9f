use crate::api::ErrorResponse;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use sifted_core::{ConvertError, SubstitutionRecord};
use utoipa::ToSchema;
use uuid::Uuid;

/// One applied substitution, as shown to the client
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubstitutionView {
    pub ingredient_name: String,
    pub suggested_product: String,
    pub brand: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_url: Option<String>,
    pub rationale: String,
}

impl From<SubstitutionRecord> for SubstitutionView {
    fn from(record: SubstitutionRecord) -> Self {
        Self {
            ingredient_name: record.ingredient_name,
            suggested_product: record.suggested_product,
            brand: record.brand,
            product_url: record.product_url,
            rationale: record.rationale,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConvertResponse {
    /// Id of the newly appended converted version
    pub version_id: Uuid,
    pub substitutions: Vec<SubstitutionView>,
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/convert",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Gluten-free version created", body = ConvertResponse),
        (status = 404, description = "No parsed version for this recipe", body = ErrorResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn convert_recipe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.pipeline.convert_recipe(id) {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ConvertResponse {
                version_id: outcome.version.id,
                substitutions: outcome
                    .substitutions
                    .into_iter()
                    .map(SubstitutionView::from)
                    .collect(),
            }),
        )
            .into_response(),
        Err(ConvertError::NoParsedVersion(_)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No parsed version found".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Conversion failed for recipe {}: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to convert recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}

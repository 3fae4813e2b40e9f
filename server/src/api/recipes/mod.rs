pub mod convert;
pub mod ingest;
pub mod substitutions;
pub mod versions;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ingest", post(ingest::ingest_recipe))
        .route("/{id}/convert", post(convert::convert_recipe))
        .route("/{id}/versions", get(versions::list_versions))
        .route("/{id}/substitutions", get(substitutions::list_substitutions))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        ingest::ingest_recipe,
        convert::convert_recipe,
        versions::list_versions,
        substitutions::list_substitutions,
    ),
    components(schemas(
        ingest::IngestRequest,
        ingest::IngestResponse,
        convert::ConvertResponse,
        convert::SubstitutionView,
        versions::VersionListResponse,
        versions::VersionSummary,
        substitutions::SubstitutionListResponse,
    ))
)]
pub struct ApiDoc;

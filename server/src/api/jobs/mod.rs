pub mod get;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/jobs endpoints (mounted at /api/jobs)
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", get(get::get_job))
}

#[derive(OpenApi)]
#[openapi(paths(get::get_job), components(schemas(get::JobResponse)))]
pub struct ApiDoc;

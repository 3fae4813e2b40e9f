mod api;

use std::env;
use std::sync::Arc;

use axum::extract::MatchedPath;
use axum::http::Request;
use axum::Router;
use sifted_core::{
    canadian_catalog, create_adapter_from_env, MemoryStore, Pipeline, RecipeStore, RuleCatalog,
};
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across all handlers
pub struct AppContext {
    pub pipeline: Pipeline,
    pub store: Arc<dyn RecipeStore>,
}

pub type AppState = Arc<AppContext>;

fn init_telemetry() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Load the substitution rule catalog once at startup. The catalog is
/// immutable for the lifetime of the process; SUBSTITUTION_RULES_PATH points
/// at a JSON file to override the built-in Canadian catalog.
fn load_catalog() -> RuleCatalog {
    match env::var("SUBSTITUTION_RULES_PATH") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("Failed to read {}: {}", path, e));
            let catalog = RuleCatalog::from_json(&json)
                .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path, e));
            tracing::info!(path = %path, rules = catalog.rules().len(), "loaded rule catalog");
            catalog
        }
        Err(_) => canadian_catalog(),
    }
}

#[tokio::main]
async fn main() {
    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        let spec = api::openapi().to_pretty_json().unwrap();
        println!("{}", spec);
        return;
    }

    init_telemetry();

    let store: Arc<dyn RecipeStore> = Arc::new(MemoryStore::new());
    let extractor = create_adapter_from_env().expect("Failed to configure extraction adapter");
    tracing::info!(adapter = extractor.adapter_name(), "extraction adapter ready");

    let state: AppState = Arc::new(AppContext {
        pipeline: Pipeline::new(store.clone(), Arc::from(extractor), load_catalog()),
        store,
    });

    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi());

    let app = Router::new()
        .nest("/api/recipes", api::recipes::router())
        .nest("/api/jobs", api::jobs::router())
        .merge(swagger_ui)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %matched_path,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &Span| {
                        let status = response.status().as_u16();
                        if status >= 500 {
                            tracing::error!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request failed with server error"
                            );
                        } else {
                            tracing::info!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request completed"
                            );
                        }
                    },
                ),
        );

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());
    tracing::info!("Swagger UI available at http://localhost:3000/swagger-ui/");

    axum::serve(listener, app).await.unwrap();
}

use axum::Router;
use std::path::Path;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::features::{health, ocr};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        ocr::handlers::process_image,
        health::handlers::health,
    ),
    components(
        schemas(
            ocr::dto::ProcessResponse,
            ocr::dto::UploadForm,
            health::handlers::HealthResponse,
            extractor::ExtractionResult,
            extractor::ExtractedNumber,
        )
    ),
    tags(
        (name = "ocr", description = "Image upload and text extraction"),
        (name = "health", description = "Liveness check"),
    )
)]
pub struct ApiDoc;

/// Builds the application router. Static files are served from `static_dir`
/// for every path the API does not handle.
pub fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .merge(ocr::routes::routes())
        .merge(health::routes::routes());

    let mut router = Router::new()
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

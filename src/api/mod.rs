//! REST API module using Axum
//!
//! Exposes the projection engine to the dashboard front end:
//! - stateless what-if projections under `/api/v2/scenario/*`
//! - per-user scenario sessions under `/api/v2/sessions`
//! - baseline, driver ranges, margin waterfall and insight lookup

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::DashboardState;

use axum::http::{header, Method, Uri};
use axum::response::Response;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use envelope::ApiErrorResponse;

/// Environment variable listing allowed cross-origin callers.
pub const CORS_ENV_VAR: &str = "MARGIN_DEFENSE_CORS_ORIGINS";

async fn not_found(uri: Uri) -> Response {
    ApiErrorResponse::not_found(format!("No route for {}", uri.path()))
}

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `MARGIN_DEFENSE_CORS_ORIGINS` to a comma-separated list of allowed
/// origins for development (e.g. `http://localhost:5173`).
fn build_cors_layer() -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match std::env::var(CORS_ENV_VAR) {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            base.allow_origin(allowed)
        }
        Err(_) => base,
    }
}

/// Create the complete application router.
pub fn create_app(state: DashboardState) -> Router {
    Router::new()
        .nest("/api/v2", routes::api_routes(state))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(build_cors_layer())
}

//! REST API module using Axum
//!
//! Hosts the application-facing surface of the sensor link: the
//! `/api/sensor/*` routes the training web application consumes, plus a
//! root-level `/health` liveness endpoint.

pub mod handlers;
mod routes;

pub use handlers::SensorApiState;

use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `REHALINK_CORS_ORIGINS` to a comma-separated list of allowed origins
/// for development (e.g., the training app's dev server).
fn build_cors_layer() -> CorsLayer {
    match std::env::var("REHALINK_CORS_ORIGINS") {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE])
        }
        Err(_) => CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
    }
}

/// Create the complete application router.
pub fn create_app(state: SensorApiState) -> Router {
    Router::new()
        .nest("/api/sensor", routes::sensor_routes(state.clone()))
        .merge(routes::health_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

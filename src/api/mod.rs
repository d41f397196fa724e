//! HTTP transport for the voice command service.

pub mod error;
pub mod state;
pub mod voice_routes;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use error::ApiError;
pub use state::AppState;

/// Upper bound on an uploaded audio clip.
pub const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

/// Build the router with CORS for `cors_origins` and request tracing.
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/api/health", get(voice_routes::health))
        .route(
            "/api/speech",
            post(voice_routes::speech).layer(DefaultBodyLimit::max(MAX_AUDIO_BYTES)),
        )
        .route("/api/interpret", post(voice_routes::interpret))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

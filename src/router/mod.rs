use axum::{routing::get, Json, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

pub mod animals;

async fn healthz() -> Json<String> {
    Json("healthy".to_string())
}

/// Main router for the application, with the animal feed and health endpoints attached
pub fn app_router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/dogs", get(animals::get_animals))
        //
        // The feed is public, any origin may read it
        //
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .layer(TraceLayer::new_for_http())
}

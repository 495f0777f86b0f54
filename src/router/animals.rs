use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::{error::FetchError, state::AppState};

/// Serves the animal feed. Downstream caches may hold a successful answer for one cache window.
#[axum::debug_handler]
pub async fn get_animals(State(AppState { feed }): State<AppState>) -> Result<Response, FetchError> {
    let animals = feed.get().await?;
    let cache_control = format!("public, max-age={}", feed.ttl().as_secs());

    Ok(([(header::CACHE_CONTROL, cache_control)], Json(animals)).into_response())
}

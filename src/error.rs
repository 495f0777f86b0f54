use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api_types::ErrorBody;

/// Reasons the animal feed could not be served. None of them are retried by the feed itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Facebook credentials not configured. Set FACEBOOK_ALBUM_ID and FACEBOOK_ACCESS_TOKEN in the environment.")]
    Configuration,

    /// The album API answered with an error payload, e.g. an expired token or unknown album.
    #[error("Facebook API error: {0}")]
    UpstreamRejected(String),

    /// The album API could not be reached, or its answer could not be read.
    #[error("Failed to fetch from Facebook: {0}")]
    Network(String),
}

impl FetchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FetchError::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            FetchError::UpstreamRejected(_) | FetchError::Network(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

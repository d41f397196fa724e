//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::clients::TranscriberError;

/// Errors returned by the voice routes. Every one renders as
/// `{"error": "<message>"}`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A required upstream service is not configured
    #[error("{0}")]
    Unavailable(String),

    #[error(transparent)]
    Transcription(#[from] TranscriberError),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Transcription(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

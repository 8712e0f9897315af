//! Error types for the API layer.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use postboard_store::StoreError;

/// Errors that can occur while handling an API request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A post id could not be parsed from the request path.
    #[error("invalid post id: {0}")]
    InvalidId(String),

    /// The request body was missing or not valid JSON for the endpoint.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// The query string could not be decoded for the endpoint.
    #[error("invalid query string: {0}")]
    InvalidQuery(String),
}

impl ApiError {
    /// HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::Validation(_))
            | Self::InvalidId(_)
            | Self::InvalidBody(_)
            | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Store(StoreError::Validation(msg)) => msg.clone(),
            Self::Store(StoreError::NotFound(id)) => format!("Post with id {id} not found."),
            Self::Store(e) => {
                tracing::error!(error = %e, "Store failure while handling request");
                String::from("internal storage error")
            }
            Self::InvalidId(_) | Self::InvalidBody(_) | Self::InvalidQuery(_) => self.to_string(),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

use crate::models::{RequestError, Response as Envelope, ACCESS_DENIED, ACT_OF_GOD};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lockbox_scopes::ScopeError;
use tracing::error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request could not be verified")]
    Unauthorized,

    #[error("Bad request: {0:?}")]
    BadRequest(Vec<RequestError>),

    #[error("Not found: {0:?}")]
    NotFound(RequestError),

    #[error("Storage error: {0}")]
    Store(#[from] ScopeError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, errors) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                vec![RequestError::header("Authorization", ACCESS_DENIED)],
            ),
            ApiError::BadRequest(errors) => (StatusCode::BAD_REQUEST, errors),
            ApiError::NotFound(error) => (StatusCode::NOT_FOUND, vec![error]),
            ApiError::Store(e) => {
                error!(error = %e, "scope storage failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    vec![RequestError::slug(ACT_OF_GOD)],
                )
            }
        };

        (status, Json(Envelope::errors(errors))).into_response()
    }
}

//! Error responses and the JSON body extractor.

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    response::{IntoResponse, Response},
    Json,
};
use flowguard_model::ErrorBody;

use crate::backend::BackendError;

/// A [`BackendError`] rendered as `{"error": msg}` with its status code.
#[derive(Debug)]
pub struct ApiError(pub BackendError);

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(%rejection, "Rejected request body");
        Self(BackendError::missing_fields())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self.0, "Request failed");
        }
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// `Json` whose rejections read "Missing fields!" like every other 400.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

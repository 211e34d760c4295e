//! HTTP mapping of [`Error`].
//!
//! Every failure leaves the API as `{"success": false, "reason": ..., "message": ...}`. Fatal
//! errors are logged in full and reported with a generic message.

use crate::errors::{Error, ErrorKind};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// Handler result.
pub type ApiResult<T> = std::result::Result<T, Error>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    reason: &'static str,
    message: String,
}

/// Status code for an error class.
#[must_use]
pub const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Validation | ErrorKind::BusinessRule => StatusCode::BAD_REQUEST,
        ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
        ErrorKind::Fatal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let message = if kind == ErrorKind::Fatal {
            error!("Request failed: {}", self);
            "Something went wrong, please try again later".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            success: false,
            reason: self.reason_code(),
            message,
        };
        (status_for(kind), Json(body)).into_response()
    }
}

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::AuthError;
use crate::api::ErrorResponse;

/// Converts `AuthError` into an HTTP response carrying only the public message.
#[derive(Debug)]
pub struct AppError(pub AuthError);

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AuthError::InvalidCredentials
            | AuthError::TooManyAttempts
            | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::CsrfRejected => StatusCode::FORBIDDEN,
            AuthError::Validation(_) | AuthError::InvalidAddress => StatusCode::BAD_REQUEST,
            AuthError::AdminAlreadyExists => StatusCode::CONFLICT,
            AuthError::DatabaseError(_)
            | AuthError::ConfigurationError(_)
            | AuthError::PasswordHashError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!(target: "vitrine_auth", "msg=\"request failed\" error=\"{}\"", self.0);
        }
        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}

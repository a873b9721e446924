use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use drivebridge_db::StoreError;
use drivebridge_services::{DriveError, auth::AuthError};
use serde::Serialize;
use tracing::error;

use crate::render::escape_html;

#[derive(Debug)]
pub enum ApiError {
    Drive(DriveError),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    InvalidNonce,
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    code: &'static str,
    message: String,
}

fn drive_status(err: &DriveError) -> StatusCode {
    match err {
        DriveError::MissingCredentials => StatusCode::BAD_REQUEST,
        DriveError::TokenExchangeFailed(_) => StatusCode::BAD_REQUEST,
        DriveError::NoAccessToken => StatusCode::UNAUTHORIZED,
        DriveError::FileNotFound(_) => StatusCode::NOT_FOUND,
        DriveError::DriveApi(_) => StatusCode::BAD_GATEWAY,
    }
}

impl ApiError {
    /// Status, code and message as rendered. Messages can carry request or
    /// provider text, so they are HTML-escaped here.
    fn parts(self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Drive(err) => (
                drive_status(&err),
                err.code(),
                escape_html(&err.to_string()),
            ),
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", escape_html(&msg))
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "rest_forbidden", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "rest_forbidden", msg),
            ApiError::InvalidNonce => (
                StatusCode::FORBIDDEN,
                "rest_cookie_invalid_nonce",
                "Cookie check failed".to_string(),
            ),
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = ErrorResponse {
            success: false,
            code,
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DriveError> for ApiError {
    fn from(err: DriveError) -> Self {
        ApiError::Drive(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired => ApiError::Unauthorized("Token expired".to_string()),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

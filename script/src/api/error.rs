use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::models::ErrorBody;
use crate::prover::ProverError;

/// Central error type for the prover API
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<ProverError> for AppError {
    fn from(err: ProverError) -> Self {
        match err {
            ProverError::InvalidProofId(_) | ProverError::Rejected(_) => {
                AppError::BadRequest(err.to_string())
            }
            ProverError::UnknownProof(_) => AppError::NotFound(err.to_string()),
            ProverError::Timeout(_) => AppError::Timeout(err.to_string()),
            ProverError::Backend(e) => AppError::InternalError(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED"),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            AppError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg, "TIMEOUT"),
            AppError::InternalError(e) => {
                tracing::error!(error = ?e, "prover failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_ERROR",
                )
            }
        };

        let body = Json(ErrorBody {
            error: code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

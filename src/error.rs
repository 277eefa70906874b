//! # Centralized Error Handling
//!
//! This module provides a unified error handling system for the application.
//! It centralizes error logging and HTTP response generation, eliminating
//! repetitive error handling patterns throughout the codebase.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::store::StoreError;

/// Central application error type that encompasses all possible error conditions.
///
/// This enum provides a unified way to handle errors across the application,
/// with automatic conversion to appropriate HTTP responses. _Store errors are logged
/// automatically, while other errors should be logged at the point of creation if needed._
#[derive(Error, Debug)]
pub enum AppError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid payload: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("malformed body: {0}")]
    Body(#[from] JsonRejection),

    #[error("malformed path: {0}")]
    Path(#[from] PathRejection),

    #[error("malformed query: {0}")]
    Query(#[from] QueryRejection),

    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("bad request: {0}")]
    BadRequest(&'static str),

    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::Store(StoreError::Duplicate(what)) => {
                (StatusCode::CONFLICT, format!("{what} already exists"))
            }
            AppError::Store(e) => {
                // Log detailed store errors for internal tracking
                error!(error = %e, "Store error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Validation(e) => {
                warn!(error = %e, "Rejected invalid payload");
                (StatusCode::UNPROCESSABLE_ENTITY, format!("Invalid payload: {e}"))
            }
            AppError::Body(e) => {
                warn!(error = %e, "Rejected request body");
                (e.status(), e.body_text())
            }
            AppError::Path(e) => {
                warn!(error = %e, "Rejected path parameters");
                (e.status(), e.body_text())
            }
            AppError::Query(e) => {
                warn!(error = %e, "Rejected query string");
                (e.status(), e.body_text())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.to_string()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.to_string()),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}

/// Convenience Result type alias that uses AppError as the error type.
pub type AppResult<T> = Result<T, AppError>;

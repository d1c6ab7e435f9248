use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// Store query failed before any mutation was attempted. Safe to retry
    /// the whole operation from scratch.
    #[error("Lookup error: {0}")]
    LookupError(String),

    /// Store write failed after a successful lookup. The caller must not
    /// assume the operation succeeded; re-querying is the only safe way to
    /// determine final state.
    #[error("Mutation error: {0}")]
    MutationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    msg.as_str(),
                )
            }
            AppError::NotFound(msg) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.as_str(),
            ),
            AppError::LookupError(msg) => {
                log::error!("Lookup error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_GATEWAY,
                    "LOOKUP_ERROR",
                    msg.as_str(),
                )
            }
            AppError::MutationError(msg) => {
                log::error!("Mutation error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_GATEWAY,
                    "MUTATION_ERROR",
                    msg.as_str(),
                )
            }
            AppError::ConfigError(msg) => {
                log::error!("Config error: {msg}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIG_ERROR",
                    msg.as_str(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error",
                )
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}

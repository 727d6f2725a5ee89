use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failure of a single call to one of the external sources
///
/// Both variants are recoverable: the orchestrator spends one attempt and
/// moves on. A catalog miss is not an error and never shows up here.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// Network failure, timeout, or a non-success status from the remote
    #[error("Transient source error: {0}")]
    Transient(String),

    /// The remote answered, but not in the shape we asked for
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SourceError::Malformed(e.to_string())
        } else {
            SourceError::Transient(e.to_string())
        }
    }
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Missing preferences: {0}")]
    MissingPreferences(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Recommendation generation failed after {attempts} attempts")]
    GenerationFailed {
        attempts: u32,
        last_error: Option<SourceError>,
    },

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::MissingPreferences(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::GenerationFailed {
                attempts,
                ref last_error,
            } => {
                tracing::warn!(
                    attempts = attempts,
                    last_error = ?last_error,
                    "Returning generation failure to client"
                );
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Couldn't find anything new right now, try again shortly".to_string(),
                )
            }
            AppError::Cache(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

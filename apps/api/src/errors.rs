use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ats::matcher::AtsError;
use crate::auth::AuthError;
use crate::db::StoreError;
use crate::llm_client::LlmError;
use crate::resume::validation::ValidationError;
use crate::roadmap::extract::ExtractError;
use crate::roadmap::validation::DraftError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Cannot compute: {0}")]
    CannotCompute(String),

    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Invalid model output: {0}")]
    InvalidModelOutput(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// `Json` extractor whose rejections (bad syntax, wrong field types, missing content type)
/// come back as 400 with the standard error body.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::CannotCompute(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Upstream(_) | AppError::InvalidModelOutput(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match &self {
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::Unauthorized(msg) => ("UNAUTHORIZED", msg.clone()),
            AppError::Forbidden(msg) => ("FORBIDDEN", msg.clone()),
            AppError::Conflict(msg) => ("CONFLICT", msg.clone()),
            AppError::CannotCompute(msg) => ("CANNOT_COMPUTE", msg.clone()),
            AppError::UpstreamTimeout(msg) => {
                tracing::error!("Upstream timeout: {msg}");
                (
                    "UPSTREAM_TIMEOUT",
                    "The upstream service did not respond in time".to_string(),
                )
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (
                    "UPSTREAM_ERROR",
                    "The AI service request failed".to_string(),
                )
            }
            AppError::InvalidModelOutput(msg) => {
                tracing::error!("Invalid model output: {msg}");
                ("INVALID_MODEL_OUTPUT", msg.clone())
            }
            AppError::Database(msg) => {
                tracing::error!("Database error: {msg}");
                (
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => AppError::NotFound(e.to_string()),
            StoreError::Conflict(_) => AppError::Conflict(e.to_string()),
            StoreError::MissingReference(_) => AppError::Validation(e.to_string()),
            StoreError::Timeout => AppError::UpstreamTimeout(e.to_string()),
            StoreError::Serialization(_) | StoreError::Database(_) => {
                AppError::Database(e.to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        tracing::debug!("Rejected submission at field '{}'", e.field);
        AppError::Validation(e.message)
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Timeout => AppError::UpstreamTimeout(e.to_string()),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl From<ExtractError> for AppError {
    fn from(e: ExtractError) -> Self {
        AppError::InvalidModelOutput(e.to_string())
    }
}

impl From<DraftError> for AppError {
    fn from(e: DraftError) -> Self {
        AppError::InvalidModelOutput(e.to_string())
    }
}

impl From<AtsError> for AppError {
    fn from(e: AtsError) -> Self {
        AppError::CannotCompute(e.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingToken | AuthError::InvalidCredentials => {
                AppError::Unauthorized(e.to_string())
            }
            AuthError::InvalidToken(_) => AppError::Forbidden(e.to_string()),
            AuthError::Hash(_) | AuthError::Encode(_) => {
                AppError::Internal(anyhow::Error::new(e))
            }
        }
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("No version selected")]
    NoVersionSelected,

    /// Completeness check failed; `invalid_ids` lists the offending nodes
    #[error("{message}")]
    ValidationFailed {
        message: String,
        names: Vec<String>,
        invalid_ids: Vec<String>,
    },

    #[error("Category \"{0}\" already exists in this level")]
    DuplicateSiblingName(String),

    #[error("Remote store error: {0}")]
    RemoteFailure(String),

    #[error("Modifications are not allowed while inspecting archived workspace {0}")]
    ArchivedWorkspaceReadOnly(String),

    #[error("Not in edit mode")]
    NotEditing,

    #[error("A synchronization is already in progress for this version")]
    SyncInProgress,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::NoVersionSelected => (
                StatusCode::BAD_REQUEST,
                "No version selected to save to.".to_string(),
                None,
            ),
            AppError::ValidationFailed {
                ref message,
                ref names,
                ref invalid_ids,
            } => {
                tracing::debug!("Incomplete categories: {}", names.join(", "));
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    message.clone(),
                    Some(invalid_ids.clone()),
                )
            }
            AppError::DuplicateSiblingName(_) => (StatusCode::CONFLICT, self.to_string(), None),
            AppError::RemoteFailure(ref msg) => {
                tracing::error!("Remote store error: {}", msg);
                (StatusCode::BAD_GATEWAY, self.to_string(), None)
            }
            AppError::ArchivedWorkspaceReadOnly(_) => {
                (StatusCode::FORBIDDEN, self.to_string(), None)
            }
            AppError::NotEditing | AppError::SyncInProgress => {
                (StatusCode::CONFLICT, self.to_string(), None)
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Validation(ref msg) => (
                StatusCode::BAD_REQUEST,
                msg.clone(),
                Some(vec![msg.clone()]),
            ),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, msg.clone(), None),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ApiResponse::<()>::error(Some(message), errors));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

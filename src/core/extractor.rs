use axum::{
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};

use crate::core::error::AppError;
use crate::features::categories::models::{CategoryType, WorkspaceContext};

/// JSON body extractor whose rejections use the API error envelope
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(AppJsonRejection)
    }
}

pub struct AppJsonRejection(JsonRejection);

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        let message = match self.0 {
            JsonRejection::JsonDataError(err) => format!("Invalid request body: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("Malformed JSON: {}", err),
            JsonRejection::MissingJsonContentType(_) => {
                "Expected a request with Content-Type: application/json".to_string()
            }
            other => other.body_text(),
        };

        AppError::BadRequest(message).into_response()
    }
}

#[derive(Deserialize)]
struct WorkspaceParams {
    workspace_id: String,
    category_type: CategoryType,
}

/// Session key taken from the `{workspace_id}/{category_type}` path segments.
/// Other path parameters are left for a second `Path` extractor.
pub struct WorkspacePath(pub WorkspaceContext);

impl<S> FromRequestParts<S> for WorkspacePath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<WorkspaceParams>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        if params.workspace_id.trim().is_empty() {
            return Err(AppError::BadRequest("Workspace ID is required".to_string()));
        }

        Ok(Self(WorkspaceContext::new(
            params.workspace_id,
            params.category_type,
        )))
    }
}

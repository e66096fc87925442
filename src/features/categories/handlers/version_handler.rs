use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, WorkspacePath};
use crate::features::categories::dtos::{CreateVersionDto, SessionStateDto, UpdateVersionDto};
use crate::features::categories::models::{CategoryType, CategoryVersion};
use crate::features::categories::services::CategoryService;
use crate::shared::types::{ApiResponse, Meta};

#[derive(Deserialize)]
pub struct VersionParams {
    version_id: String,
}

/// List versions of a category type
///
/// Reloads the list from the store. The selection is kept unless it no longer
/// exists, in which case the active version is selected.
#[utoipa::path(
    get,
    path = "/api/workspaces/{workspace_id}/{category_type}/versions",
    params(
        ("workspace_id" = String, Path, description = "Workspace ID"),
        ("category_type" = CategoryType, Path, description = "expense or income")
    ),
    responses(
        (status = 200, description = "Versions loaded", body = ApiResponse<Vec<CategoryVersion>>),
        (status = 502, description = "Category store unavailable")
    ),
    tag = "versions"
)]
pub async fn list_versions(
    State(service): State<Arc<CategoryService>>,
    WorkspacePath(ctx): WorkspacePath,
) -> Result<Json<ApiResponse<Vec<CategoryVersion>>>> {
    let session = service.session(&ctx).await;
    let versions = session.coordinator().fetch_versions(&ctx).await?;

    let total = versions.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(versions),
        None,
        Some(Meta { total }),
    )))
}

/// Create a version
///
/// The version starts inactive with an empty tree.
#[utoipa::path(
    post,
    path = "/api/workspaces/{workspace_id}/{category_type}/versions",
    params(
        ("workspace_id" = String, Path, description = "Workspace ID"),
        ("category_type" = CategoryType, Path, description = "expense or income")
    ),
    request_body = CreateVersionDto,
    responses(
        (status = 201, description = "Version created", body = ApiResponse<CategoryVersion>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Workspace is being inspected"),
        (status = 502, description = "Category store rejected the request")
    ),
    tag = "versions"
)]
pub async fn create_version(
    State(service): State<Arc<CategoryService>>,
    WorkspacePath(ctx): WorkspacePath,
    AppJson(dto): AppJson<CreateVersionDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryVersion>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let session = service.session(&ctx).await;
    let version = session.lifecycle().create_version(&ctx, &dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(version),
            Some("Version created".to_string()),
            None,
        )),
    ))
}

/// Rename a version or change its description
#[utoipa::path(
    patch,
    path = "/api/workspaces/{workspace_id}/{category_type}/versions/{version_id}",
    params(
        ("workspace_id" = String, Path, description = "Workspace ID"),
        ("category_type" = CategoryType, Path, description = "expense or income"),
        ("version_id" = String, Path, description = "Version ID")
    ),
    request_body = UpdateVersionDto,
    responses(
        (status = 200, description = "Version updated", body = ApiResponse<CategoryVersion>),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Category store rejected the request")
    ),
    tag = "versions"
)]
pub async fn update_version(
    State(service): State<Arc<CategoryService>>,
    WorkspacePath(ctx): WorkspacePath,
    Path(VersionParams { version_id }): Path<VersionParams>,
    AppJson(dto): AppJson<UpdateVersionDto>,
) -> Result<Json<ApiResponse<CategoryVersion>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let session = service.session(&ctx).await;
    let version = session
        .lifecycle()
        .update_version(&ctx, &version_id, &dto)
        .await?;

    Ok(Json(ApiResponse::success(Some(version), None, None)))
}

/// Activate a version
///
/// The store deactivates the previously active version.
#[utoipa::path(
    post,
    path = "/api/workspaces/{workspace_id}/{category_type}/versions/{version_id}/activate",
    params(
        ("workspace_id" = String, Path, description = "Workspace ID"),
        ("category_type" = CategoryType, Path, description = "expense or income"),
        ("version_id" = String, Path, description = "Version ID")
    ),
    responses(
        (status = 200, description = "Version activated", body = ApiResponse<SessionStateDto>),
        (status = 502, description = "Category store rejected the request")
    ),
    tag = "versions"
)]
pub async fn activate_version(
    State(service): State<Arc<CategoryService>>,
    WorkspacePath(ctx): WorkspacePath,
    Path(VersionParams { version_id }): Path<VersionParams>,
) -> Result<Json<ApiResponse<SessionStateDto>>> {
    let session = service.session(&ctx).await;
    session.lifecycle().activate_version(&ctx, &version_id).await?;

    let state = session.coordinator().snapshot().await;
    Ok(Json(ApiResponse::success(
        Some(state),
        Some("Version activated".to_string()),
        None,
    )))
}

/// Select the version to view and edit
///
/// Discards any open draft and loads the version's categories.
#[utoipa::path(
    post,
    path = "/api/workspaces/{workspace_id}/{category_type}/versions/{version_id}/select",
    params(
        ("workspace_id" = String, Path, description = "Workspace ID"),
        ("category_type" = CategoryType, Path, description = "expense or income"),
        ("version_id" = String, Path, description = "Version ID")
    ),
    responses(
        (status = 200, description = "Version selected", body = ApiResponse<SessionStateDto>),
        (status = 404, description = "Version not found"),
        (status = 502, description = "Category store unavailable")
    ),
    tag = "versions"
)]
pub async fn select_version(
    State(service): State<Arc<CategoryService>>,
    WorkspacePath(ctx): WorkspacePath,
    Path(VersionParams { version_id }): Path<VersionParams>,
) -> Result<Json<ApiResponse<SessionStateDto>>> {
    let session = service.session(&ctx).await;
    let coordinator = session.coordinator();

    coordinator.fetch_versions(&ctx).await?;
    coordinator.select_version(Some(&version_id)).await?;
    coordinator.fetch_categories(&ctx, Some(&version_id)).await?;

    Ok(Json(ApiResponse::success(
        Some(coordinator.snapshot().await),
        None,
        None,
    )))
}

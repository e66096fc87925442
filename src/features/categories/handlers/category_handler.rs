use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, WorkspacePath};
use crate::features::categories::dtos::{
    AddCategoryDto, CategoryDto, CategoryRefQuery, CategoryTreeDto, LayoutNodeDto,
    ListCategoriesQuery, SessionStateDto, UpdateCategoryDto,
};
use crate::features::categories::models::{CategoryRef, CategoryType};
use crate::features::categories::services::{CategoryPatch, CategoryService, NewCategory};
use crate::shared::types::{ApiResponse, Meta};

fn patch_from_dto(dto: UpdateCategoryDto) -> Result<(CategoryRef, CategoryPatch)> {
    let key = CategoryRef::from_parts(dto.id, dto.temp_id)?;
    let parent = match dto.parent {
        Some(parent) => Some(CategoryRef::parent_from_parts(parent.id, parent.temp_id)?),
        None => None,
    };

    let patch = CategoryPatch {
        name: dto.name,
        // An empty description clears it
        description: dto.description.map(|d| Some(d).filter(|d| !d.trim().is_empty())),
        level: None,
        is_active: dto.is_active,
        parent,
    };
    Ok((key, patch))
}

/// Get the session state
///
/// Versions, selection, draft categories and edit-mode flags of a workspace
/// and category type.
#[utoipa::path(
    get,
    path = "/api/workspaces/{workspace_id}/{category_type}/state",
    params(
        ("workspace_id" = String, Path, description = "Workspace ID"),
        ("category_type" = CategoryType, Path, description = "expense or income")
    ),
    responses(
        (status = 200, description = "Session state", body = ApiResponse<SessionStateDto>)
    ),
    tag = "categories"
)]
pub async fn get_state(
    State(service): State<Arc<CategoryService>>,
    WorkspacePath(ctx): WorkspacePath,
) -> Result<Json<ApiResponse<SessionStateDto>>> {
    let session = service.session(&ctx).await;
    let state = session.coordinator().snapshot().await;
    Ok(Json(ApiResponse::success(Some(state), None, None)))
}

/// Load categories
///
/// Replaces the draft with the store's flat list for `version`, else the
/// selected version, else the active version. Levels are in display numbering.
#[utoipa::path(
    get,
    path = "/api/workspaces/{workspace_id}/{category_type}/categories",
    params(
        ("workspace_id" = String, Path, description = "Workspace ID"),
        ("category_type" = CategoryType, Path, description = "expense or income"),
        ListCategoriesQuery
    ),
    responses(
        (status = 200, description = "Categories loaded", body = ApiResponse<Vec<CategoryDto>>),
        (status = 502, description = "Category store unavailable")
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
    WorkspacePath(ctx): WorkspacePath,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryDto>>>> {
    let session = service.session(&ctx).await;
    let coordinator = session.coordinator();

    coordinator
        .fetch_categories(&ctx, query.version.as_deref())
        .await?;

    let categories: Vec<CategoryDto> = coordinator
        .categories()
        .await
        .iter()
        .map(CategoryDto::from)
        .collect();
    let total = categories.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(categories),
        None,
        Some(Meta { total }),
    )))
}

/// Get the draft as a tree
#[utoipa::path(
    get,
    path = "/api/workspaces/{workspace_id}/{category_type}/categories/tree",
    params(
        ("workspace_id" = String, Path, description = "Workspace ID"),
        ("category_type" = CategoryType, Path, description = "expense or income")
    ),
    responses(
        (status = 200, description = "Category forest", body = ApiResponse<Vec<CategoryTreeDto>>)
    ),
    tag = "categories"
)]
pub async fn get_tree(
    State(service): State<Arc<CategoryService>>,
    WorkspacePath(ctx): WorkspacePath,
) -> Result<Json<ApiResponse<Vec<CategoryTreeDto>>>> {
    let session = service.session(&ctx).await;
    let tree = session.coordinator().tree().await;
    Ok(Json(ApiResponse::success(Some(tree), None, None)))
}

/// Get the draft positioned for the graph view
#[utoipa::path(
    get,
    path = "/api/workspaces/{workspace_id}/{category_type}/categories/layout",
    params(
        ("workspace_id" = String, Path, description = "Workspace ID"),
        ("category_type" = CategoryType, Path, description = "expense or income")
    ),
    responses(
        (status = 200, description = "Positioned forest", body = ApiResponse<Vec<LayoutNodeDto>>)
    ),
    tag = "categories"
)]
pub async fn get_layout(
    State(service): State<Arc<CategoryService>>,
    WorkspacePath(ctx): WorkspacePath,
) -> Result<Json<ApiResponse<Vec<LayoutNodeDto>>>> {
    let session = service.session(&ctx).await;
    let layout = session.coordinator().layout().await;
    Ok(Json(ApiResponse::success(Some(layout), None, None)))
}

/// Add a category to the draft
///
/// The category gets a temporary id until the next save.
#[utoipa::path(
    post,
    path = "/api/workspaces/{workspace_id}/{category_type}/categories",
    params(
        ("workspace_id" = String, Path, description = "Workspace ID"),
        ("category_type" = CategoryType, Path, description = "expense or income")
    ),
    request_body = AddCategoryDto,
    responses(
        (status = 201, description = "Category added to the draft", body = ApiResponse<CategoryDto>),
        (status = 400, description = "Validation error or no version selected"),
        (status = 404, description = "Parent not found"),
        (status = 409, description = "Duplicate sibling name or not in edit mode")
    ),
    tag = "categories"
)]
pub async fn add_category(
    State(service): State<Arc<CategoryService>>,
    WorkspacePath(ctx): WorkspacePath,
    AppJson(dto): AppJson<AddCategoryDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let parent = CategoryRef::parent_from_parts(dto.parent_id, dto.parent_temp_id)?;
    let data = NewCategory {
        name: dto.name,
        description: dto.description,
        level: dto.level,
    };

    let session = service.session(&ctx).await;
    let category = session.coordinator().add_category(parent, data).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(CategoryDto::from(&category)),
            None,
            None,
        )),
    ))
}

/// Edit a draft category
///
/// Renames are checked against siblings; moves shift the whole subtree.
#[utoipa::path(
    patch,
    path = "/api/workspaces/{workspace_id}/{category_type}/categories",
    params(
        ("workspace_id" = String, Path, description = "Workspace ID"),
        ("category_type" = CategoryType, Path, description = "expense or income")
    ),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Draft updated", body = ApiResponse<SessionStateDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Duplicate sibling name or not in edit mode")
    ),
    tag = "categories"
)]
pub async fn update_category(
    State(service): State<Arc<CategoryService>>,
    WorkspacePath(ctx): WorkspacePath,
    AppJson(dto): AppJson<UpdateCategoryDto>,
) -> Result<Json<ApiResponse<SessionStateDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let (key, patch) = patch_from_dto(dto)?;

    let session = service.session(&ctx).await;
    let coordinator = session.coordinator();

    if !coordinator.update_category(&key, patch).await? {
        return Err(AppError::NotFound(format!("Category {} not found", key)));
    }

    Ok(Json(ApiResponse::success(
        Some(coordinator.snapshot().await),
        None,
        None,
    )))
}

/// Remove a category from the draft
///
/// Children are kept and become roots. Persisted categories are deleted from
/// the store on the next save.
#[utoipa::path(
    delete,
    path = "/api/workspaces/{workspace_id}/{category_type}/categories",
    params(
        ("workspace_id" = String, Path, description = "Workspace ID"),
        ("category_type" = CategoryType, Path, description = "expense or income"),
        CategoryRefQuery
    ),
    responses(
        (status = 200, description = "Category removed from the draft", body = ApiResponse<SessionStateDto>),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Not in edit mode")
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(service): State<Arc<CategoryService>>,
    WorkspacePath(ctx): WorkspacePath,
    Query(query): Query<CategoryRefQuery>,
) -> Result<Json<ApiResponse<SessionStateDto>>> {
    let key = query.into_ref()?;

    let session = service.session(&ctx).await;
    let coordinator = session.coordinator();

    if !coordinator.delete_category(&key).await? {
        return Err(AppError::NotFound(format!("Category {} not found", key)));
    }

    Ok(Json(ApiResponse::success(
        Some(coordinator.snapshot().await),
        None,
        None,
    )))
}

/// Enter edit mode on the selected version
#[utoipa::path(
    post,
    path = "/api/workspaces/{workspace_id}/{category_type}/editing/start",
    params(
        ("workspace_id" = String, Path, description = "Workspace ID"),
        ("category_type" = CategoryType, Path, description = "expense or income")
    ),
    responses(
        (status = 200, description = "Edit mode entered", body = ApiResponse<SessionStateDto>),
        (status = 400, description = "No version selected"),
        (status = 409, description = "Already editing")
    ),
    tag = "categories"
)]
pub async fn start_editing(
    State(service): State<Arc<CategoryService>>,
    WorkspacePath(ctx): WorkspacePath,
) -> Result<Json<ApiResponse<SessionStateDto>>> {
    let session = service.session(&ctx).await;
    let coordinator = session.coordinator();

    coordinator.start_editing().await?;

    Ok(Json(ApiResponse::success(
        Some(coordinator.snapshot().await),
        None,
        None,
    )))
}

/// Leave edit mode, discarding the draft
///
/// The selected version's categories are reloaded from the store.
#[utoipa::path(
    post,
    path = "/api/workspaces/{workspace_id}/{category_type}/editing/stop",
    params(
        ("workspace_id" = String, Path, description = "Workspace ID"),
        ("category_type" = CategoryType, Path, description = "expense or income")
    ),
    responses(
        (status = 200, description = "Edit mode left", body = ApiResponse<SessionStateDto>),
        (status = 409, description = "A save is in progress"),
        (status = 502, description = "Category store unavailable")
    ),
    tag = "categories"
)]
pub async fn stop_editing(
    State(service): State<Arc<CategoryService>>,
    WorkspacePath(ctx): WorkspacePath,
) -> Result<Json<ApiResponse<SessionStateDto>>> {
    let session = service.session(&ctx).await;
    let coordinator = session.coordinator();

    coordinator.stop_editing().await?;
    if coordinator.selected_version().await.is_some() {
        coordinator.fetch_categories(&ctx, None).await?;
    }

    Ok(Json(ApiResponse::success(
        Some(coordinator.snapshot().await),
        None,
        None,
    )))
}

/// Save the draft
///
/// Checks that every branch reaches the version's last level, then sends all
/// creates, updates and deletes to the store in one sync call.
#[utoipa::path(
    post,
    path = "/api/workspaces/{workspace_id}/{category_type}/save",
    params(
        ("workspace_id" = String, Path, description = "Workspace ID"),
        ("category_type" = CategoryType, Path, description = "expense or income")
    ),
    responses(
        (status = 200, description = "Draft saved", body = ApiResponse<SessionStateDto>),
        (status = 400, description = "No version selected"),
        (status = 403, description = "Workspace is being inspected"),
        (status = 409, description = "A sync is already in progress"),
        (status = 422, description = "Some branches are incomplete"),
        (status = 502, description = "Category store rejected the sync")
    ),
    tag = "categories"
)]
pub async fn save_changes(
    State(service): State<Arc<CategoryService>>,
    WorkspacePath(ctx): WorkspacePath,
) -> Result<Json<ApiResponse<SessionStateDto>>> {
    let session = service.session(&ctx).await;
    let coordinator = session.coordinator();

    coordinator.save_changes(&ctx).await?;

    Ok(Json(ApiResponse::success(
        Some(coordinator.snapshot().await),
        Some("Categories saved".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::dtos::ParentRefDto;
    use crate::shared::test_helpers::{category_router, remote_category, version, InMemoryCategoryStore};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    const BASE: &str = "/api/workspaces/ws1/expense";

    fn server(store: Arc<InMemoryCategoryStore>) -> TestServer {
        TestServer::new(category_router(store)).unwrap()
    }

    #[test]
    fn test_patch_from_dto() {
        let (key, patch) = patch_from_dto(UpdateCategoryDto {
            id: Some("3".to_string()),
            temp_id: None,
            name: Some("Snacks".to_string()),
            description: Some("  ".to_string()),
            is_active: None,
            parent: Some(ParentRefDto::default()),
        })
        .unwrap();

        assert_eq!(key, CategoryRef::Persisted("3".to_string()));
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.parent, Some(None));
        assert!(patch.level.is_none());
    }

    #[test]
    fn test_patch_from_dto_requires_one_key() {
        let result = patch_from_dto(UpdateCategoryDto {
            id: None,
            temp_id: None,
            name: None,
            description: None,
            is_active: None,
            parent: None,
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_edit_and_save_flow() {
        let store = Arc::new(InMemoryCategoryStore::new(vec![version("v1", 2, true)]));
        let server = server(store.clone());

        server.get(&format!("{}/versions", BASE)).await.assert_status_ok();
        server
            .post(&format!("{}/editing/start", BASE))
            .await
            .assert_status_ok();

        let response = server
            .post(&format!("{}/categories", BASE))
            .json(&json!({ "name": "Food", "level": 1 }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let food: Value = response.json();
        let food_temp_id = food["data"]["temp_id"].as_str().unwrap().to_string();

        server
            .post(&format!("{}/categories", BASE))
            .json(&json!({ "name": "Groceries", "level": 2, "parent_temp_id": food_temp_id }))
            .await
            .assert_status(StatusCode::CREATED);

        let duplicate = server
            .post(&format!("{}/categories", BASE))
            .json(&json!({ "name": " food ", "level": 1 }))
            .await;
        duplicate.assert_status(StatusCode::CONFLICT);

        let response = server.post(&format!("{}/save", BASE)).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["is_editing"], false);
        assert_eq!(body["data"]["categories"].as_array().unwrap().len(), 2);

        let create = &store.sync_calls()[0].create;
        assert_eq!(create[0].level, 4);
        assert_eq!(create[1].level, 5);
    }

    #[tokio::test]
    async fn test_incomplete_save_returns_unprocessable() {
        let store = Arc::new(InMemoryCategoryStore::new(vec![version("v1", 2, true)]));
        let server = server(store.clone());
        server.get(&format!("{}/versions", BASE)).await;
        server.post(&format!("{}/editing/start", BASE)).await;
        server
            .post(&format!("{}/categories", BASE))
            .json(&json!({ "name": "Food", "level": 1 }))
            .await;

        let response = server.post(&format!("{}/save", BASE)).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
        assert!(store.sync_calls().is_empty());

        let tree: Value = server
            .get(&format!("{}/categories/tree", BASE))
            .await
            .json();
        assert_eq!(tree["data"][0]["is_invalid"], true);
    }

    #[tokio::test]
    async fn test_mutation_outside_edit_mode_is_rejected() {
        let store = Arc::new(InMemoryCategoryStore::new(vec![version("v1", 1, true)]));
        let server = server(store);
        server.get(&format!("{}/versions", BASE)).await;

        let response = server
            .post(&format!("{}/categories", BASE))
            .json(&json!({ "name": "Food", "level": 1 }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_delete_and_stop_editing_restores_list() {
        let store = Arc::new(InMemoryCategoryStore::new(vec![version("v1", 1, true)]));
        store.seed_categories("v1", vec![remote_category("1", None, 5, "Food")]);
        let server = server(store);
        server.get(&format!("{}/versions", BASE)).await;
        server.get(&format!("{}/categories", BASE)).await.assert_status_ok();
        server.post(&format!("{}/editing/start", BASE)).await;

        let response = server
            .delete(&format!("{}/categories", BASE))
            .add_query_param("id", "1")
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["deleted_ids"], json!(["1"]));
        assert!(body["data"]["categories"].as_array().unwrap().is_empty());

        let body: Value = server
            .post(&format!("{}/editing/stop", BASE))
            .await
            .json();
        assert_eq!(body["data"]["is_editing"], false);
        assert_eq!(body["data"]["categories"].as_array().unwrap().len(), 1);
        assert!(body["data"]["deleted_ids"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_layout_positions_roots() {
        let store = Arc::new(InMemoryCategoryStore::new(vec![version("v1", 2, true)]));
        store.seed_categories(
            "v1",
            vec![
                remote_category("1", None, 4, "Food"),
                remote_category("2", Some("1"), 5, "Groceries"),
            ],
        );
        let server = server(store);
        server.get(&format!("{}/versions", BASE)).await;
        server.get(&format!("{}/categories", BASE)).await;

        let body: Value = server
            .get(&format!("{}/categories/layout", BASE))
            .await
            .json();

        let root = &body["data"][0];
        assert_eq!(root["y"], 50.0);
        assert_eq!(root["children"][0]["y"], 110.0);
    }
}

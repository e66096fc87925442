use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::inspection::dtos::{InspectionStatusDto, StartInspectionDto};
use crate::features::inspection::services::InspectionService;
use crate::shared::types::ApiResponse;

/// Open a workspace in read-only inspection mode
///
/// Mutating calls to the category store for this workspace are refused until
/// inspection stops. Activation stays allowed.
#[utoipa::path(
    post,
    path = "/api/inspection/start",
    request_body = StartInspectionDto,
    responses(
        (status = 200, description = "Inspection started", body = ApiResponse<InspectionStatusDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "inspection"
)]
pub async fn start_inspection(
    State(service): State<Arc<InspectionService>>,
    AppJson(dto): AppJson<StartInspectionDto>,
) -> Result<Json<ApiResponse<InspectionStatusDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let status = service.start_inspecting(dto.workspace_id).await;
    Ok(Json(ApiResponse::success(Some(status), None, None)))
}

/// Leave inspection mode
#[utoipa::path(
    post,
    path = "/api/inspection/stop",
    responses(
        (status = 200, description = "Inspection stopped", body = ApiResponse<InspectionStatusDto>)
    ),
    tag = "inspection"
)]
pub async fn stop_inspection(
    State(service): State<Arc<InspectionService>>,
) -> Result<Json<ApiResponse<InspectionStatusDto>>> {
    let status = service.stop_inspecting().await;
    Ok(Json(ApiResponse::success(Some(status), None, None)))
}

#[utoipa::path(
    get,
    path = "/api/inspection",
    responses(
        (status = 200, description = "Inspection status", body = ApiResponse<InspectionStatusDto>)
    ),
    tag = "inspection"
)]
pub async fn get_inspection(
    State(service): State<Arc<InspectionService>>,
) -> Result<Json<ApiResponse<InspectionStatusDto>>> {
    let status = service.status().await;
    Ok(Json(ApiResponse::success(Some(status), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::inspection::routes;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_start_and_stop_inspection() {
        let server = TestServer::new(routes(Arc::new(InspectionService::new()))).unwrap();

        let response = server
            .post("/api/inspection/start")
            .json(&json!({ "workspace_id": "ws1" }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["is_inspecting"], true);
        assert_eq!(body["data"]["inspected_workspace_id"], "ws1");

        server.post("/api/inspection/stop").await.assert_status_ok();

        let body: Value = server.get("/api/inspection").await.json();
        assert_eq!(body["data"]["is_inspecting"], false);
    }

    #[tokio::test]
    async fn test_start_requires_workspace() {
        let server = TestServer::new(routes(Arc::new(InspectionService::new()))).unwrap();

        let response = server
            .post("/api/inspection/start")
            .json(&json!({ "workspace_id": "" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

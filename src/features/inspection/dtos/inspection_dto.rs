use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request DTO for opening a workspace in read-only inspection mode
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct StartInspectionDto {
    #[validate(length(min = 1, message = "Workspace ID is required"))]
    pub workspace_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InspectionStatusDto {
    pub is_inspecting: bool,
    pub inspected_workspace_id: Option<String>,
}

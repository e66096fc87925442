use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::categories::dtos::CategoryDto;
use crate::features::categories::models::CategoryVersion;

/// Snapshot of one (workspace, type) editing session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionStateDto {
    pub versions: Vec<CategoryVersion>,
    pub active_version: Option<CategoryVersion>,
    pub selected_version: Option<CategoryVersion>,
    pub categories: Vec<CategoryDto>,
    /// Persisted ids scheduled for deletion on the next save
    pub deleted_ids: Vec<String>,
    /// Ids (or temp ids) flagged by the last failed completeness check
    pub invalid_ids: Vec<String>,
    pub is_editing: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

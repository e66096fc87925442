use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Atomic create/update/delete request sent to the remote store.
/// Levels are in backend numbering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    pub create: Vec<SyncCreateEntry>,
    pub update: Vec<SyncUpdateEntry>,
    pub delete: Vec<String>,
}

impl SyncPayload {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncCreateEntry {
    pub temp_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub level: i32,
    pub is_active: bool,
    pub parent_id: Option<String>,
    pub parent_temp_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncUpdateEntry {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub level: i32,
    pub is_active: bool,
    pub parent_id: Option<String>,
    /// Set when a persisted category was moved under a category created in the same session
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent_temp_id: Option<Uuid>,
}

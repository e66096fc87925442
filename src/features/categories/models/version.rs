use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Classification a category tree belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Expense,
    Income,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Expense => "expense",
            CategoryType::Income => "income",
        }
    }

    /// Path segment of the remote version resources
    pub fn versions_segment(&self) -> &'static str {
        match self {
            CategoryType::Expense => "expense-versions",
            CategoryType::Income => "income-versions",
        }
    }

    /// Path segment of the remote category resources
    pub fn categories_segment(&self) -> &'static str {
        match self {
            CategoryType::Expense => "expense-categories",
            CategoryType::Income => "income-categories",
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit (workspace, type) context every remote operation runs against
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkspaceContext {
    pub workspace_id: String,
    pub category_type: CategoryType,
}

impl WorkspaceContext {
    pub fn new(workspace_id: impl Into<String>, category_type: CategoryType) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            category_type,
        }
    }
}

/// A depth-bounded configuration owning one category tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryVersion {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub levels_count: i32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub workspace: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

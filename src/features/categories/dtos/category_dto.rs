use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::features::categories::models::{Category, CategoryRef};

/// Response DTO for a draft category (flat list entry)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryDto {
    pub id: Option<String>,
    pub temp_id: Option<Uuid>,
    pub parent_id: Option<String>,
    pub parent_temp_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    /// Display level (1 = root)
    pub level: i32,
    pub is_active: bool,
    /// True until the category has been synchronized
    pub is_new: bool,
}

impl From<&Category> for CategoryDto {
    fn from(c: &Category) -> Self {
        Self {
            id: c.key.id().map(String::from),
            temp_id: c.key.temp_id(),
            parent_id: c.parent.as_ref().and_then(|p| p.id()).map(String::from),
            parent_temp_id: c.parent.as_ref().and_then(|p| p.temp_id()),
            name: c.name.clone(),
            description: c.description.clone(),
            level: c.level,
            is_active: c.is_active,
            is_new: c.is_new(),
        }
    }
}

/// Response DTO for category tree (hierarchical structure)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct CategoryTreeDto {
    pub id: Option<String>,
    pub temp_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub level: i32,
    pub is_active: bool,
    pub is_new: bool,
    /// Flagged by the last failed completeness check
    pub is_invalid: bool,
    pub children: Vec<CategoryTreeDto>,
}

/// Positioned node of the graph view
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct LayoutNodeDto {
    pub id: Option<String>,
    pub temp_id: Option<Uuid>,
    pub name: String,
    pub level: i32,
    /// Left edge of the node box
    pub x: f64,
    /// Top edge of the node box
    pub y: f64,
    /// Left edge of the horizontal band reserved for this subtree
    pub subtree_x: f64,
    /// Width of the band reserved for this subtree
    pub width: f64,
    pub children: Vec<LayoutNodeDto>,
}

/// Request DTO for adding a category to the draft
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddCategoryDto {
    pub parent_id: Option<String>,
    pub parent_temp_id: Option<Uuid>,
    #[validate(length(max = 255, message = "Name must not exceed 255 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Level must be at least 1"))]
    pub level: i32,
}

/// Parent reference of a move; both fields absent moves the category to the root
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ParentRefDto {
    pub id: Option<String>,
    pub temp_id: Option<Uuid>,
}

/// Request DTO for editing a draft category, addressed by `id` or `temp_id`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    pub id: Option<String>,
    pub temp_id: Option<Uuid>,
    #[validate(length(max = 255, message = "Name must not exceed 255 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    /// New parent; present means "move"
    pub parent: Option<ParentRefDto>,
}

/// Query params addressing one category by `id` or `temp_id`
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CategoryRefQuery {
    pub id: Option<String>,
    pub temp_id: Option<Uuid>,
}

impl CategoryRefQuery {
    pub fn into_ref(self) -> Result<CategoryRef> {
        CategoryRef::from_parts(self.id, self.temp_id)
    }
}

/// Query params for loading categories
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ListCategoriesQuery {
    /// Version to load; defaults to the selected, then the active version
    pub version: Option<String>,
}

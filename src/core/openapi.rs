use utoipa::{Modify, OpenApi};

use crate::features::categories::{
    dtos as categories_dtos, handlers as categories_handlers, models as categories_models,
};
use crate::features::inspection::{dtos as inspection_dtos, handlers as inspection_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Versions
        categories_handlers::list_versions,
        categories_handlers::create_version,
        categories_handlers::update_version,
        categories_handlers::activate_version,
        categories_handlers::select_version,
        // Categories
        categories_handlers::get_state,
        categories_handlers::list_categories,
        categories_handlers::get_tree,
        categories_handlers::get_layout,
        categories_handlers::add_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        categories_handlers::start_editing,
        categories_handlers::stop_editing,
        categories_handlers::save_changes,
        // Inspection
        inspection_handlers::start_inspection,
        inspection_handlers::stop_inspection,
        inspection_handlers::get_inspection,
    ),
    components(
        schemas(
            Meta,
            categories_models::CategoryType,
            categories_models::CategoryVersion,
            categories_dtos::CreateVersionDto,
            categories_dtos::UpdateVersionDto,
            categories_dtos::CategoryDto,
            categories_dtos::CategoryTreeDto,
            categories_dtos::LayoutNodeDto,
            categories_dtos::AddCategoryDto,
            categories_dtos::ParentRefDto,
            categories_dtos::UpdateCategoryDto,
            categories_dtos::SessionStateDto,
            inspection_dtos::StartInspectionDto,
            inspection_dtos::InspectionStatusDto,
            ApiResponse<categories_models::CategoryVersion>,
            ApiResponse<Vec<categories_models::CategoryVersion>>,
            ApiResponse<categories_dtos::CategoryDto>,
            ApiResponse<Vec<categories_dtos::CategoryDto>>,
            ApiResponse<Vec<categories_dtos::CategoryTreeDto>>,
            ApiResponse<Vec<categories_dtos::LayoutNodeDto>>,
            ApiResponse<categories_dtos::SessionStateDto>,
            ApiResponse<inspection_dtos::InspectionStatusDto>,
        )
    ),
    tags(
        (name = "versions", description = "Category versions of a workspace"),
        (name = "categories", description = "Draft editing and synchronization of category trees"),
        (name = "inspection", description = "Read-only inspection of archived workspaces"),
    ),
    info(
        title = "Category Versions API",
        version = "0.1.0",
        description = "Versioned expense and income category trees",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

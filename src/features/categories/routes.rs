use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Create routes for the categories feature
pub fn routes(service: Arc<CategoryService>) -> Router {
    let base = "/api/workspaces/{workspace_id}/{category_type}";

    Router::new()
        .route(&format!("{}/state", base), get(handlers::get_state))
        .route(
            &format!("{}/versions", base),
            get(handlers::list_versions).post(handlers::create_version),
        )
        .route(
            &format!("{}/versions/{{version_id}}", base),
            patch(handlers::update_version),
        )
        .route(
            &format!("{}/versions/{{version_id}}/activate", base),
            post(handlers::activate_version),
        )
        .route(
            &format!("{}/versions/{{version_id}}/select", base),
            post(handlers::select_version),
        )
        .route(
            &format!("{}/categories", base),
            get(handlers::list_categories)
                .post(handlers::add_category)
                .patch(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route(&format!("{}/categories/tree", base), get(handlers::get_tree))
        .route(
            &format!("{}/categories/layout", base),
            get(handlers::get_layout),
        )
        .route(
            &format!("{}/editing/start", base),
            post(handlers::start_editing),
        )
        .route(
            &format!("{}/editing/stop", base),
            post(handlers::stop_editing),
        )
        .route(&format!("{}/save", base), post(handlers::save_changes))
        .with_state(service)
}

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::inspection::handlers;
use crate::features::inspection::services::InspectionService;

/// Create routes for the inspection feature
pub fn routes(service: Arc<InspectionService>) -> Router {
    Router::new()
        .route("/api/inspection", get(handlers::get_inspection))
        .route("/api/inspection/start", post(handlers::start_inspection))
        .route("/api/inspection/stop", post(handlers::stop_inspection))
        .with_state(service)
}

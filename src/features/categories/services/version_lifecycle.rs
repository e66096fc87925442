use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{CreateVersionDto, UpdateVersionDto};
use crate::features::categories::models::{CategoryVersion, WorkspaceContext};
use crate::features::categories::services::sync_coordinator::VersionSyncCoordinator;

/// Creates, renames and activates versions, refreshing the session afterwards
pub struct VersionLifecycleManager {
    coordinator: Arc<VersionSyncCoordinator>,
}

impl VersionLifecycleManager {
    pub fn new(coordinator: Arc<VersionSyncCoordinator>) -> Self {
        Self { coordinator }
    }

    /// The new version starts inactive and empty; the selection is unchanged
    pub async fn create_version(
        &self,
        ctx: &WorkspaceContext,
        dto: &CreateVersionDto,
    ) -> Result<CategoryVersion> {
        let translator = self.coordinator.translator();
        if !translator.supports(dto.levels_count) {
            return Err(AppError::Validation(format!(
                "Levels count must be between 1 and {}",
                translator.max_depth()
            )));
        }

        self.coordinator.begin_operation().await;
        let result = self.coordinator.store().create_version(ctx, dto).await;
        let version = self.coordinator.track(result).await?;

        tracing::info!(
            "Version {} created for {} {} with {} levels",
            version.id,
            ctx.workspace_id,
            ctx.category_type,
            version.levels_count
        );
        self.coordinator.fetch_versions(ctx).await?;
        Ok(version)
    }

    pub async fn update_version(
        &self,
        ctx: &WorkspaceContext,
        version_id: &str,
        dto: &UpdateVersionDto,
    ) -> Result<CategoryVersion> {
        if dto.name.is_none() && dto.description.is_none() {
            return Err(AppError::BadRequest("Nothing to update".to_string()));
        }

        self.coordinator.begin_operation().await;
        let result = self
            .coordinator
            .store()
            .update_version(ctx, version_id, dto)
            .await;
        let version = self.coordinator.track(result).await?;

        self.coordinator.fetch_versions(ctx).await?;
        Ok(version)
    }

    /// Makes `version_id` the single active version. When it is the version
    /// being viewed, its categories are reloaded too.
    pub async fn activate_version(&self, ctx: &WorkspaceContext, version_id: &str) -> Result<()> {
        self.coordinator.begin_operation().await;
        let result = self
            .coordinator
            .store()
            .activate_version(ctx, version_id)
            .await;
        self.coordinator.track(result).await?;

        self.coordinator.fetch_versions(ctx).await?;

        let selected = self.coordinator.selected_version().await;
        if selected.is_some_and(|v| v.id == version_id) {
            self.coordinator
                .fetch_categories(ctx, Some(version_id))
                .await?;
        }
        Ok(())
    }
}

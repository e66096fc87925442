use std::sync::Arc;

use tokio::sync::RwLock;

use crate::core::error::{AppError, Result};
use crate::features::categories::clients::{CategoryStoreApi, RemoteCategory};
use crate::features::categories::dtos::{
    CategoryDto, CategoryTreeDto, LayoutNodeDto, SessionStateDto, SyncCreateEntry, SyncPayload,
    SyncUpdateEntry,
};
use crate::features::categories::models::{
    Category, CategoryRef, CategoryVersion, WorkspaceContext,
};
use crate::features::categories::services::completeness_validator;
use crate::features::categories::services::draft_editor::{
    CategoryPatch, DraftEditor, EditTarget, NewCategory,
};
use crate::features::categories::services::layout::layout_forest;
use crate::features::categories::services::level_translator::LevelTranslator;
use crate::features::categories::services::tree_builder::{build_tree, CategoryNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Viewing,
    Editing,
}

#[derive(Debug, Default)]
struct SessionState {
    versions: Vec<CategoryVersion>,
    active_version: Option<CategoryVersion>,
    selected_version: Option<CategoryVersion>,
    draft: DraftEditor,
    // Version whose categories the draft currently holds
    loaded_version: Option<String>,
    mode: EditMode,
    is_loading: bool,
    error: Option<String>,
    // A response is applied only if its ticket is still the latest one issued
    versions_ticket: u64,
    categories_ticket: u64,
    sync_in_flight: bool,
}

impl SessionState {
    fn begin(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    fn fail(&mut self, err: &AppError) {
        self.is_loading = false;
        self.error = Some(err.to_string());
    }

    fn select(&mut self, version: Option<CategoryVersion>) {
        self.draft.set_target(version.as_ref().map(|v| EditTarget {
            version_id: v.id.clone(),
            levels_count: v.levels_count,
        }));
        self.selected_version = version;
    }

    fn discard_draft(&mut self) {
        self.draft.clear();
        self.loaded_version = None;
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.sync_in_flight {
            return Err(AppError::SyncInProgress);
        }
        Ok(())
    }

    /// The draft may only be edited or saved against the version it was loaded from
    fn ensure_loaded_for(&self, version_id: &str) -> Result<()> {
        match &self.loaded_version {
            Some(loaded) if loaded != version_id => Err(AppError::Conflict(format!(
                "Loaded categories belong to version {}, not the selected version {}",
                loaded, version_id
            ))),
            _ => Ok(()),
        }
    }

    fn ensure_editing(&self) -> Result<()> {
        self.ensure_idle()?;
        let Some(target) = self.draft.target() else {
            return Err(AppError::NoVersionSelected);
        };
        if self.mode != EditMode::Editing {
            return Err(AppError::NotEditing);
        }
        self.ensure_loaded_for(&target.version_id)
    }
}

/// Drives one (workspace, type) editing session: loads versions and their
/// category lists, owns the draft while editing, and pushes the draft back to
/// the remote store in a single sync call.
pub struct VersionSyncCoordinator {
    store: Arc<dyn CategoryStoreApi>,
    translator: LevelTranslator,
    state: RwLock<SessionState>,
}

impl VersionSyncCoordinator {
    pub fn new(store: Arc<dyn CategoryStoreApi>, translator: LevelTranslator) -> Self {
        Self {
            store,
            translator,
            state: RwLock::new(SessionState::default()),
        }
    }

    pub fn store(&self) -> &Arc<dyn CategoryStoreApi> {
        &self.store
    }

    pub fn translator(&self) -> LevelTranslator {
        self.translator
    }

    pub async fn snapshot(&self) -> SessionStateDto {
        let s = self.state.read().await;
        SessionStateDto {
            versions: s.versions.clone(),
            active_version: s.active_version.clone(),
            selected_version: s.selected_version.clone(),
            categories: s.draft.categories().iter().map(CategoryDto::from).collect(),
            deleted_ids: s.draft.deleted_ids().to_vec(),
            invalid_ids: s.draft.invalid_ids().iter().map(ToString::to_string).collect(),
            is_editing: s.mode == EditMode::Editing,
            is_loading: s.is_loading,
            error: s.error.clone(),
        }
    }

    pub async fn is_editing(&self) -> bool {
        self.state.read().await.mode == EditMode::Editing
    }

    /// Viewing with nothing loading or syncing; such a session can be dropped
    /// and rebuilt from the store without losing anything.
    pub async fn is_idle(&self) -> bool {
        let s = self.state.read().await;
        s.mode == EditMode::Viewing && !s.sync_in_flight && !s.is_loading
    }

    pub async fn selected_version(&self) -> Option<CategoryVersion> {
        self.state.read().await.selected_version.clone()
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.state.read().await.draft.categories().to_vec()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// Current draft as a forest, with nodes flagged by the last completeness check
    pub async fn tree(&self) -> Vec<CategoryTreeDto> {
        let s = self.state.read().await;
        let forest = build_tree(s.draft.categories());
        forest.iter().map(|node| tree_dto(node, &s.draft)).collect()
    }

    /// Current draft positioned for the graph view
    pub async fn layout(&self) -> Vec<LayoutNodeDto> {
        let s = self.state.read().await;
        layout_forest(&build_tree(s.draft.categories()))
    }

    /// Loads every version of the context's type. The selection falls back to the
    /// active version only when nothing is selected or the selected version is gone.
    pub async fn fetch_versions(&self, ctx: &WorkspaceContext) -> Result<Vec<CategoryVersion>> {
        let ticket = {
            let mut s = self.state.write().await;
            s.begin();
            s.draft.clear_invalid();
            s.versions_ticket += 1;
            s.versions_ticket
        };

        let result = self.store.list_versions(ctx).await;

        let mut s = self.state.write().await;
        if s.versions_ticket != ticket {
            tracing::debug!("Discarding superseded version list for {}", ctx.workspace_id);
            return result;
        }

        let versions = match result {
            Ok(versions) => versions,
            Err(e) => {
                s.fail(&e);
                return Err(e);
            }
        };

        let active = versions.iter().find(|v| v.is_active).cloned();
        let still_selected = s
            .selected_version
            .as_ref()
            .and_then(|selected| versions.iter().find(|v| v.id == selected.id))
            .cloned();
        let previous_id = s.selected_version.as_ref().map(|v| v.id.clone());

        let selection = still_selected.or_else(|| active.clone());
        if selection.as_ref().map(|v| &v.id) != previous_id.as_ref() {
            tracing::info!(
                "Selected version for {} {} is now {:?}",
                ctx.workspace_id,
                ctx.category_type,
                selection.as_ref().map(|v| &v.id)
            );
            if previous_id.is_some() {
                s.mode = EditMode::Viewing;
                s.discard_draft();
            }
        }
        s.select(selection);
        s.versions = versions.clone();
        s.active_version = active;
        s.is_loading = false;

        Ok(versions)
    }

    /// Switches the selected version, discarding the current draft
    pub async fn select_version(&self, version_id: Option<&str>) -> Result<()> {
        let mut s = self.state.write().await;
        s.ensure_idle()?;
        let version = match version_id {
            Some(id) => Some(
                s.versions
                    .iter()
                    .find(|v| v.id == id)
                    .cloned()
                    .ok_or_else(|| AppError::NotFound(format!("Version {} not found", id)))?,
            ),
            None => None,
        };

        if s.mode == EditMode::Editing {
            tracing::info!("Discarding edit session on version switch");
        }
        s.mode = EditMode::Viewing;
        s.select(version);
        s.discard_draft();
        Ok(())
    }

    /// Loads the flat category list of `version_id`, else the selected version,
    /// else the active version, and replaces the draft with it.
    pub async fn fetch_categories(
        &self,
        ctx: &WorkspaceContext,
        version_id: Option<&str>,
    ) -> Result<()> {
        let (ticket, target_id, levels_count) = {
            let mut s = self.state.write().await;
            s.begin();
            s.draft.clear_invalid();
            s.categories_ticket += 1;

            let target_id = version_id
                .map(String::from)
                .or_else(|| s.selected_version.as_ref().map(|v| v.id.clone()))
                .or_else(|| s.active_version.as_ref().map(|v| v.id.clone()));
            let levels_count = target_id
                .as_deref()
                .and_then(|id| s.versions.iter().find(|v| v.id == id))
                .map(|v| v.levels_count)
                .unwrap_or_else(|| self.translator.max_depth());

            (s.categories_ticket, target_id, levels_count)
        };

        let result = self.store.list_categories(ctx, target_id.as_deref()).await;

        let mut s = self.state.write().await;
        if s.categories_ticket != ticket {
            tracing::debug!("Discarding superseded category list for {}", ctx.workspace_id);
            return result.map(|_| ());
        }

        match result {
            Ok(remote) => {
                let categories: Vec<Category> = remote
                    .into_iter()
                    .map(|r| self.to_draft(r, levels_count))
                    .collect();
                tracing::debug!(
                    "Loaded {} categories for version {:?}",
                    categories.len(),
                    target_id
                );
                s.draft.replace(categories);
                s.loaded_version = target_id;
                s.is_loading = false;
                Ok(())
            }
            Err(e) => {
                s.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn start_editing(&self) -> Result<()> {
        let mut s = self.state.write().await;
        s.ensure_idle()?;
        let Some(selected_id) = s.selected_version.as_ref().map(|v| v.id.clone()) else {
            return Err(AppError::NoVersionSelected);
        };
        s.ensure_loaded_for(&selected_id)?;
        if s.mode == EditMode::Editing {
            return Err(AppError::Conflict(
                "An editing session is already open".to_string(),
            ));
        }

        s.mode = EditMode::Editing;
        s.error = None;
        s.draft.reset_tracking();
        tracing::info!("Entered edit mode");
        Ok(())
    }

    /// Leaves edit mode without saving. The caller re-fetches to restore the
    /// store's version of the tree.
    pub async fn stop_editing(&self) -> Result<()> {
        let mut s = self.state.write().await;
        s.ensure_idle()?;
        s.mode = EditMode::Viewing;
        s.draft.reset_tracking();
        tracing::info!("Left edit mode without saving");
        Ok(())
    }

    pub async fn add_category(
        &self,
        parent: Option<CategoryRef>,
        data: NewCategory,
    ) -> Result<Category> {
        let mut s = self.state.write().await;
        s.ensure_editing()?;

        let key = s.draft.add_category(parent, data)?;
        s.draft
            .find(&key)
            .cloned()
            .ok_or_else(|| AppError::Internal(format!("Category {} vanished after insert", key)))
    }

    /// Validated update; see [`DraftEditor::apply_patch`]
    pub async fn update_category(&self, key: &CategoryRef, patch: CategoryPatch) -> Result<bool> {
        let mut s = self.state.write().await;
        s.ensure_editing()?;
        s.draft.apply_patch(key, patch)
    }

    pub async fn delete_category(&self, key: &CategoryRef) -> Result<bool> {
        let mut s = self.state.write().await;
        s.ensure_editing()?;
        Ok(s.draft.delete_category(key))
    }

    /// Validates the draft and synchronizes it with the store in one call.
    ///
    /// On success the draft is replaced by the store's list (so every temp id is
    /// gone) and edit mode ends. On failure the draft and edit mode are kept.
    pub async fn save_changes(&self, ctx: &WorkspaceContext) -> Result<()> {
        let (version, payload) = {
            let mut s = self.state.write().await;
            if s.sync_in_flight {
                return Err(AppError::SyncInProgress);
            }
            s.begin();
            s.draft.clear_invalid();

            let Some(version) = s.selected_version.clone() else {
                let err = AppError::NoVersionSelected;
                s.fail(&err);
                return Err(err);
            };
            if let Err(err) = s.ensure_loaded_for(&version.id) {
                s.fail(&err);
                return Err(err);
            }
            let levels_count = version.levels_count;

            let invalid = completeness_validator::validate(s.draft.categories(), levels_count);
            if !invalid.is_empty() {
                let err = completeness_validator::validation_error(
                    s.draft.categories(),
                    &invalid,
                    levels_count,
                );
                tracing::warn!(
                    "Save blocked: {} categories do not reach level {}",
                    invalid.len(),
                    levels_count
                );
                s.draft.set_invalid(invalid);
                s.fail(&err);
                return Err(err);
            }

            let payload = build_sync_payload(
                s.draft.categories(),
                s.draft.deleted_ids(),
                &self.translator,
                levels_count,
            );
            s.sync_in_flight = true;
            (version, payload)
        };

        tracing::info!(
            "Synchronizing version {}: {} created, {} updated, {} deleted",
            version.id,
            payload.create.len(),
            payload.update.len(),
            payload.delete.len()
        );

        let canonical = match self.store.sync_categories(ctx, &version.id, &payload).await {
            Ok(canonical) => canonical,
            Err(e) => {
                let mut s = self.state.write().await;
                s.sync_in_flight = false;
                s.fail(&e);
                return Err(e);
            }
        };

        let reloaded = match canonical {
            Some(categories) => Ok(categories),
            None => self.store.list_categories(ctx, Some(&version.id)).await,
        };

        let mut s = self.state.write().await;
        s.sync_in_flight = false;
        // Supersedes any fetch that started before the sync finished
        s.categories_ticket += 1;
        s.mode = EditMode::Viewing;

        match reloaded {
            Ok(remote) => {
                let categories = remote
                    .into_iter()
                    .map(|r| self.to_draft(r, version.levels_count))
                    .collect();
                s.draft.replace(categories);
                s.loaded_version = Some(version.id.clone());
                s.is_loading = false;
                tracing::info!("Version {} synchronized", version.id);
                Ok(())
            }
            Err(e) => {
                // The store has committed; keeping temp ids would create them twice on retry
                s.discard_draft();
                let err = AppError::RemoteFailure(format!(
                    "Changes were saved but reloading categories failed: {}",
                    e
                ));
                s.fail(&err);
                Err(err)
            }
        }
    }

    /// Marks the start of an operation driven from outside the coordinator
    pub(crate) async fn begin_operation(&self) {
        self.state.write().await.begin();
    }

    /// Records the error of a failed operation so it can be shown to the user
    pub(crate) async fn track<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.state.write().await.fail(e);
        }
        result
    }

    fn to_draft(&self, remote: RemoteCategory, levels_count: i32) -> Category {
        if !self.translator.backend_range(levels_count).contains(&remote.level) {
            tracing::warn!(
                "Category {} has level {} outside the range of a {}-level version",
                remote.id,
                remote.level,
                levels_count
            );
        }
        Category {
            key: CategoryRef::Persisted(remote.id),
            parent: remote
                .parent_id
                .filter(|p| !p.is_empty())
                .map(CategoryRef::Persisted),
            name: remote.name,
            description: remote.description,
            level: self.translator.to_display(remote.level, levels_count),
            is_active: remote.is_active,
        }
    }
}

/// Splits the draft into the three sync sets, with levels in backend numbering
pub fn build_sync_payload(
    categories: &[Category],
    deleted_ids: &[String],
    translator: &LevelTranslator,
    levels_count: i32,
) -> SyncPayload {
    let mut payload = SyncPayload {
        delete: deleted_ids.to_vec(),
        ..Default::default()
    };

    for category in categories {
        let level = translator.to_backend(category.level, levels_count);
        let parent_id = category
            .parent
            .as_ref()
            .and_then(|p| p.id())
            .map(String::from);
        let parent_temp_id = category.parent.as_ref().and_then(|p| p.temp_id());

        match &category.key {
            CategoryRef::Pending(temp_id) => payload.create.push(SyncCreateEntry {
                temp_id: *temp_id,
                name: category.name.clone(),
                description: category.description.clone(),
                level,
                is_active: category.is_active,
                parent_id,
                parent_temp_id,
            }),
            CategoryRef::Persisted(id) => payload.update.push(SyncUpdateEntry {
                id: id.clone(),
                name: category.name.clone(),
                description: category.description.clone(),
                level,
                is_active: category.is_active,
                parent_id,
                parent_temp_id,
            }),
        }
    }

    payload
}

fn tree_dto(node: &CategoryNode, draft: &DraftEditor) -> CategoryTreeDto {
    let category = &node.category;
    CategoryTreeDto {
        id: category.key.id().map(String::from),
        temp_id: category.key.temp_id(),
        name: category.name.clone(),
        description: category.description.clone(),
        level: category.level,
        is_active: category.is_active,
        is_new: category.is_new(),
        is_invalid: draft.is_invalid(&category.key),
        children: node
            .children
            .iter()
            .map(|child| tree_dto(child, draft))
            .collect(),
    }
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::Method;
use axum::Router;
use tokio::sync::Notify;

use crate::core::error::{AppError, Result};
use crate::core::middleware::RequestGuard;
use crate::features::categories::clients::{CategoryStoreApi, RemoteCategory};
use crate::features::categories::dtos::{CreateVersionDto, SyncPayload, UpdateVersionDto};
use crate::features::categories::models::{CategoryVersion, WorkspaceContext};
use crate::features::categories::services::{CategoryService, LevelTranslator};

/// Guard that lets every request through
pub struct AllowAll;

#[async_trait]
impl RequestGuard for AllowAll {
    async fn check(&self, _method: &Method, _path: &str) -> Result<()> {
        Ok(())
    }
}

pub fn version(id: &str, levels_count: i32, is_active: bool) -> CategoryVersion {
    CategoryVersion {
        id: id.to_string(),
        name: format!("Version {}", id),
        description: None,
        levels_count,
        is_active,
        workspace: Some("ws1".to_string()),
        created_by: None,
        created_at: None,
    }
}

pub fn remote_category(id: &str, parent_id: Option<&str>, level: i32, name: &str) -> RemoteCategory {
    RemoteCategory {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        level,
        is_active: true,
        parent_id: parent_id.map(String::from),
    }
}

#[derive(Default)]
struct StoreState {
    versions: Vec<CategoryVersion>,
    categories: HashMap<String, Vec<RemoteCategory>>,
    next_id: u64,
    sync_calls: Vec<SyncPayload>,
    fail_next: Option<String>,
    return_canonical: bool,
}

/// In-memory stand-in for the remote category store.
/// Sync applies the payload all-or-nothing and assigns sequential ids.
pub struct InMemoryCategoryStore {
    state: Mutex<StoreState>,
    hold: Mutex<Option<Arc<Notify>>>,
    waiting: AtomicUsize,
}

impl InMemoryCategoryStore {
    pub fn new(versions: Vec<CategoryVersion>) -> Self {
        Self {
            state: Mutex::new(StoreState {
                versions,
                next_id: 100,
                return_canonical: true,
                ..Default::default()
            }),
            hold: Mutex::new(None),
            waiting: AtomicUsize::new(0),
        }
    }

    pub fn seed_categories(&self, version_id: &str, categories: Vec<RemoteCategory>) {
        self.state
            .lock()
            .unwrap()
            .categories
            .insert(version_id.to_string(), categories);
    }

    pub fn remove_version(&self, version_id: &str) {
        self.state
            .lock()
            .unwrap()
            .versions
            .retain(|v| v.id != version_id);
    }

    /// Makes the next store call fail with a remote error
    pub fn fail_next(&self, message: &str) {
        self.state.lock().unwrap().fail_next = Some(message.to_string());
    }

    pub fn set_return_canonical(&self, value: bool) {
        self.state.lock().unwrap().return_canonical = value;
    }

    pub fn sync_calls(&self) -> Vec<SyncPayload> {
        self.state.lock().unwrap().sync_calls.clone()
    }

    pub fn versions(&self) -> Vec<CategoryVersion> {
        self.state.lock().unwrap().versions.clone()
    }

    /// The next category list call snapshots its answer, then waits for the
    /// returned gate before responding.
    pub fn hold_next_list(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn waiting_lists(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> Result<()> {
        match self.state.lock().unwrap().fail_next.take() {
            Some(message) => Err(AppError::RemoteFailure(message)),
            None => Ok(()),
        }
    }

    fn next_id(state: &mut StoreState) -> String {
        state.next_id += 1;
        state.next_id.to_string()
    }
}

#[async_trait]
impl CategoryStoreApi for InMemoryCategoryStore {
    async fn list_versions(&self, _ctx: &WorkspaceContext) -> Result<Vec<CategoryVersion>> {
        self.take_failure()?;
        Ok(self.versions())
    }

    async fn create_version(
        &self,
        _ctx: &WorkspaceContext,
        payload: &CreateVersionDto,
    ) -> Result<CategoryVersion> {
        self.take_failure()?;
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let mut created = version(&id, payload.levels_count, false);
        created.name = payload.name.clone();
        created.description = payload.description.clone();
        state.versions.push(created.clone());
        Ok(created)
    }

    async fn update_version(
        &self,
        _ctx: &WorkspaceContext,
        version_id: &str,
        payload: &UpdateVersionDto,
    ) -> Result<CategoryVersion> {
        self.take_failure()?;
        let mut state = self.state.lock().unwrap();
        let version = state
            .versions
            .iter_mut()
            .find(|v| v.id == version_id)
            .ok_or_else(|| AppError::RemoteFailure("Category store error: HTTP 404".into()))?;
        if let Some(name) = &payload.name {
            version.name = name.clone();
        }
        if let Some(description) = &payload.description {
            version.description = Some(description.clone());
        }
        Ok(version.clone())
    }

    async fn activate_version(&self, _ctx: &WorkspaceContext, version_id: &str) -> Result<()> {
        self.take_failure()?;
        let mut state = self.state.lock().unwrap();
        if !state.versions.iter().any(|v| v.id == version_id) {
            return Err(AppError::RemoteFailure("Category store error: HTTP 404".into()));
        }
        for version in state.versions.iter_mut() {
            version.is_active = version.id == version_id;
        }
        Ok(())
    }

    async fn list_categories(
        &self,
        _ctx: &WorkspaceContext,
        version_id: Option<&str>,
    ) -> Result<Vec<RemoteCategory>> {
        self.take_failure()?;
        let snapshot = {
            let state = self.state.lock().unwrap();
            let version_id = version_id.map(String::from).or_else(|| {
                state
                    .versions
                    .iter()
                    .find(|v| v.is_active)
                    .map(|v| v.id.clone())
            });
            version_id
                .and_then(|id| state.categories.get(&id).cloned())
                .unwrap_or_default()
        };

        let gate = self.hold.lock().unwrap().take();
        if let Some(gate) = gate {
            self.waiting.fetch_add(1, Ordering::SeqCst);
            gate.notified().await;
        }
        Ok(snapshot)
    }

    async fn sync_categories(
        &self,
        _ctx: &WorkspaceContext,
        version_id: &str,
        payload: &SyncPayload,
    ) -> Result<Option<Vec<RemoteCategory>>> {
        self.take_failure()?;
        let mut state = self.state.lock().unwrap();
        state.sync_calls.push(payload.clone());

        let mut categories = state.categories.get(version_id).cloned().unwrap_or_default();
        let mut assigned: HashMap<uuid::Uuid, String> = HashMap::new();
        for entry in &payload.create {
            let id = Self::next_id(&mut state);
            assigned.insert(entry.temp_id, id);
        }

        let resolve = |parent_id: &Option<String>, parent_temp_id: &Option<uuid::Uuid>| {
            parent_id
                .clone()
                .or_else(|| parent_temp_id.and_then(|t| assigned.get(&t).cloned()))
        };

        for entry in &payload.update {
            if let Some(existing) = categories.iter_mut().find(|c| c.id == entry.id) {
                existing.name = entry.name.clone();
                existing.description = entry.description.clone();
                existing.level = entry.level;
                existing.is_active = entry.is_active;
                existing.parent_id = resolve(&entry.parent_id, &entry.parent_temp_id);
            }
        }
        for entry in &payload.create {
            categories.push(RemoteCategory {
                id: assigned[&entry.temp_id].clone(),
                name: entry.name.clone(),
                description: entry.description.clone(),
                level: entry.level,
                is_active: entry.is_active,
                parent_id: resolve(&entry.parent_id, &entry.parent_temp_id),
            });
        }
        categories.retain(|c| !payload.delete.contains(&c.id));

        state
            .categories
            .insert(version_id.to_string(), categories.clone());
        Ok(state.return_canonical.then_some(categories))
    }
}

/// Category routes served over an in-memory store
pub fn category_router(store: Arc<InMemoryCategoryStore>) -> Router {
    let service = Arc::new(CategoryService::new(store, LevelTranslator::default()));
    crate::features::categories::routes(service)
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::features::categories::clients::CategoryStoreApi;
use crate::features::categories::models::WorkspaceContext;
use crate::features::categories::services::level_translator::LevelTranslator;
use crate::features::categories::services::sync_coordinator::VersionSyncCoordinator;
use crate::features::categories::services::version_lifecycle::VersionLifecycleManager;

/// Editing session of one workspace and category type
pub struct CategorySession {
    coordinator: Arc<VersionSyncCoordinator>,
    lifecycle: VersionLifecycleManager,
    // Milliseconds since the registry was created
    last_used: AtomicU64,
}

impl CategorySession {
    fn new(store: Arc<dyn CategoryStoreApi>, translator: LevelTranslator, now: u64) -> Self {
        let coordinator = Arc::new(VersionSyncCoordinator::new(store, translator));
        Self {
            lifecycle: VersionLifecycleManager::new(coordinator.clone()),
            coordinator,
            last_used: AtomicU64::new(now),
        }
    }

    fn touch(&self, now: u64) {
        self.last_used.store(now, Ordering::Relaxed);
    }

    fn idle_for(&self, now: u64) -> Duration {
        Duration::from_millis(now.saturating_sub(self.last_used.load(Ordering::Relaxed)))
    }

    pub fn coordinator(&self) -> &VersionSyncCoordinator {
        &self.coordinator
    }

    pub fn lifecycle(&self) -> &VersionLifecycleManager {
        &self.lifecycle
    }
}

/// Registry of editing sessions, created lazily per (workspace, type).
///
/// Sessions that sit in viewing mode for longer than the idle timeout are
/// dropped by [`CategoryService::evict_idle`]; the next request rebuilds them
/// from the store.
pub struct CategoryService {
    store: Arc<dyn CategoryStoreApi>,
    translator: LevelTranslator,
    sessions: RwLock<HashMap<WorkspaceContext, Arc<CategorySession>>>,
    epoch: Instant,
}

impl CategoryService {
    const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

    pub fn new(store: Arc<dyn CategoryStoreApi>, translator: LevelTranslator) -> Self {
        Self {
            store,
            translator,
            sessions: RwLock::new(HashMap::new()),
            epoch: Instant::now(),
        }
    }

    fn now(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    pub fn translator(&self) -> LevelTranslator {
        self.translator
    }

    pub async fn session(&self, ctx: &WorkspaceContext) -> Arc<CategorySession> {
        let now = self.now();
        if let Some(session) = self.sessions.read().await.get(ctx) {
            session.touch(now);
            return session.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(ctx.clone())
            .or_insert_with(|| {
                tracing::debug!(
                    "Opening category session for {} {}",
                    ctx.workspace_id,
                    ctx.category_type
                );
                Arc::new(CategorySession::new(self.store.clone(), self.translator, now))
            })
            .clone()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions unused for at least `max_idle` that are viewing only and
    /// not held by any request. Returns how many were dropped.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = self.now();
        let mut sessions = self.sessions.write().await;

        let mut expired = Vec::new();
        for (ctx, session) in sessions.iter() {
            if session.idle_for(now) >= max_idle
                && Arc::strong_count(session) == 1
                && session.coordinator.is_idle().await
            {
                expired.push(ctx.clone());
            }
        }

        for ctx in &expired {
            sessions.remove(ctx);
            tracing::debug!(
                "Closed idle category session for {} {}",
                ctx.workspace_id,
                ctx.category_type
            );
        }
        expired.len()
    }

    /// Runs [`CategoryService::evict_idle`] periodically for the life of the process
    pub fn spawn_idle_sweeper(self: &Arc<Self>, max_idle: Duration) {
        let service = Arc::clone(self);
        let period = max_idle.clamp(Duration::from_secs(1), Self::MAX_SWEEP_INTERVAL);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let evicted = service.evict_idle(max_idle).await;
                if evicted > 0 {
                    tracing::info!(
                        "Evicted {} idle category sessions, {} still open",
                        evicted,
                        service.session_count().await
                    );
                }
            }
        });
    }
}

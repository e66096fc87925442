use async_trait::async_trait;
use axum::http::Method;
use tokio::sync::RwLock;

use crate::core::error::{AppError, Result};
use crate::core::middleware::{is_mutating, RequestGuard};
use crate::features::inspection::dtos::InspectionStatusDto;

/// Holds the workspace currently opened in read-only inspection mode
#[derive(Default)]
pub struct InspectionService {
    inspected: RwLock<Option<String>>,
}

impl InspectionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn start_inspecting(&self, workspace_id: String) -> InspectionStatusDto {
        tracing::info!("Inspecting archived workspace {}", workspace_id);
        *self.inspected.write().await = Some(workspace_id);
        self.status().await
    }

    pub async fn stop_inspecting(&self) -> InspectionStatusDto {
        if let Some(workspace_id) = self.inspected.write().await.take() {
            tracing::info!("Stopped inspecting workspace {}", workspace_id);
        }
        self.status().await
    }

    pub async fn status(&self) -> InspectionStatusDto {
        let inspected = self.inspected.read().await.clone();
        InspectionStatusDto {
            is_inspecting: inspected.is_some(),
            inspected_workspace_id: inspected,
        }
    }
}

/// True when `path` addresses `/workspaces/{workspace_id}` or something below it
fn targets_workspace(path: &str, workspace_id: &str) -> bool {
    let prefix = format!("/workspaces/{}", urlencoding::encode(workspace_id));
    path.match_indices(&prefix).any(|(start, _)| {
        matches!(path[start + prefix.len()..].chars().next(), None | Some('/') | Some('?'))
    })
}

#[async_trait]
impl RequestGuard for InspectionService {
    async fn check(&self, method: &Method, path: &str) -> Result<()> {
        if !is_mutating(method) {
            return Ok(());
        }

        let inspected = self.inspected.read().await;
        let Some(workspace_id) = inspected.as_deref() else {
            return Ok(());
        };

        if targets_workspace(path, workspace_id) && !path.contains("/activate/") {
            tracing::warn!(
                "Blocked {} {} while inspecting workspace {}",
                method,
                path,
                workspace_id
            );
            return Err(AppError::ArchivedWorkspaceReadOnly(workspace_id.to_string()));
        }

        Ok(())
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::config::CategoryStoreConfig;
use crate::core::error::{AppError, Result};
use crate::core::middleware::RequestGuard;
use crate::features::categories::dtos::{CreateVersionDto, SyncPayload, UpdateVersionDto};
use crate::features::categories::models::{CategoryVersion, WorkspaceContext};

/// Category as returned by the remote store; `level` is in backend numbering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub level: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, alias = "parent")]
    pub parent_id: Option<String>,
}

fn default_true() -> bool {
    true
}

/// List endpoints answer either with a bare array or a paginated envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListEnvelope<T> {
    Plain(Vec<T>),
    Paginated { results: Vec<T> },
}

impl<T> ListEnvelope<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Plain(items) => items,
            ListEnvelope::Paginated { results } => results,
        }
    }
}

/// Shapes of a sync answer that carry the canonical post-sync list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SyncResponse {
    Categories { categories: Vec<RemoteCategory> },
    Paginated { results: Vec<RemoteCategory> },
    Plain(Vec<RemoteCategory>),
}

/// Remote store holding category versions and their trees
#[async_trait]
pub trait CategoryStoreApi: Send + Sync {
    async fn list_versions(&self, ctx: &WorkspaceContext) -> Result<Vec<CategoryVersion>>;

    async fn create_version(
        &self,
        ctx: &WorkspaceContext,
        payload: &CreateVersionDto,
    ) -> Result<CategoryVersion>;

    async fn update_version(
        &self,
        ctx: &WorkspaceContext,
        version_id: &str,
        payload: &UpdateVersionDto,
    ) -> Result<CategoryVersion>;

    /// The store deactivates the previously active version itself
    async fn activate_version(&self, ctx: &WorkspaceContext, version_id: &str) -> Result<()>;

    async fn list_categories(
        &self,
        ctx: &WorkspaceContext,
        version_id: Option<&str>,
    ) -> Result<Vec<RemoteCategory>>;

    /// Applies creates, updates and deletes all-or-nothing.
    /// Returns the canonical category list when the store includes it.
    async fn sync_categories(
        &self,
        ctx: &WorkspaceContext,
        version_id: &str,
        payload: &SyncPayload,
    ) -> Result<Option<Vec<RemoteCategory>>>;
}

/// HTTP client for the remote category store
pub struct CategoryStoreClient {
    http_client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
    guard: Arc<dyn RequestGuard>,
}

impl CategoryStoreClient {
    pub fn new(config: &CategoryStoreConfig, guard: Arc<dyn RequestGuard>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent("CategoryVersions/0.1")
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
            api_token: config.api_token.clone(),
            guard,
        })
    }

    fn versions_path(ctx: &WorkspaceContext) -> String {
        format!(
            "/api/workspaces/{}/{}/",
            urlencoding::encode(&ctx.workspace_id),
            ctx.category_type.versions_segment()
        )
    }

    fn version_path(ctx: &WorkspaceContext, version_id: &str) -> String {
        format!(
            "{}{}/",
            Self::versions_path(ctx),
            urlencoding::encode(version_id)
        )
    }

    fn categories_path(ctx: &WorkspaceContext) -> String {
        format!(
            "/api/v1/finance/{}/",
            ctx.category_type.categories_segment()
        )
    }

    /// Runs the request guard and prepares an authenticated request
    async fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder> {
        self.guard.check(&method, path).await?;

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("Category store request: {} {}", method, url);

        let builder = self.http_client.request(method, &url);
        Ok(match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Sends the request and turns transport errors and non-2xx answers into `RemoteFailure`
    async fn send(&self, builder: reqwest::RequestBuilder, action: &str) -> Result<reqwest::Response> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!("Failed to {}: {}", action, e);
            AppError::RemoteFailure(format!("Failed to {}: {}", action, e))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!("Category store error while trying to {}: HTTP {} - {}", action, status, body);

        if status.as_u16() == 422 || status.as_u16() == 400 {
            return Err(AppError::RemoteFailure(format!(
                "Store rejected request to {}: {}",
                action, body
            )));
        }

        Err(AppError::RemoteFailure(format!(
            "Category store error: HTTP {}",
            status
        )))
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response, action: &str) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            tracing::error!("Failed to parse response to {}: {}", action, e);
            AppError::RemoteFailure(format!("Failed to parse response to {}: {}", action, e))
        })
    }
}

#[async_trait]
impl CategoryStoreApi for CategoryStoreClient {
    async fn list_versions(&self, ctx: &WorkspaceContext) -> Result<Vec<CategoryVersion>> {
        let action = "list versions";
        let builder = self.request(Method::GET, &Self::versions_path(ctx)).await?;
        let response = self.send(builder, action).await?;
        let envelope: ListEnvelope<CategoryVersion> = Self::parse(response, action).await?;
        Ok(envelope.into_items())
    }

    async fn create_version(
        &self,
        ctx: &WorkspaceContext,
        payload: &CreateVersionDto,
    ) -> Result<CategoryVersion> {
        let action = "create version";
        let builder = self
            .request(Method::POST, &Self::versions_path(ctx))
            .await?
            .json(payload);
        let response = self.send(builder, action).await?;
        let version: CategoryVersion = Self::parse(response, action).await?;

        tracing::info!("Created category version: {}", version.id);
        Ok(version)
    }

    async fn update_version(
        &self,
        ctx: &WorkspaceContext,
        version_id: &str,
        payload: &UpdateVersionDto,
    ) -> Result<CategoryVersion> {
        let action = "update version";
        let builder = self
            .request(Method::PATCH, &Self::version_path(ctx, version_id))
            .await?
            .json(payload);
        let response = self.send(builder, action).await?;
        Self::parse(response, action).await
    }

    async fn activate_version(&self, ctx: &WorkspaceContext, version_id: &str) -> Result<()> {
        let path = format!("{}activate/", Self::version_path(ctx, version_id));
        let builder = self.request(Method::POST, &path).await?;
        self.send(builder, "activate version").await?;

        tracing::info!("Activated category version: {}", version_id);
        Ok(())
    }

    async fn list_categories(
        &self,
        ctx: &WorkspaceContext,
        version_id: Option<&str>,
    ) -> Result<Vec<RemoteCategory>> {
        let action = "list categories";
        let mut builder = self
            .request(Method::GET, &Self::categories_path(ctx))
            .await?;
        if let Some(version_id) = version_id {
            builder = builder.query(&[("version", version_id)]);
        }
        let response = self.send(builder, action).await?;
        let envelope: ListEnvelope<RemoteCategory> = Self::parse(response, action).await?;
        Ok(envelope.into_items())
    }

    async fn sync_categories(
        &self,
        ctx: &WorkspaceContext,
        version_id: &str,
        payload: &SyncPayload,
    ) -> Result<Option<Vec<RemoteCategory>>> {
        let path = format!("{}sync/", Self::version_path(ctx, version_id));
        let builder = self.request(Method::POST, &path).await?.json(payload);
        let response = self.send(builder, "sync categories").await?;

        let body = response.text().await.unwrap_or_default();
        Ok(parse_sync_body(&body))
    }
}

/// Canonical category list carried by a sync answer, if any
fn parse_sync_body(body: &str) -> Option<Vec<RemoteCategory>> {
    if body.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<SyncResponse>(body) {
        Ok(SyncResponse::Categories { categories }) => Some(categories),
        Ok(SyncResponse::Paginated { results }) => Some(results),
        Ok(SyncResponse::Plain(categories)) => Some(categories),
        Err(_) => {
            tracing::debug!("Sync response carries no category list, reload required");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::models::CategoryType;
    use crate::features::inspection::InspectionService;
    use crate::shared::test_helpers::AllowAll;
    use std::time::Duration;

    fn client() -> CategoryStoreClient {
        let config = CategoryStoreConfig {
            base_url: "http://store.test".to_string(),
            api_token: None,
            request_timeout: Duration::from_secs(1),
            max_depth: 5,
            session_idle_timeout: Duration::from_secs(60),
        };
        CategoryStoreClient::new(&config, Arc::new(AllowAll)).unwrap()
    }

    #[test]
    fn test_paths() {
        let ctx = WorkspaceContext::new("ws 1", CategoryType::Income);

        assert_eq!(
            CategoryStoreClient::versions_path(&ctx),
            "/api/workspaces/ws%201/income-versions/"
        );
        assert_eq!(
            CategoryStoreClient::version_path(&ctx, "9"),
            "/api/workspaces/ws%201/income-versions/9/"
        );
        assert_eq!(
            CategoryStoreClient::categories_path(&ctx),
            "/api/v1/finance/income-categories/"
        );
    }

    #[tokio::test]
    async fn test_request_carries_bearer_token() {
        let mut client = client();
        client.api_token = Some("secret".to_string());

        let request = client
            .request(Method::GET, "/api/v1/finance/expense-categories/")
            .await
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "http://store.test/api/v1/finance/expense-categories/"
        );
        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer secret"
        );
    }

    #[tokio::test]
    async fn test_guard_cancels_request_before_sending() {
        let inspection = Arc::new(InspectionService::new());
        inspection.start_inspecting("ws1".to_string()).await;
        let mut client = client();
        client.guard = inspection;
        let ctx = WorkspaceContext::new("ws1", CategoryType::Expense);

        let result = client
            .sync_categories(&ctx, "9", &SyncPayload::default())
            .await;

        assert!(matches!(result, Err(AppError::ArchivedWorkspaceReadOnly(_))));
    }

    #[test]
    fn test_list_envelope_accepts_both_shapes() {
        let plain: ListEnvelope<RemoteCategory> =
            serde_json::from_str(r#"[{"id":"1","name":"Food","level":4,"parent":null}]"#).unwrap();
        let paginated: ListEnvelope<RemoteCategory> = serde_json::from_str(
            r#"{"count":1,"results":[{"id":"1","name":"Food","level":4,"parent_id":null}]}"#,
        )
        .unwrap();

        let plain = plain.into_items();
        assert_eq!(plain, paginated.into_items());
        assert!(plain[0].is_active);
    }

    #[test]
    fn test_remote_category_reads_parent_alias() {
        let category: RemoteCategory = serde_json::from_str(
            r#"{"id":"2","name":"Groceries","description":null,"level":5,"is_active":true,"parent":"1"}"#,
        )
        .unwrap();
        assert_eq!(category.parent_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_parse_sync_body() {
        assert_eq!(parse_sync_body(""), None);
        assert_eq!(parse_sync_body(r#"{"status":"ok"}"#), None);

        let categories = parse_sync_body(
            r#"{"categories":[{"id":"1","name":"Food","level":4}]}"#,
        )
        .unwrap();
        assert_eq!(categories[0].id, "1");

        let categories = parse_sync_body(r#"[{"id":"1","name":"Food","level":4}]"#).unwrap();
        assert_eq!(categories.len(), 1);
    }
}

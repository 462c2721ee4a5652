pub mod assertions;
pub mod fixtures;

use anyhow::Context as _;
use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use ggtable::{api::create_router, AppState, Config};
use tempfile::TempDir;
use tower::ServiceExt as _;

// Re-export commonly used items
pub use assertions::*;
pub use fixtures::*;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> anyhow::Result<Self> {
        Self::new_with_config(|_| {}).await
    }

    pub async fn new_with_config(configure: impl FnOnce(&mut Config)) -> anyhow::Result<Self> {
        Self::new_with_rows("", configure).await
    }

    /// Fresh fixture database per app, opened read-only like production.
    pub async fn new_with_rows(
        extra_rows: &str,
        configure: impl FnOnce(&mut Config),
    ) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir().context("create fixture directory")?;
        let path = dir.path().join("gene_table.db");
        create_gene_table(&path, extra_rows).await?;

        let mut config = Config::default();
        config.database.path = path;
        config.database.read_only = true;
        config.database.max_connections = 2;
        configure(&mut config);

        let state = AppState::new(config)
            .await
            .context("initialize AppState")?;
        let router = create_router(state.clone());

        Ok(Self {
            router,
            state,
            _dir: dir,
        })
    }

    pub async fn request(
        &self,
        method: Method,
        path_and_query: &str,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let request = Request::builder()
            .method(method)
            .uri(path_and_query)
            .header("accept", "application/json")
            .body(Body::empty())
            .context("build request")?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("dispatch request")?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("read response body")?;

        Ok((status, headers, body))
    }

    pub async fn get_json(
        &self,
        path_and_query: &str,
    ) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        let (status, _headers, body) = self.request(Method::GET, path_and_query).await?;
        let value = serde_json::from_slice(&body)
            .with_context(|| format!("decode JSON from {path_and_query}"))?;
        Ok((status, value))
    }

    /// Names of TEMP relations currently visible on `conn`.
    pub async fn temp_tables(conn: &mut sqlx::SqliteConnection) -> anyhow::Result<Vec<String>> {
        sqlx::query_scalar("SELECT name FROM sqlite_temp_master WHERE type = 'table'")
            .fetch_all(conn)
            .await
            .context("list temp tables")
    }
}

//! Search service - paged cluster search
//!
//! Orchestrates search operations by:
//! - Parsing query items into a request
//! - Running the page query and its count concurrently
//! - Computing pagination metadata

use crate::{
    db::search::engine::SearchEngine,
    db::search::params::{ClusterSearchRequest, QueryMode},
    models::Cluster,
    Result,
};
use serde::Serialize;
use std::sync::Arc;

/// One page of clusters plus pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub clusters: Vec<Cluster>,
    pub page: i64,
    pub page_size: i64,
    /// `None` when the count failed; the page itself is still complete.
    pub total: Option<i64>,
    pub total_pages: Option<i64>,
    /// The request as interpreted, for echoing sort and filter state
    pub request: ClusterSearchRequest,
}

/// Search service pairs each page with its count
#[derive(Clone)]
pub struct SearchService {
    engine: Arc<SearchEngine>,
}

impl SearchService {
    pub fn new(engine: Arc<SearchEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    /// Parse query-string items, then run [`Self::search_page`].
    pub async fn search_items(
        &self,
        query_items: &[(String, String)],
        mode: QueryMode,
    ) -> Result<SearchPage> {
        let request =
            ClusterSearchRequest::from_items(query_items, self.engine.limits().default_page_size)?;
        self.search_page(&request, mode).await
    }

    /// Page and count run in independent transactions.
    ///
    /// A page failure fails the call. A count failure is logged and leaves
    /// `total` and `total_pages` empty.
    pub async fn search_page(
        &self,
        request: &ClusterSearchRequest,
        mode: QueryMode,
    ) -> Result<SearchPage> {
        let pagination = request.pagination(self.engine.limits().max_page_size);

        let (clusters, count) = tokio::join!(
            self.engine.page(request, mode),
            self.engine.count(request, mode)
        );
        let clusters = clusters?;

        let total = match count {
            Ok(total) => Some(total),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    retryable = e.is_retryable(),
                    mode = mode.as_str(),
                    "Cluster count failed; returning page without totals"
                );
                None
            }
        };

        let mut echoed = request.clone();
        echoed.page = pagination.page;
        echoed.page_size = pagination.page_size;

        Ok(SearchPage {
            clusters,
            page: pagination.page,
            page_size: pagination.page_size,
            total,
            total_pages: total.map(|t| pagination.total_pages(t)),
            request: echoed,
        })
    }
}

//! Search operation handlers
//!
//! - Unfiltered listing (GET /api/v1/clusters)
//! - Filtered search (GET /api/v1/search)
//!
//! Both accept `order_by`, `order_dir`, `page`, `page_size` and genome
//! selection as `gm_<genome_id>` or repeated `genome_id` items.

use crate::{db::search::QueryMode, services::SearchPage, state::AppState, Result};
use axum::{
    extract::{Query, State},
    Json,
};

/// GET /api/v1/clusters
pub async fn list_clusters(
    State(state): State<AppState>,
    Query(items): Query<Vec<(String, String)>>,
) -> Result<Json<SearchPage>> {
    let page = state
        .search_service
        .search_items(&items, QueryMode::Listing)
        .await?;
    Ok(Json(page))
}

/// GET /api/v1/search?search=…&search_by=…
pub async fn search_clusters(
    State(state): State<AppState>,
    Query(items): Query<Vec<(String, String)>>,
) -> Result<Json<SearchPage>> {
    let page = state
        .search_service
        .search_items(&items, QueryMode::Search)
        .await?;
    Ok(Json(page))
}

//! Single-cluster handlers

use crate::{models::Cluster, state::AppState, Result};
use axum::{
    extract::{Path, State},
    Json,
};

/// GET /api/v1/clusters/:cluster_id
pub async fn get_cluster(
    State(state): State<AppState>,
    Path(cluster_id): Path<String>,
) -> Result<Json<Cluster>> {
    let cluster = state.engine.get_cluster(&cluster_id).await?;
    Ok(Json(cluster))
}

/// GET /api/v1/genes/:genome_id/:gene_id/cluster
///
/// 404 when the gene is in no cluster, 409 when it is in several.
pub async fn cluster_for_gene(
    State(state): State<AppState>,
    Path((genome_id, gene_id)): Path<(String, String)>,
) -> Result<Json<Cluster>> {
    let cluster = state.engine.cluster_for_gene(&genome_id, &gene_id).await?;
    Ok(Json(cluster))
}

//! Cluster API routes (JSON, versioned under /api/v1)

use crate::api::handlers::{clusters, genomes, search};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/clusters", get(search::list_clusters))
        .route("/clusters/:cluster_id", get(clusters::get_cluster))
        .route("/search", get(search::search_clusters))
        .route(
            "/genes/:genome_id/:gene_id/cluster",
            get(clusters::cluster_for_gene),
        )
        .route("/genomes", get(genomes::list_genomes))
}

use crate::{db::GenomeEntry, state::AppState};
use axum::{extract::State, Json};

/// GET /api/v1/genomes, in display order
pub async fn list_genomes(State(state): State<AppState>) -> Json<Vec<GenomeEntry>> {
    Json(state.genomes.entries())
}

//! Shared application state

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{
    config::Config,
    db::{self, GenomeDirectory, SearchEngine},
    services::SearchService,
    Result,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pool: SqlitePool,
    pub genomes: Arc<GenomeDirectory>,
    pub engine: Arc<SearchEngine>,
    pub search_service: SearchService,
}

impl AppState {
    /// Open the database and load the genome directory.
    pub async fn new(config: Config) -> Result<Self> {
        let pool = db::connect(&config.database).await?;
        Self::with_pool(config, pool).await
    }

    /// Build state over an already-open pool.
    pub async fn with_pool(config: Config, pool: SqlitePool) -> Result<Self> {
        let genomes = Arc::new(GenomeDirectory::load(&pool, &config.genomes.order).await?);
        let engine = Arc::new(SearchEngine::new(
            pool.clone(),
            genomes.clone(),
            config.search.limits(),
        ));

        Ok(Self {
            config: Arc::new(config),
            pool,
            genomes,
            search_service: SearchService::new(engine.clone()),
            engine,
        })
    }
}

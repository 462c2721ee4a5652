//! Cluster query and hydration engine
//!
//! The SearchEngine is responsible for:
//! - Compiling requests into scaffold, count and hydration statements
//! - Materializing the paginated scaffold inside one read transaction
//! - Hydrating gene and region hits onto the scaffold
//! - Assembling clusters in scaffold order
//! - Counting the same candidate relation for pagination metadata

use crate::config::SearchLimits;
use crate::db::genomes::GenomeDirectory;
use crate::db::search::{params, query_builder};
use crate::db::transaction::TransactionSupervisor;
use std::sync::Arc;

pub use params::{ClusterSearchRequest, QueryMode};
pub use query_builder::QueryBuilder;

mod api;
mod assemble;
mod execute;
mod hydrate;
mod scaffold;

/// Search engine executes cluster queries against the database
#[derive(Clone)]
pub struct SearchEngine {
    supervisor: TransactionSupervisor,
    genomes: Arc<GenomeDirectory>,
    limits: SearchLimits,
}

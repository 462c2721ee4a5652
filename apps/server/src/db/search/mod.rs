//! Cluster search: request parsing, SQL compilation and the engine

pub mod engine;
pub(crate) mod escape;
pub mod params;
pub mod query_builder;

pub use engine::SearchEngine;
pub use params::{
    ClusterSearchRequest, OrderDirection, OrderField, Pagination, QueryMode, SearchField,
};

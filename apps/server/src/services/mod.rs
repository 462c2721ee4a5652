//! Service layer - orchestration above the engine

pub mod search;

pub use search::{SearchPage, SearchService};

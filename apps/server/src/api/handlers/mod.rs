//! Request handlers for API endpoints
//!
//! Handlers coordinate between routes and the engine, handling:
//! - Request extraction
//! - Service invocation
//! - JSON responses (errors render through `crate::Error`)

pub mod clusters;
pub mod genomes;
pub mod metrics;
pub mod search;

pub use clusters::*;
pub use genomes::*;
pub use metrics::*;
pub use search::*;

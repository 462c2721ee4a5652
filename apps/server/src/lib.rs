//! ggtable - gene cluster query and hydration engine
//!
//! Browsing and search backend for a comparative-genomics gene table:
//! - Filtered, ordered, paginated cluster queries over SQLite
//! - Per-genome gene and region hydration in one read transaction
//! - Counts over the same candidate relation for page totals
//! - A thin JSON HTTP API and a command-line client

#![allow(
    clippy::too_many_arguments,      // Functions with many args are acceptable for domain operations
    clippy::type_complexity,         // Complex types are acceptable when they represent domain concepts
)]

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;

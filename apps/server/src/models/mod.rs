//! Domain models for gene clusters and their per-genome hits

pub mod cluster;

pub use cluster::{Cluster, ClusterProperty, Gene, Genome, Region};

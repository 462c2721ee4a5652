use axum::http::StatusCode;
use ggtable::models::Cluster;
use serde_json::Value;

/// Assert a response status with context
pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(
        actual, expected,
        "{context}: expected status {expected}, got {actual}"
    );
}

pub fn cluster_ids(clusters: &[Cluster]) -> Vec<&str> {
    clusters.iter().map(Cluster::id).collect()
}

/// Cluster IDs from a serialized search page, in order.
pub fn page_cluster_ids(page: &Value) -> Vec<String> {
    page["clusters"]
        .as_array()
        .map(|clusters| {
            clusters
                .iter()
                .filter_map(|c| c["cluster_properties"]["cluster_id"].as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

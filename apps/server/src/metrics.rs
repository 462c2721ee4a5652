//! Metrics collection for the ggtable server
//!
//! This module defines and manages Prometheus metrics for HTTP traffic and
//! cluster queries.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, register_int_gauge_vec,
    HistogramVec, IntCounterVec, IntGauge, IntGaugeVec,
};
use std::time::Duration;

lazy_static! {
    // HTTP Request Metrics

    /// Total HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "ggtable_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .expect("Failed to register HTTP_REQUESTS_TOTAL");

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "ggtable_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0]
    )
    .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");

    /// In-flight HTTP requests
    pub static ref HTTP_REQUESTS_IN_FLIGHT: IntGaugeVec = register_int_gauge_vec!(
        "ggtable_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
        &["method", "path"]
    )
    .expect("Failed to register HTTP_REQUESTS_IN_FLIGHT");

    // Cluster Query Metrics

    /// Engine operations by kind and outcome
    pub static ref CLUSTER_QUERIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "ggtable_cluster_queries_total",
        "Total number of cluster engine operations",
        &["operation", "status"]
    )
    .expect("Failed to register CLUSTER_QUERIES_TOTAL");

    /// Engine operation duration, transaction included
    pub static ref CLUSTER_QUERY_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "ggtable_cluster_query_duration_seconds",
        "Cluster engine operation duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0]
    )
    .expect("Failed to register CLUSTER_QUERY_DURATION_SECONDS");

    /// Clusters returned per page
    pub static ref CLUSTER_QUERY_RESULTS: HistogramVec = register_histogram_vec!(
        "ggtable_cluster_query_results",
        "Number of clusters returned by a query",
        &["operation"],
        vec![0.0, 1.0, 10.0, 50.0, 100.0, 250.0, 500.0, 1000.0]
    )
    .expect("Failed to register CLUSTER_QUERY_RESULTS");

    // Database Metrics

    /// Open pool connections
    pub static ref DB_CONNECTIONS_ACTIVE: IntGauge = register_int_gauge!(
        "ggtable_db_connections_active",
        "Number of open database connections"
    )
    .expect("Failed to register DB_CONNECTIONS_ACTIVE");

    /// Idle pool connections
    pub static ref DB_CONNECTIONS_IDLE: IntGauge = register_int_gauge!(
        "ggtable_db_connections_idle",
        "Number of idle database connections"
    )
    .expect("Failed to register DB_CONNECTIONS_IDLE");
}

/// Record one finished engine operation.
pub fn record_query<T>(
    operation: &str,
    elapsed: Duration,
    outcome: &crate::Result<T>,
    results: Option<usize>,
) {
    let status = match outcome {
        Ok(_) => "success",
        Err(e) => e.code(),
    };

    CLUSTER_QUERIES_TOTAL
        .with_label_values(&[operation, status])
        .inc();
    CLUSTER_QUERY_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(elapsed.as_secs_f64());
    if let Some(n) = results {
        CLUSTER_QUERY_RESULTS
            .with_label_values(&[operation])
            .observe(n as f64);
    }
}

/// Helper to sanitize path for metrics labels (remove IDs, limit cardinality)
pub fn sanitize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [] => "/".to_string(),
        ["api", "v1", "clusters", _] => "/api/v1/clusters/{cluster_id}".to_string(),
        ["api", "v1", "genes", _, _, "cluster"] => {
            "/api/v1/genes/{genome_id}/{gene_id}/cluster".to_string()
        }
        ["api", "v1", rest @ ..] if rest.len() <= 1 => format!("/{}", segments.join("/")),
        [first] => format!("/{first}"),
        // Unknown deep paths collapse to their first three segments
        _ => format!("/{}", segments[..segments.len().min(3)].join("/")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/"), "/");
        assert_eq!(sanitize_path("/health"), "/health");
        assert_eq!(sanitize_path("/metrics"), "/metrics");
        assert_eq!(sanitize_path("/api/v1/clusters"), "/api/v1/clusters");
        assert_eq!(sanitize_path("/api/v1/search"), "/api/v1/search");
        assert_eq!(
            sanitize_path("/api/v1/clusters/CL0000123"),
            "/api/v1/clusters/{cluster_id}"
        );
        assert_eq!(
            sanitize_path("/api/v1/genes/G1/g-001/cluster"),
            "/api/v1/genes/{genome_id}/{gene_id}/cluster"
        );
        assert_eq!(sanitize_path("/a/b/c/d/e"), "/a/b/c");
    }

    #[test]
    fn record_query_labels_errors_by_code() {
        let outcome: crate::Result<()> = Err(crate::Error::NotFound("C9".into()));
        record_query("cluster", Duration::from_millis(3), &outcome, None);

        let count = CLUSTER_QUERIES_TOTAL
            .with_label_values(&["cluster", "not-found"])
            .get();
        assert!(count >= 1);
    }
}

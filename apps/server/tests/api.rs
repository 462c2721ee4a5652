#[allow(unused)]
mod support;

use axum::http::{Method, StatusCode};
use support::constants::G1_COMPLETENESS;
use support::{assert_status, page_cluster_ids, TestApp};

#[tokio::test]
async fn health_reports_ok() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, headers, _body) = app.request(Method::GET, "/health").await?;
    assert_status(status, StatusCode::OK, "health");
    assert!(headers.contains_key("x-request-id"));

    let (_, body) = app.get_json("/health").await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn search_returns_page_with_totals() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, page) = app
        .get_json("/api/v1/search?search=heat&search_by=function&page_size=2")
        .await?;
    assert_status(status, StatusCode::OK, "search");
    assert_eq!(page_cluster_ids(&page), vec!["C1", "C2"]);
    assert_eq!(page["total"], 3);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["page"], 1);

    let first = &page["clusters"][0];
    assert_eq!(first["cluster_properties"]["rep_gene"], "g1");
    assert_eq!(
        first["genomes"]["G1"]["genes"][0]["completeness"],
        G1_COMPLETENESS
    );
    Ok(())
}

#[tokio::test]
async fn search_honours_genome_checkboxes() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, page) = app
        .get_json("/api/v1/search?search=heat&gm_G1=on&order_by=cluster_id&order_dir=desc")
        .await?;
    assert_status(status, StatusCode::OK, "filtered search");
    assert_eq!(page_cluster_ids(&page), vec!["C2", "C1"]);
    assert_eq!(page["total"], 2);
    Ok(())
}

#[tokio::test]
async fn listing_ignores_search_parameters() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, page) = app
        .get_json("/api/v1/clusters?search=heat&page=2&page_size=2")
        .await?;
    assert_status(status, StatusCode::OK, "listing");
    assert_eq!(page_cluster_ids(&page), vec!["C3", "C4"]);
    assert_eq!(page["total"], 5);
    assert_eq!(page["total_pages"], 3);
    Ok(())
}

#[tokio::test]
async fn unknown_search_field_is_a_bad_request() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, body) = app
        .get_json("/api/v1/search?search=heat&search_by=organism")
        .await?;
    assert_status(status, StatusCode::BAD_REQUEST, "invalid search_by");
    assert_eq!(body["error"]["code"], "invalid-field");
    assert_eq!(body["error"]["retryable"], false);
    Ok(())
}

#[tokio::test]
async fn cluster_and_gene_lookups() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, cluster) = app.get_json("/api/v1/clusters/C1").await?;
    assert_status(status, StatusCode::OK, "cluster");
    assert_eq!(cluster["cluster_properties"]["cluster_id"], "C1");
    assert!(cluster["genomes"]["G2"]["regions"].is_array());

    let (status, cluster) = app.get_json("/api/v1/genes/G2/g5/cluster").await?;
    assert_status(status, StatusCode::OK, "gene lookup");
    assert_eq!(cluster["cluster_properties"]["cluster_id"], "C3");

    let (status, body) = app.get_json("/api/v1/clusters/C404").await?;
    assert_status(status, StatusCode::NOT_FOUND, "missing cluster");
    assert_eq!(body["error"]["code"], "not-found");

    let (status, _) = app.get_json("/api/v1/genes/G1/dup/cluster").await?;
    assert_status(status, StatusCode::CONFLICT, "ambiguous gene");
    Ok(())
}

#[tokio::test]
async fn genomes_follow_configured_order() -> anyhow::Result<()> {
    let app = TestApp::new_with_config(|config| {
        config.genomes.order = vec!["G2".to_string()];
    })
    .await?;

    let (status, genomes) = app.get_json("/api/v1/genomes").await?;
    assert_status(status, StatusCode::OK, "genomes");
    assert_eq!(genomes[0]["genome_id"], "G2");
    assert_eq!(genomes[0]["name"], "Bacillus subtilis 168");
    assert_eq!(genomes[1]["genome_id"], "G1");
    Ok(())
}

#[tokio::test]
async fn metrics_are_exposed() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    app.get_json("/api/v1/clusters?page_size=1").await?;

    let (status, _headers, body) = app.request(Method::GET, "/metrics").await?;
    assert_status(status, StatusCode::OK, "metrics");
    let text = String::from_utf8(body.to_vec())?;
    assert!(text.contains("ggtable_cluster_queries_total"));
    Ok(())
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Integration tests for the exporter HTTP API.
//!
//! Uses `axum_test::TestServer` against an in-memory cluster, so no real TCP
//! or Kubernetes API needed.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use tokio_util::sync::CancellationToken;

use secrets_exporter::state::ExporterState;
use secrets_exporter::test_support::{
    test_config, test_state, token_secret, typed_secret, FakeCluster,
};
use secrets_exporter::transport::build_router;

fn test_server(cluster: FakeCluster) -> anyhow::Result<TestServer> {
    let state = test_state(Arc::new(cluster), test_config());
    TestServer::new(build_router(state))
}

fn scenario_cluster() -> FakeCluster {
    FakeCluster::new()
        .namespace("a", vec![token_secret("sa-tok", "default", "xyz")])
        .namespace("b", vec![typed_secret("registry", "kubernetes.io/dockerconfigjson", "{}")])
}

// -- Result set ---------------------------------------------------------------

#[tokio::test]
async fn two_namespaces_one_with_token() -> anyhow::Result<()> {
    let server = test_server(scenario_cluster())?;
    let resp = server.get("/").await;
    resp.assert_status_ok();

    let body: serde_json::Value = resp.json();
    assert_eq!(
        body,
        serde_json::json!([
            {
                "namespace": "a",
                "Secrets": [{ "name": "sa-tok", "serviceaccount": "default", "token": "xyz" }]
            },
            { "namespace": "b", "Secrets": [] }
        ])
    );
    Ok(())
}

#[tokio::test]
async fn no_namespaces_returns_empty_array() -> anyhow::Result<()> {
    let server = test_server(FakeCluster::new())?;
    let resp = server.get("/").await;
    resp.assert_status_ok();

    let body: Vec<serde_json::Value> = resp.json();
    assert!(body.is_empty());
    Ok(())
}

#[tokio::test]
async fn response_is_indented_json() -> anyhow::Result<()> {
    let server = test_server(scenario_cluster())?;
    let resp = server.get("/").await;
    resp.assert_status_ok();
    assert_eq!(resp.header("content-type"), "application/json");

    let text = resp.text();
    assert!(text.starts_with("[\n  {"), "not indented: {text}");
    Ok(())
}

#[tokio::test]
async fn any_method_and_path_is_served() -> anyhow::Result<()> {
    let server = test_server(scenario_cluster())?;

    let post = server.post("/").await;
    post.assert_status_ok();
    let nested = server.get("/metrics/anything").await;
    nested.assert_status_ok();

    let a: Vec<serde_json::Value> = post.json();
    let b: Vec<serde_json::Value> = nested.json();
    assert_eq!(a, b);
    Ok(())
}

#[tokio::test]
async fn repeated_requests_are_identical() -> anyhow::Result<()> {
    let server = test_server(
        scenario_cluster()
            .namespace("c", vec![token_secret("c-tok", "builder", "123")])
            .delay("a", Duration::from_millis(5)),
    )?;

    let (first, second, third) = tokio::join!(
        async { server.get("/").await },
        async { server.get("/").await },
        async { server.get("/").await },
    );
    let first: serde_json::Value = first.json();
    let second: serde_json::Value = second.json();
    let third: serde_json::Value = third.json();
    assert_eq!(first, second);
    assert_eq!(second, third);
    Ok(())
}

// -- Failures -----------------------------------------------------------------

#[tokio::test]
async fn failing_namespace_yields_partial_result() -> anyhow::Result<()> {
    let server = test_server(scenario_cluster().failing("b"))?;
    let resp = server.get("/").await;
    resp.assert_status_ok();

    let body: serde_json::Value = resp.json();
    assert_eq!(body[0]["namespace"], "a");
    assert_eq!(body[0]["Secrets"][0]["token"], "xyz");
    assert!(body[0].get("error").is_none());
    assert_eq!(body[1]["namespace"], "b");
    assert_eq!(body[1]["Secrets"], serde_json::json!([]));
    assert!(body[1]["error"].as_str().is_some_and(|e| e.contains("forbidden")));
    Ok(())
}

#[tokio::test]
async fn namespace_listing_failure_returns_502() -> anyhow::Result<()> {
    let server = test_server(scenario_cluster().fail_listing())?;
    let resp = server.get("/").await;
    resp.assert_status(StatusCode::BAD_GATEWAY);

    let body: serde_json::Value = resp.json();
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
    assert!(body["error"]["message"].as_str().is_some_and(|m| m.contains("namespaces")));
    Ok(())
}

#[tokio::test]
async fn hung_cluster_returns_504() -> anyhow::Result<()> {
    let mut config = test_config();
    config.request_timeout_ms = 50;
    let state = test_state(Arc::new(scenario_cluster().hang_listing()), config);
    let server = TestServer::new(build_router(state))?;

    let resp = server.get("/").await;
    resp.assert_status(StatusCode::GATEWAY_TIMEOUT);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["error"]["code"], "TIMEOUT");
    Ok(())
}

#[tokio::test]
async fn slow_namespace_hits_deadline() -> anyhow::Result<()> {
    let mut config = test_config();
    config.request_timeout_ms = 50;
    let cluster = scenario_cluster().delay("b", Duration::from_secs(30));
    let state = test_state(Arc::new(cluster), config);
    let server = TestServer::new(build_router(state))?;

    let resp = server.get("/").await;
    resp.assert_status(StatusCode::GATEWAY_TIMEOUT);
    Ok(())
}

#[tokio::test]
async fn shutdown_cancels_in_flight_request() -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let state = Arc::new(ExporterState::new(
        test_config(),
        Arc::new(scenario_cluster().hang_listing()),
        shutdown.clone(),
    ));
    let server = TestServer::new(build_router(state))?;

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.cancel();
    });
    let resp = server.get("/").await;
    canceller.await?;

    resp.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["error"]["code"], "SHUTTING_DOWN");
    Ok(())
}

#[tokio::test]
async fn concurrency_is_bounded_across_requests() -> anyhow::Result<()> {
    let mut cluster = FakeCluster::new();
    for i in 0..10 {
        let name = format!("ns-{i}");
        cluster = cluster.namespace(&name, vec![]).delay(&name, Duration::from_millis(10));
    }
    let cluster = Arc::new(cluster);
    let mut config = test_config();
    config.max_concurrency = 2;
    let server = TestServer::new(build_router(test_state(Arc::clone(&cluster), config)))?;

    let (first, second) =
        tokio::join!(async { server.get("/").await }, async { server.get("/").await });
    first.assert_status_ok();
    second.assert_status_ok();
    let first: Vec<serde_json::Value> = first.json();
    let second: Vec<serde_json::Value> = second.json();
    assert_eq!(first.len(), 10);
    assert_eq!(second.len(), 10);
    assert!(cluster.peak_in_flight() <= 2, "peak was {}", cluster.peak_in_flight());
    Ok(())
}

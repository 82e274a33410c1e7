//! Load and stress integration tests using wiremock
//!
//! These tests run the binary against a mock HTTP server and inspect the
//! written reports.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn breakpoint() -> Command {
    let mut cmd = Command::cargo_bin("breakpoint").unwrap();
    cmd.env_remove("BASE_URL").env_remove("DETECTED_ROUTES");
    cmd
}

async fn setup_mock_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"ok"}"#))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string(r#"{"error":"internal"}"#))
        .mount(&server)
        .await;

    server
}

fn read_json(path: &std::path::Path) -> serde_json::Value {
    let content = fs::read_to_string(path).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[tokio::test]
async fn load_writes_json_report() {
    let server = setup_mock_server().await;
    let dir = tempdir().unwrap();
    let output = dir.path().join("results.json");

    breakpoint()
        .args([
            "load",
            &server.uri(),
            "-R",
            "/api/health",
            "-d",
            "1s",
            "-r",
            "5",
            "-q",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let json = read_json(&output);
    let report = &json["reports"][0];
    assert_eq!(json["reports"].as_array().unwrap().len(), 1);
    assert_eq!(report["type"], "LOAD_TEST");
    assert_eq!(report["totalRequests"], 5);
    assert_eq!(report["failedRequests"], 0);
    assert_eq!(report["errorRate"], "0.00%");
    assert_eq!(report["interrupted"], false);
    assert!(report["p99"].as_f64().unwrap() >= report["p95"].as_f64().unwrap());
    assert_eq!(json["metadata"]["target"]["route"], "/api/health");
}

#[tokio::test]
async fn load_json_to_stdout() {
    let server = setup_mock_server().await;

    let assert = breakpoint()
        .args([
            "load",
            &server.uri(),
            "-d",
            "1s",
            "-r",
            "2",
            "--json",
        ])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["reports"][0]["type"], "LOAD_TEST");
    assert_eq!(json["reports"][0]["successfulRequests"], 2);
}

#[tokio::test]
async fn load_prints_summary() {
    let server = setup_mock_server().await;

    breakpoint()
        .args(["load", &server.uri(), "-d", "1s", "-r", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LOAD TEST"))
        .stdout(predicate::str::contains("Error Rate:"))
        .stdout(predicate::str::contains("0.00%"))
        .stderr(predicate::str::contains("[LOAD]"));
}

#[tokio::test]
async fn stress_finds_breaking_point() {
    let server = setup_mock_server().await;
    let dir = tempdir().unwrap();
    let output = dir.path().join("stress.json");

    breakpoint()
        .args([
            "stress",
            &server.uri(),
            "-R",
            "/api/broken",
            "-m",
            "30",
            "-i",
            "10",
            "-q",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let json = read_json(&output);
    let report = &json["reports"][0];
    assert_eq!(report["type"], "STRESS_TEST");
    assert_eq!(report["breakingPointHit"], true);
    assert_eq!(report["waves"].as_array().unwrap().len(), 1);
    assert_eq!(report["waves"][0]["concurrencyLevel"], 10);
    assert_eq!(report["waves"][0]["errorRate"], "100.00%");
    assert_eq!(report["analysis"]["breakingPoint"], 10);
}

#[tokio::test]
async fn stress_exit_code_on_breaking_point() {
    let server = setup_mock_server().await;

    breakpoint()
        .args([
            "stress",
            &server.uri(),
            "-R",
            "/api/broken",
            "-m",
            "20",
            "-i",
            "10",
            "-q",
            "--fail-on-breaking-point",
        ])
        .assert()
        .code(4);
}

#[tokio::test]
async fn stress_healthy_server_sweeps_every_level() {
    let server = setup_mock_server().await;
    let dir = tempdir().unwrap();
    let output = dir.path().join("stress.json");

    breakpoint()
        .args([
            "stress",
            &server.uri(),
            "-m",
            "30",
            "-i",
            "10",
            "-q",
            "--fail-on-breaking-point",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let json = read_json(&output);
    let report = &json["reports"][0];
    let levels: Vec<u64> = report["waves"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["concurrencyLevel"].as_u64().unwrap())
        .collect();
    assert_eq!(levels, vec![10, 20, 30]);
    assert_eq!(report["breakingPointHit"], false);
    assert_eq!(report["maxConcurrencyReached"], 30);
}

#[tokio::test]
async fn all_runs_both_phases() {
    let server = setup_mock_server().await;
    let dir = tempdir().unwrap();
    let output = dir.path().join("all.json");

    breakpoint()
        .args([
            "all",
            &server.uri(),
            "-d",
            "1s",
            "-r",
            "4",
            "-m",
            "20",
            "-i",
            "10",
            "-q",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let json = read_json(&output);
    let reports = json["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["type"], "LOAD_TEST");
    assert_eq!(reports[1]["type"], "STRESS_TEST");
}

#[tokio::test]
async fn markdown_report() {
    let server = setup_mock_server().await;
    let dir = tempdir().unwrap();
    let output = dir.path().join("results.md");

    breakpoint()
        .args([
            "stress",
            &server.uri(),
            "-m",
            "10",
            "-i",
            "10",
            "-q",
            "--format",
            "md",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let content = fs::read_to_string(&output).unwrap();
    assert!(content.contains("# Load & Stress Results"));
    assert!(content.contains("## Stress Test"));
    assert!(content.contains("### Analysis"));
}

#[tokio::test]
async fn missing_route_counts_as_success() {
    let server = setup_mock_server().await;
    let dir = tempdir().unwrap();
    let output = dir.path().join("results.json");

    // wiremock answers 404 for routes with no mock
    breakpoint()
        .args([
            "load",
            &server.uri(),
            "-R",
            "/api/products",
            "-d",
            "1s",
            "-r",
            "4",
            "-q",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let json = read_json(&output);
    assert_eq!(json["reports"][0]["successfulRequests"], 4);
    assert_eq!(json["reports"][0]["errorRate"], "0.00%");
}

#[tokio::test]
async fn strict_status_counts_missing_route_as_failure() {
    let server = setup_mock_server().await;
    let dir = tempdir().unwrap();
    let output = dir.path().join("results.json");

    breakpoint()
        .args([
            "load",
            &server.uri(),
            "-R",
            "/api/products",
            "--strict-status",
            "-d",
            "1s",
            "-r",
            "4",
            "-q",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let json = read_json(&output);
    assert_eq!(json["reports"][0]["failedRequests"], 4);
    assert_eq!(json["reports"][0]["errorRate"], "100.00%");
    assert_eq!(json["reports"][0]["errors"]["other"], 4);
}

#[tokio::test]
async fn unreachable_server_is_reported_not_fatal() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = tempdir().unwrap();
    let output = dir.path().join("results.json");

    breakpoint()
        .args([
            "load",
            &format!("http://{}", addr),
            "-d",
            "1s",
            "-r",
            "3",
            "-q",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let json = read_json(&output);
    assert_eq!(json["reports"][0]["failedRequests"], 3);
    assert_eq!(json["reports"][0]["errorRate"], "100.00%");
    assert_eq!(json["reports"][0]["errors"]["connection"], 3);
}

#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end runner tests against a mock MobSF.

use mobgate_client::{AuditConfig, AuditRequest, ComplianceAuditRunner};
use mobgate_core::MobgateError;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MASVS_PAYLOAD: &str = r#"{"controls":[{"control":"C1","status":"Passed"},{"control":"C2","status":"Failed","description":"d","remediation":"r"}]}"#;

async fn mock_mobsf(masvs_body: &str) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hash": "abc",
            "scan_type": "apk",
            "file_name": "app.apk"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/report_json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/masvs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(masvs_body))
        .expect(1)
        .mount(&server)
        .await;

    server
}

fn fast_config(server: &MockServer) -> AuditConfig {
    AuditConfig {
        poll_delay: Duration::from_millis(10),
        poll_timeout: Duration::from_secs(5),
        ready_timeout: Duration::from_secs(5),
        ready_interval: Duration::from_millis(10),
        ..AuditConfig::default()
    }
    .with_base_url(&server.uri())
}

fn write_app(dir: &tempfile::TempDir) -> PathBuf {
    let app = dir.path().join("app.apk");
    std::fs::write(&app, b"apk bytes").unwrap();
    app
}

#[tokio::test]
async fn test_violations_fail_the_run_when_requested() {
    let server = mock_mobsf(MASVS_PAYLOAD).await;
    let dir = tempfile::tempdir().unwrap();

    let runner = ComplianceAuditRunner::new(fast_config(&server)).unwrap();
    let request = AuditRequest {
        app_path: write_app(&dir),
        level: "L2".to_string(),
        fail_on_violation: true,
        output_path: None,
    };

    let err = runner.run(&request).await.unwrap_err();
    assert!(matches!(err, MobgateError::PolicyViolation));
    assert!(!err.is_network());
}

#[tokio::test]
async fn test_violations_reported_when_not_fatal() {
    let server = mock_mobsf(MASVS_PAYLOAD).await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("reports").join("masvs.json");

    let runner = ComplianceAuditRunner::new(fast_config(&server)).unwrap();
    let request = AuditRequest {
        app_path: write_app(&dir),
        level: "L2".to_string(),
        fail_on_violation: false,
        output_path: Some(output.clone()),
    };

    let result = runner.run(&request).await.unwrap();
    assert_eq!(result.level, "L2");
    assert_eq!(result.passed, 1);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].requirement(), "C2");
    assert!(!result.is_compliant());

    assert_eq!(std::fs::read_to_string(&output).unwrap(), MASVS_PAYLOAD);
}

#[tokio::test]
async fn test_compliant_run() {
    let server = mock_mobsf(r#"{"summary":{"passed":9,"failed":[]}}"#).await;
    let dir = tempfile::tempdir().unwrap();

    let runner = ComplianceAuditRunner::new(fast_config(&server)).unwrap();
    let request = AuditRequest {
        app_path: write_app(&dir),
        level: "L1".to_string(),
        fail_on_violation: true,
        output_path: None,
    };

    let result = runner.run(&request).await.unwrap();
    assert_eq!(result.passed, 9);
    assert!(result.is_compliant());
}

#[tokio::test]
async fn test_invalid_masvs_json_is_malformed() {
    let server = mock_mobsf("<html>oops</html>").await;
    let dir = tempfile::tempdir().unwrap();

    let runner = ComplianceAuditRunner::new(fast_config(&server)).unwrap();
    let request = AuditRequest {
        app_path: write_app(&dir),
        level: "L2".to_string(),
        fail_on_violation: true,
        output_path: None,
    };

    let err = runner.run(&request).await.unwrap_err();
    assert!(matches!(err, MobgateError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_missing_app_fails_before_any_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let runner = ComplianceAuditRunner::new(fast_config(&server)).unwrap();
    let request = AuditRequest {
        app_path: dir.path().join("missing.apk"),
        level: "L2".to_string(),
        fail_on_violation: true,
        output_path: None,
    };

    let err = runner.run(&request).await.unwrap_err();
    assert!(matches!(err, MobgateError::AppNotFound(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

//! Integration tests for the `assist-service` binary: one JSON request on
//! stdin, one JSON envelope on stdout, exit status per outcome.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use serde_json::{json, Value};

fn envelope(stdout: &[u8]) -> Value {
    serde_json::from_slice(stdout).expect("stdout should be a JSON envelope")
}

#[test]
fn liveness_check_succeeds() {
    let mut command = cargo_bin_cmd!("assist-service");
    command.write_stdin(r#"{"service": "test", "params": {"ignored": true}}"#);
    let output = command.assert().success().get_output().stdout.clone();
    assert_eq!(
        envelope(&output),
        json!({"success": true, "message": "Assist service is working"})
    );
}

#[test]
fn unknown_service_is_reported_with_zero_exit() {
    let mut command = cargo_bin_cmd!("assist-service");
    command.write_stdin(r#"{"service": "weather", "params": {}}"#);
    let output = command.assert().success().get_output().stdout.clone();
    assert_eq!(
        envelope(&output),
        json!({"success": false, "error": "Unknown service: weather"})
    );
}

#[test]
fn malformed_json_exits_with_failure() {
    let mut command = cargo_bin_cmd!("assist-service");
    command.write_stdin("{not json");
    let output = command
        .assert()
        .failure()
        .code(1)
        .stdout(contains("Invalid JSON input"))
        .get_output()
        .stdout
        .clone();
    assert_eq!(envelope(&output)["success"], json!(false));
}

#[test]
fn empty_input_exits_with_failure() {
    let mut command = cargo_bin_cmd!("assist-service");
    command.write_stdin("");
    command
        .assert()
        .failure()
        .code(1)
        .stdout(contains("No input data provided"));
}

#[test]
fn check_package_reports_builtin_capability() {
    let mut command = cargo_bin_cmd!("assist-service");
    command.write_stdin(r#"{"service": "check_package", "params": {"package": "stackoverflow"}}"#);
    let output = command.assert().success().get_output().stdout.clone();
    assert_eq!(envelope(&output)["success"], json!(true));
}

#[test]
fn version_flag_prints_version() {
    let mut command = cargo_bin_cmd!("assist-service");
    command.arg("--version");
    command
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn check_flag_reports_unreachable_api() {
    let mut command = cargo_bin_cmd!("assist-service");
    command
        .arg("--check")
        .env("STACKEXCHANGE_BASE_URL", "http://127.0.0.1:9/2.3")
        .env("STACKEXCHANGE_MIN_DELAY_MS", "0")
        .env("ASSIST_SERVICE_CONFIG", "/nonexistent/assist-service.json");
    let output = command.assert().code(2).get_output().stdout.clone();
    let report = envelope(&output);
    assert_eq!(report["connected"], json!(false));
    assert_eq!(report["quota"]["quota_remaining"], json!("unknown"));
}

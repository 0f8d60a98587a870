// ABOUTME: Integration tests for the acadeploy binary.
// ABOUTME: Validates --help output and failures that happen before any remote call.

use assert_cmd::Command;
use predicates::prelude::*;

fn acadeploy_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("acadeploy"));
    cmd.env_clear()
        .env("PATH", std::env::var("PATH").unwrap_or_default())
        .env("INPUT_DISABLETELEMETRY", "true");
    cmd
}

#[test]
fn help_lists_inputs() {
    acadeploy_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--app-source-path"))
        .stdout(predicate::str::contains("--yaml-config-path"))
        .stdout(predicate::str::contains("--target-port"));
}

#[test]
fn nothing_to_deploy_fails() {
    acadeploy_cmd()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("appSourcePath"));
}

#[test]
fn source_without_registry_fails() {
    let dir = tempfile::tempdir().unwrap();
    acadeploy_cmd()
        .env("INPUT_APPSOURCEPATH", dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("acrName"));
}

#[test]
fn invalid_ingress_fails() {
    acadeploy_cmd()
        .args(["--image-to-deploy", "nginx:1.25", "--ingress", "public"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ingress"));
}

#[test]
fn github_mode_annotates_errors() {
    acadeploy_cmd()
        .args(["--output", "github"])
        .assert()
        .failure()
        .stdout(predicate::str::starts_with("::error::"));
}

#[test]
fn json_mode_reports_error_event() {
    acadeploy_cmd()
        .args(["--output", "json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(r#""event":"error""#));
}

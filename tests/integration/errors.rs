use assert_cmd::Command;
use predicates::prelude::*;
use relgraph_cli::test_utils::PolicyFixture;

use crate::chain_registry;
use crate::common::TestProject;

#[test]
fn test_missing_registry_fails() {
    let project = TestProject::new().unwrap();
    project.write_policy(&PolicyFixture::with_roots(&["org.acme:app:1.0"])).unwrap();

    let output = project.run_relgraph(&["resolve", "--registry", "nowhere.json"]).unwrap();
    output
        .assert_failure()
        .assert_stderr_contains("error")
        .assert_stderr_contains("nowhere.json");
    assert_eq!(output.code, Some(1));
}

#[test]
fn test_malformed_registry_fails() {
    let project = TestProject::new().unwrap();
    project.write_file("registry.json", "{ \"artifacts\": [ { \"coords\": \"nonsense\" } ] }").unwrap();
    project.write_policy(&PolicyFixture::with_roots(&["org.acme:app:1.0"])).unwrap();

    let output = project.run_relgraph(&["resolve", "--registry", "registry.json"]).unwrap();
    output.assert_failure().assert_stderr_contains("registry.json");
    assert_eq!(output.code, Some(1));
}

#[test]
fn test_unknown_policy_key_fails() {
    let project = TestProject::new().unwrap();
    project.write_registry(&chain_registry()).unwrap();
    project.write_policy(&PolicyFixture::new("project-artifacts = []\nno-such-key = true")).unwrap();

    let output = project.run_relgraph(&["resolve", "--registry", "registry.json"]).unwrap();
    output.assert_failure().assert_stderr_contains("relgraph.toml");
    assert_eq!(output.code, Some(1));
}

#[test]
fn test_explicit_config_must_exist() {
    let project = TestProject::new().unwrap();
    project.write_registry(&chain_registry()).unwrap();

    let output = project
        .run_relgraph(&["-c", "missing.toml", "resolve", "--registry", "registry.json"])
        .unwrap();
    output
        .assert_failure()
        .assert_stderr_contains("Configuration file not found: missing.toml");
}

#[test]
fn test_no_roots_is_reported() {
    let project = TestProject::new().unwrap();
    project.write_registry(&chain_registry()).unwrap();

    let output = project.run_relgraph(&["order", "--registry", "registry.json"]).unwrap();
    output
        .assert_failure()
        .assert_stderr_contains("Invalid resolution policy")
        .assert_stderr_contains("--roots");
}

#[test]
fn test_invalid_pattern_is_reported() {
    let project = TestProject::new().unwrap();
    project.write_registry(&chain_registry()).unwrap();

    let output = project
        .run_relgraph(&[
            "resolve",
            "--registry",
            "registry.json",
            "--roots",
            "org.acme:app:1.0",
            "--exclude",
            "org.acme:[",
        ])
        .unwrap();
    output.assert_failure().assert_stderr_contains("Invalid pattern 'org.acme:['");
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("relgraph")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("order"));
}

#[test]
fn test_registry_flag_is_required() {
    Command::cargo_bin("relgraph")
        .unwrap()
        .arg("resolve")
        .env("RELGRAPH_NO_PROGRESS", "1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--registry"));
}

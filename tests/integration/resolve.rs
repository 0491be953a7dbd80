use relgraph_cli::test_utils::{PolicyFixture, RegistryFixture};

use crate::chain_registry;
use crate::common::TestProject;

#[test]
fn test_resolve_text_report() {
    let project = TestProject::new().unwrap();
    project.write_registry(&chain_registry()).unwrap();
    project.write_policy(&PolicyFixture::with_roots(&["org.acme:app:1.0"])).unwrap();

    let output = project.run_relgraph(&["resolve", "--registry", "registry.json"]).unwrap();
    output
        .assert_success()
        .assert_stdout_contains("Releases in build order:")
        .assert_stdout_contains("1. https://github.com/acme/util#1.0")
        .assert_stdout_contains("3. https://github.com/acme/app#1.0")
        .assert_stdout_contains("org.acme:core::jar:1.0")
        .assert_stdout_contains("Summary:")
        .assert_stdout_contains("3 release(s), 3 artifact(s), 0 cycle(s)");
}

#[test]
fn test_resolve_json_report() {
    let project = TestProject::new().unwrap();
    project.write_registry(&chain_registry()).unwrap();
    project.write_policy(&PolicyFixture::with_roots(&["org.acme:app:1.0"])).unwrap();

    let output = project
        .run_relgraph(&["resolve", "--registry", "registry.json", "--format", "json", "--tree"])
        .unwrap();
    output.assert_success();
    let report = output.json();

    let ids: Vec<&str> = report["releases"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec![
            "https://github.com/acme/util#1.0",
            "https://github.com/acme/core#1.0",
            "https://github.com/acme/app#1.0",
        ]
    );
    assert_eq!(report["releases"][2]["dependencies"][0], "https://github.com/acme/core#1.0");
    assert_eq!(report["releases"][0]["orderable"], true);
    assert_eq!(report["summary"]["releases"], 3);
    assert_eq!(report["summary"]["cycles"], 0);
    assert!(report["tree"].as_str().unwrap().contains("https://github.com/acme/app#1.0"));
    assert_eq!(report["detection"]["succeeded"], 3);
}

#[test]
fn test_command_line_overrides_policy() {
    let project = TestProject::new().unwrap();
    project.write_registry(&chain_registry()).unwrap();
    project.write_policy(&PolicyFixture::with_roots(&["org.acme:app:1.0"])).unwrap();

    let output = project
        .run_relgraph(&[
            "resolve",
            "--registry",
            "registry.json",
            "--format",
            "json",
            "--level",
            "1",
            "--log-remaining",
        ])
        .unwrap();
    output.assert_success();
    let report = output.json();
    assert_eq!(report["summary"]["releases"], 2);
    assert_eq!(report["remaining"][0], "org.acme:util::jar:1.0");
}

#[test]
fn test_roots_flag_without_policy_file() {
    let project = TestProject::new().unwrap();
    project.write_registry(&chain_registry()).unwrap();

    let output = project
        .run_relgraph(&["resolve", "--registry", "registry.json", "--roots", "org.acme:core:1.0"])
        .unwrap();
    output
        .assert_success()
        .assert_stdout_contains("https://github.com/acme/core#1.0")
        .assert_stdout_contains("2 release(s), 2 artifact(s)");
    assert!(!output.stdout.contains("acme/app"));
}

#[test]
fn test_missing_scm_is_a_warning_when_asked() {
    let project = TestProject::new().unwrap();
    let registry = RegistryFixture::new()
        .artifact("org.acme:app:1.0", "acme/app", &["org.acme:anon:1.0"])
        .artifact("org.acme:anon:1.0", "acme/anon", &[])
        .without_scm("org.acme:anon:1.0");
    project.write_registry(&registry).unwrap();
    project.write_policy(&PolicyFixture::with_roots(&["org.acme:app:1.0"])).unwrap();

    let output = project.run_relgraph(&["resolve", "--registry", "registry.json"]).unwrap();
    output.assert_failure().assert_stderr_contains("org.acme:anon::jar:1.0");

    let output = project
        .run_relgraph(&["resolve", "--registry", "registry.json", "--warn-on-missing-scm"])
        .unwrap();
    output
        .assert_success()
        .assert_stdout_contains("Warnings:")
        .assert_stdout_contains("<unknown>#org.acme:anon:1.0");
}

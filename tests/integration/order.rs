use relgraph_cli::test_utils::{PolicyFixture, RegistryFixture};

use crate::chain_registry;
use crate::common::TestProject;

#[test]
fn test_order_prints_dependencies_first() {
    let project = TestProject::new().unwrap();
    project.write_registry(&chain_registry()).unwrap();
    project.write_policy(&PolicyFixture::with_roots(&["org.acme:app:1.0"])).unwrap();

    let output = project.run_relgraph(&["order", "--registry", "registry.json"]).unwrap();
    output.assert_success();
    let lines: Vec<&str> = output.stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "https://github.com/acme/util#1.0",
            "https://github.com/acme/core#1.0",
            "https://github.com/acme/app#1.0",
        ]
    );
}

#[test]
fn test_order_with_cycle_still_succeeds() {
    let project = TestProject::new().unwrap();
    let registry = RegistryFixture::new()
        .artifact("org.acme:a:1.0", "acme/ra", &["org.acme:b:1.0", "org.acme:leaf:1.0"])
        .artifact("org.acme:b:1.0", "acme/rb", &["org.acme:a2:1.0"])
        .artifact("org.acme:a2:1.0", "acme/ra", &[])
        .artifact("org.acme:leaf:1.0", "acme/leaf", &[]);
    project.write_registry(&registry).unwrap();
    project.write_policy(&PolicyFixture::with_roots(&["org.acme:a:1.0"])).unwrap();

    let output = project.run_relgraph(&["order", "--registry", "registry.json"]).unwrap();
    output
        .assert_success()
        .assert_stdout_contains("https://github.com/acme/leaf#1.0")
        .assert_stderr_contains("2 release(s) cannot be ordered")
        .assert_stderr_contains(
            "cycle: https://github.com/acme/ra#1.0 -> https://github.com/acme/rb#1.0 -> https://github.com/acme/ra#1.0",
        );
    assert!(!output.stdout.contains("acme/ra"));

    let output = project
        .run_relgraph(&["order", "--registry", "registry.json", "--format", "json"])
        .unwrap();
    output.assert_success();
    let report = output.json();
    assert_eq!(report["order"], serde_json::json!(["https://github.com/acme/leaf#1.0"]));
    assert_eq!(report["unorderable"].as_array().unwrap().len(), 2);
    assert_eq!(report["cycles"].as_array().unwrap().len(), 1);
}

use relgraph_cli::core::{Diagnostic, RelgraphError};
use relgraph_cli::provider::Dependency;
use relgraph_cli::resolver::ProjectDependencyResolver;
use relgraph_cli::test_utils::{RegistryFixture, coords, release};

use crate::{resolve, rooted_at};

#[test]
fn test_exclude_wins_over_broader_include() {
    let registry = RegistryFixture::new()
        .artifact("com.acme:app:1.0", "acme/app", &["com.acme:foo:1.0", "com.acme:internal-tools:1.0"])
        .artifact("com.acme:foo:1.0", "acme/foo", &[])
        .artifact("com.acme:internal-tools:1.0", "acme/tools", &[])
        .build();
    let mut config = rooted_at(&["com.acme:app:1.0"]);
    config.include_patterns = vec!["com.acme:*".to_string()];
    config.exclude_patterns = vec!["com.acme:internal-*".to_string()];

    let resolution = resolve(&config, &registry);

    assert!(resolution.is_resolved(&coords("com.acme:foo:1.0")));
    assert!(!resolution.is_resolved(&coords("com.acme:internal-tools:1.0")));
    assert!(!resolution.releases.contains(&release("acme/tools", "1.0")));
    assert_eq!(
        resolution.releases.dependencies(&release("acme/app", "1.0")),
        vec![&release("acme/foo", "1.0")]
    );
}

#[test]
fn test_depth_limit_of_one() {
    let registry = RegistryFixture::new()
        .artifact("org.acme:r:1.0", "acme/r", &["org.acme:x:1.0", "org.acme:y:1.0"])
        .artifact("org.acme:x:1.0", "acme/x", &["org.acme:z:1.0"])
        .artifact("org.acme:y:1.0", "acme/y", &[])
        .artifact("org.acme:z:1.0", "acme/z", &[])
        .build();
    let mut config = rooted_at(&["org.acme:r:1.0"]);
    config.level = 1;

    let resolution = resolve(&config, &registry);
    assert!(resolution.is_resolved(&coords("org.acme:x:1.0")));
    assert!(resolution.is_resolved(&coords("org.acme:y:1.0")));
    assert!(!resolution.is_resolved(&coords("org.acme:z:1.0")));
    assert!(resolution.skipped.contains(&coords("org.acme:z:1.0")));
    assert!(resolution.remaining.is_empty());

    config.log_remaining = true;
    let resolution = resolve(&config, &registry);
    assert!(!resolution.is_resolved(&coords("org.acme:z:1.0")));
    assert!(resolution.remaining.contains(&coords("org.acme:z:1.0")));
}

#[test]
fn test_remaining_mode_never_promotes_descendants() {
    let registry = RegistryFixture::new()
        .artifact("org.acme:r:1.0", "acme/r", &["org.acme:x:1.0"])
        .artifact("org.acme:x:1.0", "acme/x", &["org.acme:z:1.0"])
        .artifact("org.acme:z:1.0", "acme/z", &["org.acme:w:1.0"])
        .artifact("org.acme:w:1.0", "acme/w", &[])
        .build();
    let mut config = rooted_at(&["org.acme:r:1.0"]);
    config.level = 1;
    config.log_remaining = true;
    config.include_patterns = vec!["org.acme:w".to_string()];

    let resolution = resolve(&config, &registry);
    assert!(resolution.remaining.contains(&coords("org.acme:z:1.0")));
    assert!(resolution.remaining.contains(&coords("org.acme:w:1.0")));
    assert!(!resolution.is_resolved(&coords("org.acme:w:1.0")));
}

#[test]
fn test_excluded_node_reports_its_subtree_as_remaining() {
    let registry = RegistryFixture::new()
        .artifact("org.acme:r:1.0", "acme/r", &["org.acme:gate:1.0"])
        .artifact("org.acme:gate:1.0", "acme/gate", &["org.acme:behind:1.0"])
        .artifact("org.acme:behind:1.0", "acme/behind", &[])
        .build();
    let mut config = rooted_at(&["org.acme:r:1.0"]);
    config.exclude_patterns = vec!["org.acme:gate".to_string()];

    let resolution = resolve(&config, &registry);
    assert_eq!(resolution.components.len(), 1);
    assert!(resolution.remaining.is_empty());

    config.log_remaining = true;
    let resolution = resolve(&config, &registry);
    assert_eq!(resolution.components.len(), 1);
    assert!(resolution.remaining.contains(&coords("org.acme:behind:1.0")));
    assert!(!resolution.remaining.contains(&coords("org.acme:gate:1.0")));
}

#[test]
fn test_optional_dependencies_need_opt_in() {
    let registry = RegistryFixture::new()
        .artifact_with(
            "org.acme:app:1.0",
            "acme/app",
            vec![Dependency::new(coords("org.acme:extra:1.0")).optional()],
        )
        .artifact("org.acme:extra:1.0", "acme/extra", &[])
        .build();
    let mut config = rooted_at(&["org.acme:app:1.0"]);

    let resolution = resolve(&config, &registry);
    assert!(!resolution.is_resolved(&coords("org.acme:extra:1.0")));

    config.include_patterns = vec!["org.acme:extra".to_string()];
    let resolution = resolve(&config, &registry);
    assert!(resolution.is_resolved(&coords("org.acme:extra:1.0")));

    config.include_patterns.clear();
    config.include_optional_deps = true;
    let resolution = resolve(&config, &registry);
    assert!(resolution.is_resolved(&coords("org.acme:extra:1.0")));
}

#[test]
fn test_test_jars_and_test_scope() {
    let registry = RegistryFixture::new()
        .artifact_with(
            "org.acme:app:1.0",
            "acme/app",
            vec![
                Dependency::new(coords("org.acme:core:tests:1.0")),
                Dependency::new(coords("org.junit:junit:4.13")).with_scope("test"),
            ],
        )
        .artifact("org.acme:core:tests:1.0", "acme/core", &[])
        .artifact("org.junit:junit:4.13", "junit/junit", &[])
        .build();
    let mut config = rooted_at(&["org.acme:app:1.0"]);

    let resolution = resolve(&config, &registry);
    assert!(!resolution.is_resolved(&coords("org.acme:core:tests:1.0")));
    assert!(!resolution.is_resolved(&coords("org.junit:junit:4.13")));

    config.include_test_jars = true;
    let resolution = resolve(&config, &registry);
    assert!(resolution.is_resolved(&coords("org.acme:core:tests:1.0")));
    assert!(!resolution.is_resolved(&coords("org.junit:junit:4.13")));
}

#[test]
fn test_parent_properties_resolve_imports() {
    let registry = RegistryFixture::new()
        .artifact("org.acme:app:1.0", "acme/app", &[])
        .manifest("org.acme:acme-parent:1.0", "acme/parent")
        .manifest("org.other:other-bom::pom:2.0", "other/bom")
        .parent("org.acme:app:1.0", "org.acme:acme-parent:1.0")
        .property("org.acme:acme-parent:1.0", "platform.version", "2.0")
        .import("org.acme:acme-parent:1.0", "org.other", "other-bom", "${platform.version}")
        .import("org.acme:acme-parent:1.0", "org.other", "lost-bom", "${undefined.version}")
        .build();

    let resolution = resolve(&rooted_at(&["org.acme:app:1.0"]), &registry);

    let parent = coords("org.acme:acme-parent::pom:1.0");
    let bom = coords("org.other:other-bom::pom:2.0");
    assert!(resolution.is_resolved(&parent));
    assert!(resolution.is_resolved(&bom));
    assert_eq!(
        resolution.components.node(&coords("org.acme:app:1.0")).and_then(|n| n.parent()),
        Some(&parent)
    );
    assert!(resolution.components.node(&parent).is_some_and(|n| n.imports().contains(&bom)));

    let app = release("acme/app", "1.0");
    let parent_release = release("acme/parent", "1.0");
    assert_eq!(resolution.releases.dependencies(&app), vec![&parent_release]);
    assert_eq!(resolution.releases.dependencies(&parent_release), vec![&release("other/bom", "2.0")]);

    assert!(resolution.diagnostics.iter().any(|d| matches!(
        d,
        Diagnostic::UnresolvedImport { manifest, .. } if *manifest == parent
    )));
}

#[test]
fn test_excluded_parent_stops_the_ancestry() {
    let registry = RegistryFixture::new()
        .artifact("org.acme:app:1.0", "acme/app", &[])
        .manifest("org.acme:acme-parent:1.0", "acme/parent")
        .manifest("org.acme:acme-root:1.0", "acme/root")
        .parent("org.acme:app:1.0", "org.acme:acme-parent:1.0")
        .parent("org.acme:acme-parent:1.0", "org.acme:acme-root:1.0")
        .build();
    let mut config = rooted_at(&["org.acme:app:1.0"]);
    config.exclude_patterns = vec!["org.acme:acme-parent".to_string()];

    let resolution = resolve(&config, &registry);
    assert!(!resolution.is_resolved(&coords("org.acme:acme-parent::pom:1.0")));
    assert!(!resolution.is_resolved(&coords("org.acme:acme-root::pom:1.0")));
    assert_eq!(resolution.releases.len(), 1);
}

#[test]
fn test_bom_selects_project_roots() {
    let registry = RegistryFixture::new()
        .bom(
            "org.acme.platform:platform-bom::pom:1.0",
            "acme/platform",
            &[
                "org.acme.platform:core:1.0",
                "org.acme.platform:api:1.0",
                "org.acme:tools:1.0",
                "com.google:guava:30.0",
            ],
        )
        .artifact(
            "org.acme.platform:core:1.0",
            "acme/platform",
            &["com.google:guava:30.0", "org.other:lib:1.0"],
        )
        .artifact("org.acme.platform:api:1.0", "acme/platform", &[])
        .artifact("com.google:guava:30.0", "google/guava", &[])
        .artifact("org.other:lib:1.0", "other/lib", &[])
        .build();
    let config = relgraph_cli::config::ResolverConfig {
        project_bom: Some(coords("org.acme.platform:platform-bom::pom:1.0")),
        include_non_managed: false,
        log_non_managed_visited: true,
        ..Default::default()
    };

    let resolution = resolve(&config, &registry);

    assert_eq!(resolution.roots.len(), 3);
    assert!(resolution.roots.contains(&coords("org.acme.platform:platform-bom::pom:1.0")));
    assert!(resolution.roots.contains(&coords("org.acme.platform:core:1.0")));
    assert!(resolution.roots.contains(&coords("org.acme.platform:api:1.0")));
    assert!(!resolution.roots.contains(&coords("com.google:guava:30.0")));
    assert!(!resolution.roots.contains(&coords("org.acme:tools:1.0")));

    assert!(resolution.is_resolved(&coords("com.google:guava:30.0")));
    assert!(!resolution.is_resolved(&coords("org.other:lib:1.0")));
    assert!(resolution.skipped.contains(&coords("org.other:lib:1.0")));
    assert!(resolution.non_managed_visited.contains(&coords("org.other:lib:1.0")));

    let platform = release("acme/platform", "1.0");
    assert_eq!(resolution.releases.len(), 2);
    assert_eq!(resolution.releases.dependencies(&platform), vec![&release("google/guava", "30.0")]);
}

#[test]
fn test_root_must_pass_the_acceptance_rule() {
    let registry = RegistryFixture::new()
        .bom("org.acme.platform:bom::pom:1.0", "acme/platform", &["org.acme.platform:core:1.0"])
        .artifact("org.acme:app:1.0", "acme/app", &["org.acme.platform:core:1.0"])
        .artifact("org.acme.platform:core:1.0", "acme/platform", &[])
        .build();
    let mut config = rooted_at(&["org.acme:app:1.0"]);
    config.project_bom = Some(coords("org.acme.platform:bom::pom:1.0"));
    config.include_non_managed = false;

    let resolution = resolve(&config, &registry);
    assert!(resolution.roots.contains(&coords("org.acme:app:1.0")));
    assert!(!resolution.is_resolved(&coords("org.acme:app:1.0")));
    assert!(resolution.skipped.contains(&coords("org.acme:app:1.0")));
    assert!(!resolution.is_resolved(&coords("org.acme.platform:core:1.0")));
    assert!(resolution.is_resolved(&coords("org.acme.platform:bom::pom:1.0")));
    assert!(!resolution.releases.contains(&release("acme/app", "1.0")));

    config.log_remaining = true;
    let resolution = resolve(&config, &registry);
    assert!(!resolution.is_resolved(&coords("org.acme:app:1.0")));
    assert!(resolution.remaining.contains(&coords("org.acme:app:1.0")));
    assert!(resolution.remaining.contains(&coords("org.acme.platform:core:1.0")));
    assert!(!resolution.is_resolved(&coords("org.acme.platform:core:1.0")));

    config.include_patterns = vec!["org.acme:app".to_string()];
    let resolution = resolve(&config, &registry);
    assert!(resolution.is_resolved(&coords("org.acme:app:1.0")));
    assert!(resolution.is_resolved(&coords("org.acme.platform:core:1.0")));
}

#[test]
fn test_no_roots_is_an_invalid_policy() {
    let registry = RegistryFixture::new().build();
    let config = relgraph_cli::config::ResolverConfig::default();
    let result = ProjectDependencyResolver::new(&config, &registry, &registry)
        .and_then(ProjectDependencyResolver::resolve);
    assert!(matches!(result, Err(RelgraphError::InvalidPolicy { .. })));
}

#[test]
fn test_unavailable_tree_aborts_or_warns() {
    let registry = RegistryFixture::new()
        .artifact("org.acme:broken:1.0", "acme/broken", &["org.acme:gone:1.0"])
        .unavailable("org.acme:gone:1.0", "checksum mismatch")
        .artifact("org.acme:good:1.0", "acme/good", &[])
        .build();
    let mut config = rooted_at(&["org.acme:broken:1.0", "org.acme:good:1.0"]);

    let result = ProjectDependencyResolver::new(&config, &registry, &registry)
        .and_then(ProjectDependencyResolver::resolve);
    match result {
        Err(RelgraphError::ResolutionFailed {
            coords: failed,
            root,
            ..
        }) => {
            assert_eq!(failed, coords("org.acme:gone:1.0"));
            assert_eq!(root, Some(coords("org.acme:broken:1.0")));
        }
        other => panic!("expected a resolution failure, got {other:?}"),
    }

    config.warn_on_resolution_errors = true;
    let resolution = resolve(&config, &registry);
    assert!(resolution.is_resolved(&coords("org.acme:good:1.0")));
    assert!(resolution.diagnostics.iter().any(|d| matches!(
        d,
        Diagnostic::ResolutionFailure { root: Some(root), .. } if *root == coords("org.acme:broken:1.0")
    )));
}

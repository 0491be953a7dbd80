use relgraph_cli::test_utils::{RegistryFixture, coords, release};

use crate::{resolve, rooted_at};

#[test]
fn test_dependencies_come_first() {
    let registry = RegistryFixture::new()
        .artifact("org.acme:a:1.0", "acme/a", &["org.acme:b:1.0"])
        .artifact("org.acme:b:1.0", "acme/b", &["org.acme:c:1.0"])
        .artifact("org.acme:c:1.0", "acme/c", &[])
        .build();

    let resolution = resolve(&rooted_at(&["org.acme:a:1.0"]), &registry);
    let order = resolution.build_order();

    assert!(order.is_complete());
    assert_eq!(
        order.ordered,
        vec![release("acme/c", "1.0"), release("acme/b", "1.0"), release("acme/a", "1.0")]
    );
    assert_eq!(resolution.releases.roots(), vec![&release("acme/a", "1.0")]);
}

#[test]
fn test_cycle_is_reported_once_and_left_unordered() {
    // a -> b -> c -> a2, where a and a2 share a release
    let registry = RegistryFixture::new()
        .artifact("org.acme:a:1.0", "acme/ra", &["org.acme:b:1.0", "org.acme:leaf:1.0"])
        .artifact("org.acme:b:1.0", "acme/rb", &["org.acme:c:1.0"])
        .artifact("org.acme:c:1.0", "acme/rc", &["org.acme:a2:1.0"])
        .artifact("org.acme:a2:1.0", "acme/ra", &[])
        .artifact("org.acme:leaf:1.0", "acme/leaf", &[])
        .build();

    let resolution = resolve(&rooted_at(&["org.acme:a:1.0"]), &registry);

    assert!(resolution.has_cycles());
    assert_eq!(
        resolution.cycles,
        vec![vec![release("acme/ra", "1.0"), release("acme/rb", "1.0"), release("acme/rc", "1.0")]]
    );

    let order = resolution.build_order();
    assert!(!order.is_complete());
    assert_eq!(order.ordered, vec![release("acme/leaf", "1.0")]);
    assert_eq!(order.unorderable.len(), 3);
    assert!(order.unorderable.contains(&release("acme/rb", "1.0")));
}

#[test]
fn test_no_release_depends_on_itself() {
    let registry = RegistryFixture::new()
        .artifact("org.acme:app:1.0", "acme/mono", &["org.acme:core:1.0"])
        .artifact("org.acme:core:1.0", "acme/mono", &[])
        .build();

    let resolution = resolve(&rooted_at(&["org.acme:app:1.0"]), &registry);
    let mono = release("acme/mono", "1.0");

    assert_eq!(resolution.releases.len(), 1);
    assert_eq!(resolution.releases.edge_count(), 0);
    assert!(resolution.releases.dependencies(&mono).is_empty());
    assert!(resolution.releases.dependants(&mono).is_empty());
    assert!(!resolution.has_cycles());
}

#[test]
fn test_already_built_release_is_pruned_with_its_edges() {
    let registry = RegistryFixture::new()
        .artifact("org.acme:app:1.0", "acme/app", &["org.acme:lib:1.0.redhat-00001", "org.acme:util:1.0"])
        .artifact("org.acme:lib:1.0.redhat-00001", "acme/lib", &[])
        .artifact("org.acme:util:1.0", "acme/util", &[])
        .build();
    let mut config = rooted_at(&["org.acme:app:1.0"]);

    let resolution = resolve(&config, &registry);
    let lib = coords("org.acme:lib:1.0.redhat-00001");
    let lib_release = release("acme/lib", "1.0.redhat-00001");

    assert_eq!(resolution.already_built, vec![lib.clone()]);
    assert!(!resolution.is_resolved(&lib));
    assert!(!resolution.releases.contains(&lib_release));
    assert_eq!(
        resolution.releases.dependencies(&release("acme/app", "1.0")),
        vec![&release("acme/util", "1.0")]
    );
    for node in resolution.releases.releases() {
        for dependency in resolution.releases.dependencies(node.id()) {
            assert!(resolution.releases.contains(dependency));
        }
    }

    config.include_already_built = true;
    let resolution = resolve(&config, &registry);
    assert!(resolution.already_built.is_empty());
    assert!(resolution.releases.contains(&lib_release));
}

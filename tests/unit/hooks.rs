use std::cell::RefCell;
use std::rc::Rc;

use relgraph_cli::core::{ArtifactCoords, ReleaseId};
use relgraph_cli::provider::RemoteRepository;
use relgraph_cli::release_id::{DetectionError, ReleaseIdDetector, SCM_FALLBACK, ScmMetadataReader};
use relgraph_cli::resolver::{DependencyTreeVisitor, ProjectDependencyResolver, ResolvedComponent};
use relgraph_cli::test_utils::{RegistryFixture, coords, release};

use crate::rooted_at;

/// Puts every `org.vendor` artifact into one vendor release.
struct VendorDetector;

impl ReleaseIdDetector for VendorDetector {
    fn name(&self) -> &str {
        "vendor"
    }

    fn detect(
        &self,
        _scm: &ScmMetadataReader<'_>,
        coords: &ArtifactCoords,
        _repositories: &[RemoteRepository],
    ) -> Result<Option<ReleaseId>, DetectionError> {
        if coords.group_id() != "org.vendor" {
            return Ok(None);
        }
        Ok(Some(ReleaseId::for_scm_and_tag("https://git.vendor.example/platform", "v7")))
    }
}

#[derive(Clone, Default)]
struct Recorder {
    events: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    fn record(&self, event: &str, component: &ResolvedComponent) {
        self.events
            .borrow_mut()
            .push(format!("{event} {}", component.coords().artifact_id()));
    }
}

impl DependencyTreeVisitor for Recorder {
    fn before_all_roots(&mut self) {
        self.events.borrow_mut().push("start".to_string());
    }

    fn after_all_roots(&mut self) {
        self.events.borrow_mut().push("end".to_string());
    }

    fn enter_root_artifact(&mut self, component: &ResolvedComponent) {
        self.record("root", component);
    }

    fn leave_root_artifact(&mut self, component: &ResolvedComponent) {
        self.record("/root", component);
    }

    fn enter_dependency(&mut self, component: &ResolvedComponent) {
        self.record("dep", component);
    }

    fn leave_dependency(&mut self, component: &ResolvedComponent) {
        self.record("/dep", component);
    }

    fn enter_parent_manifest(&mut self, component: &ResolvedComponent) {
        self.record("parent", component);
    }

    fn leave_parent_manifest(&mut self, component: &ResolvedComponent) {
        self.record("/parent", component);
    }
}

#[test]
fn test_custom_detector_runs_before_scm_fallback() {
    let registry = RegistryFixture::new()
        .artifact("org.acme:app:1.0", "acme/app", &["org.vendor:engine:7.0", "org.vendor:codec:7.1"])
        .artifact("org.vendor:engine:7.0", "vendor/engine", &[])
        .artifact("org.vendor:codec:7.1", "vendor/codec", &[])
        .build();
    let config = rooted_at(&["org.acme:app:1.0"]);

    let mut resolver = ProjectDependencyResolver::new(&config, &registry, &registry).unwrap();
    resolver.add_detector(Box::new(VendorDetector));
    let resolution = resolver.resolve().unwrap();

    let vendor = ReleaseId::for_scm_and_tag("https://git.vendor.example/platform", "v7");
    assert_eq!(resolution.release_of(&coords("org.vendor:engine:7.0")), Some(&vendor));
    assert_eq!(resolution.release_of(&coords("org.vendor:codec:7.1")), Some(&vendor));
    assert_eq!(resolution.releases.len(), 2);
    assert_eq!(resolution.releases.dependencies(&release("acme/app", "1.0")), vec![&vendor]);

    let stats = &resolution.detection_stats;
    assert_eq!(stats.attempted, 3);
    assert_eq!(stats.succeeded, 3);
    assert_eq!(stats.by_detector.get("vendor"), Some(&2));
    assert_eq!(stats.by_detector.get(SCM_FALLBACK), Some(&1));
}

#[test]
fn test_visitor_sees_the_walk_in_order() {
    let registry = RegistryFixture::new()
        .artifact("org.acme:app:1.0", "acme/app", &["org.acme:lib:1.0"])
        .artifact("org.acme:lib:1.0", "acme/lib", &[])
        .manifest("org.acme:acme-parent:1.0", "acme/parent")
        .parent("org.acme:app:1.0", "org.acme:acme-parent:1.0")
        .build();
    let config = rooted_at(&["org.acme:app:1.0"]);
    let recorder = Recorder::default();

    let mut resolver = ProjectDependencyResolver::new(&config, &registry, &registry).unwrap();
    resolver.add_visitor(Box::new(recorder.clone()));
    resolver.resolve().unwrap();

    let events = recorder.events.borrow();
    assert_eq!(
        *events,
        vec![
            "start",
            "root app",
            "parent acme-parent",
            "/parent acme-parent",
            "dep lib",
            "/dep lib",
            "/root app",
            "end",
        ]
    );
}

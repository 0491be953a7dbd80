//! Builders for registry snapshots and policy files.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{ArtifactCoords, ReleaseId};
use crate::provider::registry::{ArtifactEntry, RegistrySnapshot};
use crate::provider::{Dependency, DependencyDeclaration, Model, ParentRef, RemoteRepository, Scm};

/// Parse coordinates, panicking on malformed test input.
pub fn coords(s: &str) -> ArtifactCoords {
    s.parse().unwrap_or_else(|e| panic!("invalid test coordinates {s}: {e}"))
}

/// Release of a fixture artifact published from `repo` at `tag`.
pub fn release(repo: &str, tag: &str) -> ReleaseId {
    ReleaseId::for_scm_and_tag(format!("https://github.com/{repo}"), tag)
}

fn scm(repo: &str, tag: &str) -> Scm {
    Scm {
        url: Some(format!("https://github.com/{repo}")),
        connection: None,
        tag: Some(tag.to_string()),
    }
}

/// Builder for [`RegistrySnapshot`]s.
///
/// Every artifact is published from a GitHub repository and tagged with its
/// version, so `release(repo, version)` is its expected release.
#[derive(Debug, Clone)]
pub struct RegistryFixture {
    registry: RegistrySnapshot,
}

impl Default for RegistryFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryFixture {
    pub fn new() -> Self {
        let mut registry = RegistrySnapshot::new();
        registry.add_default_repository(RemoteRepository::new(
            "central",
            "https://repo.example.org/maven2",
        ));
        Self {
            registry,
        }
    }

    fn publish(&mut self, artifact: &ArtifactCoords, repo: &str) {
        self.registry.add_model(
            artifact.clone(),
            Model {
                scm: Some(scm(repo, artifact.version())),
                ..Model::default()
            },
        );
    }

    /// Artifact with plain compile dependencies.
    #[must_use]
    pub fn artifact(self, artifact: &str, repo: &str, dependencies: &[&str]) -> Self {
        let deps = dependencies.iter().map(|d| Dependency::new(coords(d))).collect();
        self.artifact_with(artifact, repo, deps)
    }

    /// Artifact with fully specified dependencies.
    #[must_use]
    pub fn artifact_with(mut self, artifact: &str, repo: &str, dependencies: Vec<Dependency>) -> Self {
        let artifact = coords(artifact);
        let mut entry = ArtifactEntry::new(artifact.clone());
        entry.dependencies = dependencies;
        self.registry.add_artifact(entry);
        self.publish(&artifact, repo);
        self
    }

    /// Constraint manifest managing `managed`.
    #[must_use]
    pub fn bom(mut self, bom: &str, repo: &str, managed: &[&str]) -> Self {
        let bom = coords(bom);
        let mut entry = ArtifactEntry::new(bom.clone());
        entry.managed_dependencies = managed.iter().map(|d| Dependency::new(coords(d))).collect();
        self.registry.add_artifact(entry);
        self.publish(&bom, repo);
        self
    }

    /// Manifest known only by its descriptor, e.g. a parent.
    #[must_use]
    pub fn manifest(mut self, manifest: &str, repo: &str) -> Self {
        self.publish(&coords(manifest), repo);
        self
    }

    /// Declare `parent` (`group:name:version`) as the parent of `child`'s manifest.
    #[must_use]
    pub fn parent(mut self, child: &str, parent: &str) -> Self {
        let parent = coords(parent);
        self.update_model(child, |model| {
            model.parent = Some(ParentRef {
                group_id: parent.group_id().to_string(),
                artifact_id: parent.artifact_id().to_string(),
                version: parent.version().to_string(),
            });
        });
        self
    }

    /// Add an `import`-scoped constraint manifest declaration to `manifest`.
    #[must_use]
    pub fn import(mut self, manifest: &str, group_id: &str, artifact_id: &str, version: &str) -> Self {
        self.update_model(manifest, |model| {
            model.dependency_management.push(DependencyDeclaration {
                group_id: group_id.to_string(),
                artifact_id: artifact_id.to_string(),
                version: version.to_string(),
                classifier: String::new(),
                artifact_type: crate::core::TYPE_POM.to_string(),
                scope: Some("import".to_string()),
            });
        });
        self
    }

    #[must_use]
    pub fn property(mut self, manifest: &str, name: &str, value: &str) -> Self {
        self.update_model(manifest, |model| {
            model.properties.insert(name.to_string(), value.to_string());
        });
        self
    }

    /// Drop the `scm` block of `artifact`'s manifest.
    #[must_use]
    pub fn without_scm(mut self, artifact: &str) -> Self {
        self.update_model(artifact, |model| model.scm = None);
        self
    }

    /// Mark `artifact` as known but unresolvable.
    #[must_use]
    pub fn unavailable(mut self, artifact: &str, reason: &str) -> Self {
        let artifact = coords(artifact);
        let mut entry = ArtifactEntry::new(artifact);
        entry.unavailable = Some(reason.to_string());
        self.registry.add_artifact(entry);
        self
    }

    fn update_model(&mut self, artifact: &str, update: impl FnOnce(&mut Model)) {
        let manifest = coords(artifact).to_manifest();
        let mut model = crate::provider::DescriptorReader::read_model(&self.registry, &manifest)
            .unwrap_or_default();
        update(&mut model);
        self.registry.add_model(manifest, model);
    }

    pub fn build(self) -> RegistrySnapshot {
        self.registry
    }

    /// Write the snapshot as JSON into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join("registry.json");
        fs::write(&path, self.registry.to_json()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// Sample policy files.
#[derive(Clone, Debug)]
pub struct PolicyFixture {
    pub content: String,
}

impl PolicyFixture {
    pub fn new(content: &str) -> Self {
        Self {
            content: content.trim().to_string(),
        }
    }

    /// Roots given explicitly, everything else default.
    pub fn with_roots(roots: &[&str]) -> Self {
        let list: Vec<String> = roots.iter().map(|r| format!("\"{r}\"")).collect();
        Self::new(&format!("project-artifacts = [{}]", list.join(", ")))
    }

    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join("relgraph.toml");
        fs::write(&path, &self.content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

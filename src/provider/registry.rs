//! File-backed registry snapshot.
//!
//! A snapshot is a pre-fetched description of every artifact the resolver may
//! visit: its repositories, declared and managed dependencies, and the raw
//! build descriptors of manifests. It can be written as JSON, YAML or TOML.
//!
//! ```json
//! {
//!   "repositories": [{ "id": "central", "url": "https://repo.example.org/maven2" }],
//!   "artifacts": [
//!     {
//!       "coords": "org.acme:app:1.0",
//!       "dependencies": [
//!         { "coords": "org.acme:core:1.0" },
//!         { "coords": "org.junit:junit:4.13", "scope": "test" }
//!       ]
//!     },
//!     { "coords": "org.acme:core:1.0" }
//!   ],
//!   "descriptors": [
//!     {
//!       "coords": "org.acme:app::pom:1.0",
//!       "parent": { "group-id": "org.acme", "artifact-id": "parent", "version": "1.0" },
//!       "scm": { "url": "https://github.com/acme/app", "tag": "app-1.0" }
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tokio::fs;
use tracing::debug;

use super::{
    ArtifactDescriptor, Dependency, DependencyTree, DependencyTreeProvider, DescriptorReader,
    ManagedConstraints, Model, ProviderError, RemoteRepository,
};
use crate::core::{ArtifactCoords, RelgraphError};

/// Serialization format of a snapshot document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
    Toml,
}

impl SnapshotFormat {
    /// Format implied by a file extension; JSON when unknown.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            Some("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// One artifact of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ArtifactEntry {
    pub coords: ArtifactCoords,
    /// Repositories the artifact was found in; the snapshot default when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<RemoteRepository>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub managed_dependencies: Vec<Dependency>,
    /// Set when the artifact is known but cannot be resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unavailable: Option<String>,
}

impl ArtifactEntry {
    pub fn new(coords: ArtifactCoords) -> Self {
        Self {
            coords,
            repositories: Vec::new(),
            dependencies: Vec::new(),
            managed_dependencies: Vec::new(),
            unavailable: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DescriptorEntry {
    coords: ArtifactCoords,
    #[serde(flatten)]
    model: Model,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SnapshotDocument {
    #[serde(default)]
    repositories: Vec<RemoteRepository>,
    #[serde(default)]
    artifacts: Vec<ArtifactEntry>,
    #[serde(default)]
    descriptors: Vec<DescriptorEntry>,
}

/// In-memory registry implementing both collaborator traits.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    default_repositories: Vec<RemoteRepository>,
    artifacts: BTreeMap<ArtifactCoords, ArtifactEntry>,
    models: BTreeMap<ArtifactCoords, Model>,
}

impl RegistrySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot, picking the format from the file extension.
    pub async fn load(path: &Path) -> Result<Self, RelgraphError> {
        let content = fs::read_to_string(path).await?;
        let snapshot = Self::parse(&content, SnapshotFormat::from_path(path)).map_err(|e| {
            RelgraphError::RegistryParseError {
                file: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        debug!(
            "Loaded registry snapshot {} ({} artifacts, {} descriptors)",
            path.display(),
            snapshot.artifacts.len(),
            snapshot.models.len()
        );
        Ok(snapshot)
    }

    pub fn parse(content: &str, format: SnapshotFormat) -> Result<Self, RelgraphError> {
        let document: SnapshotDocument = match format {
            SnapshotFormat::Json => serde_json::from_str(content)?,
            SnapshotFormat::Yaml => serde_yaml::from_str(content)?,
            SnapshotFormat::Toml => toml::from_str(content)?,
        };
        let mut snapshot = Self::new();
        snapshot.default_repositories = document.repositories;
        for entry in document.artifacts {
            snapshot.add_artifact(entry);
        }
        for entry in document.descriptors {
            snapshot.add_model(entry.coords, entry.model);
        }
        Ok(snapshot)
    }

    /// Serialize the snapshot as pretty JSON.
    pub fn to_json(&self) -> Result<String, RelgraphError> {
        let document = SnapshotDocument {
            repositories: self.default_repositories.clone(),
            artifacts: self.artifacts.values().cloned().collect(),
            descriptors: self
                .models
                .iter()
                .map(|(coords, model)| DescriptorEntry {
                    coords: coords.clone(),
                    model: model.clone(),
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    pub fn add_default_repository(&mut self, repository: RemoteRepository) {
        self.default_repositories.push(repository);
    }

    pub fn add_artifact(&mut self, entry: ArtifactEntry) {
        self.artifacts.insert(entry.coords.clone(), entry);
    }

    /// Register the raw descriptor of a manifest.
    pub fn add_model(&mut self, coords: ArtifactCoords, model: Model) {
        self.models.insert(coords.to_manifest(), model);
    }

    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    fn entry(&self, coords: &ArtifactCoords) -> Option<&ArtifactEntry> {
        self.artifacts.get(coords)
    }

    /// Entry describing the manifest of `coords`: the manifest's own entry,
    /// else the binary sharing its group, name and version.
    fn descriptor_entry(&self, coords: &ArtifactCoords) -> Option<&ArtifactEntry> {
        let manifest = coords.to_manifest();
        self.artifacts.get(coords).or_else(|| self.artifacts.get(&manifest)).or_else(|| {
            self.artifacts
                .values()
                .find(|e| e.coords.classifier().is_empty() && e.coords.to_manifest() == manifest)
        })
    }

    fn repositories_of(&self, entry: Option<&ArtifactEntry>) -> Vec<RemoteRepository> {
        match entry {
            Some(entry) if !entry.repositories.is_empty() => entry.repositories.clone(),
            _ => self.default_repositories.clone(),
        }
    }

    fn check_available(entry: &ArtifactEntry) -> Result<(), ProviderError> {
        match &entry.unavailable {
            Some(reason) => Err(ProviderError::Unavailable {
                coords: entry.coords.clone(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn collect_node(
        &self,
        coords: &ArtifactCoords,
        optional: bool,
        depth: usize,
        constraints: &ManagedConstraints,
        excluded_scopes: &BTreeSet<String>,
        path: &mut Vec<ArtifactCoords>,
    ) -> Result<DependencyTree, ProviderError> {
        let entry = match self.entry(coords) {
            Some(entry) => {
                Self::check_available(entry)?;
                Some(entry)
            }
            None if coords.is_manifest() && self.models.contains_key(coords) => None,
            None => {
                return Err(ProviderError::NotFound {
                    coords: coords.clone(),
                });
            }
        };

        let mut node = DependencyTree {
            coords: coords.clone(),
            repositories: self.repositories_of(entry),
            optional,
            children: Vec::new(),
        };
        let Some(entry) = entry else {
            return Ok(node);
        };

        path.push(coords.clone());
        for dep in &entry.dependencies {
            if excluded_scopes.contains(&dep.scope) {
                continue;
            }
            // Optional dependencies are only visible from the root.
            if dep.optional && depth > 0 {
                continue;
            }
            let child = constraints.constrain(&dep.coords).unwrap_or(&dep.coords).clone();
            if path.contains(&child) {
                debug!("Skipping {} already on the path to {}", child, coords);
                continue;
            }
            let subtree = self.collect_node(
                &child,
                dep.optional,
                depth + 1,
                constraints,
                excluded_scopes,
                path,
            );
            match subtree {
                Ok(subtree) => node.children.push(subtree),
                Err(e) => {
                    path.pop();
                    return Err(e);
                }
            }
        }
        path.pop();
        Ok(node)
    }
}

impl DependencyTreeProvider for RegistrySnapshot {
    fn collect(
        &self,
        root: &ArtifactCoords,
        constraints: &ManagedConstraints,
        excluded_scopes: &BTreeSet<String>,
    ) -> Result<DependencyTree, ProviderError> {
        let mut path = Vec::new();
        self.collect_node(root, false, 0, constraints, excluded_scopes, &mut path)
    }

    fn resolve_descriptor(
        &self,
        coords: &ArtifactCoords,
    ) -> Result<ArtifactDescriptor, ProviderError> {
        match self.descriptor_entry(coords) {
            Some(entry) => {
                Self::check_available(entry)?;
                Ok(ArtifactDescriptor {
                    dependencies: entry.dependencies.clone(),
                    managed_dependencies: entry.managed_dependencies.clone(),
                })
            }
            None if self.models.contains_key(&coords.to_manifest()) => {
                Ok(ArtifactDescriptor::default())
            }
            None => Err(ProviderError::NotFound {
                coords: coords.clone(),
            }),
        }
    }
}

impl DescriptorReader for RegistrySnapshot {
    fn read_model(&self, manifest: &ArtifactCoords) -> Result<Model, ProviderError> {
        let manifest = manifest.to_manifest();
        if let Some(entry) = self.artifacts.get(&manifest) {
            Self::check_available(entry)?;
        }
        self.models.get(&manifest).cloned().ok_or(ProviderError::NotFound {
            coords: manifest,
        })
    }
}

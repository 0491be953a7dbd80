//! Collaborators that supply raw dependency data to the resolver.
//!
//! The resolver never talks to a package registry directly. It consumes two
//! narrow traits:
//!
//! - [`DependencyTreeProvider`] collects the raw dependency tree of a root
//!   under a set of enforced constraints, and resolves artifact descriptors
//!   (direct and managed dependencies).
//! - [`DescriptorReader`] reads the raw build descriptor [`Model`] of a
//!   manifest: parent, properties, profiles, managed imports and `scm` block.
//!
//! [`registry::RegistrySnapshot`] implements both over a pre-fetched document.

pub mod registry;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

use crate::core::{ArtifactCoords, TYPE_JAR};

/// Failure reported by a collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The coordinate is not known to the provider.
    #[error("{coords} was not found")]
    NotFound { coords: ArtifactCoords },

    /// The coordinate is known but its data could not be produced.
    #[error("{coords} could not be resolved: {reason}")]
    Unavailable { coords: ArtifactCoords, reason: String },
}

impl ProviderError {
    pub fn coords(&self) -> &ArtifactCoords {
        match self {
            Self::NotFound { coords } | Self::Unavailable { coords, .. } => coords,
        }
    }
}

/// A remote repository an artifact can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RemoteRepository {
    pub id: String,
    pub url: String,
}

impl RemoteRepository {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

impl fmt::Display for RemoteRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.url)
    }
}

fn default_scope() -> String {
    "compile".to_string()
}

fn is_compile_scope(scope: &str) -> bool {
    scope == "compile"
}

/// A declared dependency with resolved coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub coords: ArtifactCoords,
    #[serde(default = "default_scope", skip_serializing_if = "is_compile_scope")]
    pub scope: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

impl Dependency {
    pub fn new(coords: ArtifactCoords) -> Self {
        Self {
            coords,
            scope: default_scope(),
            optional: false,
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// A node of a collected raw dependency tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyTree {
    pub coords: ArtifactCoords,
    pub repositories: Vec<RemoteRepository>,
    pub optional: bool,
    pub children: Vec<DependencyTree>,
}

impl DependencyTree {
    pub fn leaf(coords: ArtifactCoords) -> Self {
        Self {
            coords,
            repositories: Vec::new(),
            optional: false,
            children: Vec::new(),
        }
    }

    /// Number of nodes in the tree, including this one.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Self::size).sum::<usize>()
    }
}

/// Result of resolving an artifact descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    pub dependencies: Vec<Dependency>,
    pub managed_dependencies: Vec<Dependency>,
}

/// Version constraints enforced while collecting trees.
///
/// Keyed by group, name, classifier and type. The first constraint for a key
/// wins, so earlier manifests take precedence over later ones.
#[derive(Debug, Clone, Default)]
pub struct ManagedConstraints {
    by_key: BTreeMap<(String, String, String, String), ArtifactCoords>,
    exact: BTreeSet<ArtifactCoords>,
}

impl ManagedConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend<'a>(&mut self, dependencies: impl IntoIterator<Item = &'a Dependency>) {
        for dep in dependencies {
            let (g, a, c, t) = dep.coords.versionless_key();
            self.by_key
                .entry((g.to_string(), a.to_string(), c.to_string(), t.to_string()))
                .or_insert_with(|| dep.coords.clone());
            self.exact.insert(dep.coords.clone());
        }
    }

    /// The enforced version of `coords`, ignoring its own version.
    pub fn constrain(&self, coords: &ArtifactCoords) -> Option<&ArtifactCoords> {
        let (g, a, c, t) = coords.versionless_key();
        self.by_key.get(&(g.to_string(), a.to_string(), c.to_string(), t.to_string()))
    }

    /// Whether exactly these coordinates are governed by a constraint.
    pub fn is_managed(&self, coords: &ArtifactCoords) -> bool {
        self.exact.contains(coords)
    }

    /// All constrained coordinates, in order.
    pub fn iter(&self) -> impl Iterator<Item = &ArtifactCoords> {
        self.exact.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }
}

/// Parent reference of a build descriptor. The version may be an expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

/// A profile of a build descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Profile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub active_by_default: bool,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// A raw managed dependency declaration; every field may be an expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DependencyDeclaration {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub classifier: String,
    #[serde(default = "default_declaration_type", rename = "type")]
    pub artifact_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

fn default_declaration_type() -> String {
    TYPE_JAR.to_string()
}

impl DependencyDeclaration {
    /// Whether this declaration imports another constraint manifest.
    pub fn is_manifest_import(&self) -> bool {
        self.scope.as_deref() == Some("import") && self.artifact_type == crate::core::TYPE_POM
    }
}

impl fmt::Display for DependencyDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.group_id, self.artifact_id, self.classifier, self.artifact_type, self.version
        )
    }
}

/// The `scm` block of a build descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Scm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Raw build descriptor of a manifest.
///
/// Values are as declared: nothing is inherited or interpolated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Model {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<Profile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependency_management: Vec<DependencyDeclaration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm: Option<Scm>,
}

/// Source of raw dependency trees and artifact descriptors.
pub trait DependencyTreeProvider {
    /// Collect the dependency tree of `root`.
    ///
    /// Dependencies matching a constraint take the constrained version.
    /// Dependencies in `excluded_scopes` are dropped with their subtrees.
    fn collect(
        &self,
        root: &ArtifactCoords,
        constraints: &ManagedConstraints,
        excluded_scopes: &BTreeSet<String>,
    ) -> Result<DependencyTree, ProviderError>;

    /// Direct and managed dependencies declared by the descriptor of `coords`.
    fn resolve_descriptor(&self, coords: &ArtifactCoords)
    -> Result<ArtifactDescriptor, ProviderError>;
}

/// Reader of raw build descriptors.
pub trait DescriptorReader {
    fn read_model(&self, manifest: &ArtifactCoords) -> Result<Model, ProviderError>;
}

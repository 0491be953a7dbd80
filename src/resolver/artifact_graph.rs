//! Accepted components and the structural edges between them.
//!
//! Each accepted coordinate owns exactly one [`ComponentNode`] in the
//! [`ArtifactGraph`] arena. Nodes reference each other by coordinate, never
//! by pointer, so removing a node is a matter of dropping its entry and
//! scrubbing the coordinate from the remaining edge sets.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::core::{ArtifactCoords, ReleaseId};
use crate::provider::RemoteRepository;

/// A coordinate accepted for rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedComponent {
    coords: ArtifactCoords,
    release_id: ReleaseId,
    repositories: BTreeSet<RemoteRepository>,
    managed: bool,
}

impl ResolvedComponent {
    pub fn new(
        coords: ArtifactCoords,
        release_id: ReleaseId,
        repositories: &[RemoteRepository],
        managed: bool,
    ) -> Self {
        Self {
            coords,
            release_id,
            repositories: repositories.iter().cloned().collect(),
            managed,
        }
    }

    pub fn coords(&self) -> &ArtifactCoords {
        &self.coords
    }

    pub fn release_id(&self) -> &ReleaseId {
        &self.release_id
    }

    pub fn repositories(&self) -> &BTreeSet<RemoteRepository> {
        &self.repositories
    }

    /// Whether the version is governed by an enforced constraint manifest.
    pub fn is_managed(&self) -> bool {
        self.managed
    }

    pub(crate) fn repository_list(&self) -> Vec<RemoteRepository> {
        self.repositories.iter().cloned().collect()
    }
}

/// A component with its outgoing structural edges.
#[derive(Debug, Clone)]
pub struct ComponentNode {
    component: ResolvedComponent,
    children: BTreeSet<ArtifactCoords>,
    imports: BTreeSet<ArtifactCoords>,
    parent: Option<ArtifactCoords>,
}

impl ComponentNode {
    fn new(component: ResolvedComponent) -> Self {
        Self {
            component,
            children: BTreeSet::new(),
            imports: BTreeSet::new(),
            parent: None,
        }
    }

    pub fn component(&self) -> &ResolvedComponent {
        &self.component
    }

    pub fn children(&self) -> &BTreeSet<ArtifactCoords> {
        &self.children
    }

    pub fn imports(&self) -> &BTreeSet<ArtifactCoords> {
        &self.imports
    }

    pub fn parent(&self) -> Option<&ArtifactCoords> {
        self.parent.as_ref()
    }

    /// Children, then imports, then the parent.
    pub fn all_dependencies(&self) -> impl Iterator<Item = &ArtifactCoords> {
        self.children.iter().chain(self.imports.iter()).chain(self.parent.iter())
    }
}

/// Arena of accepted components keyed by coordinate.
#[derive(Debug, Clone, Default)]
pub struct ArtifactGraph {
    nodes: BTreeMap<ArtifactCoords, ComponentNode>,
}

impl ArtifactGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a component unless one already exists for its coordinate.
    ///
    /// Returns `false` when the coordinate was present; the existing component
    /// is kept.
    pub fn insert(&mut self, component: ResolvedComponent) -> bool {
        if self.nodes.contains_key(component.coords()) {
            return false;
        }
        self.nodes.insert(component.coords.clone(), ComponentNode::new(component));
        true
    }

    /// Add candidate repositories to an existing component and return it.
    pub fn merge_repositories(
        &mut self,
        coords: &ArtifactCoords,
        repositories: &[RemoteRepository],
    ) -> Option<&ResolvedComponent> {
        let node = self.nodes.get_mut(coords)?;
        node.component.repositories.extend(repositories.iter().cloned());
        Some(&node.component)
    }

    pub fn get(&self, coords: &ArtifactCoords) -> Option<&ResolvedComponent> {
        self.nodes.get(coords).map(|n| &n.component)
    }

    pub fn node(&self, coords: &ArtifactCoords) -> Option<&ComponentNode> {
        self.nodes.get(coords)
    }

    pub fn contains(&self, coords: &ArtifactCoords) -> bool {
        self.nodes.contains_key(coords)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn coords(&self) -> impl Iterator<Item = &ArtifactCoords> {
        self.nodes.keys()
    }

    pub fn components(&self) -> impl Iterator<Item = &ResolvedComponent> {
        self.nodes.values().map(|n| &n.component)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ComponentNode> {
        self.nodes.values()
    }

    /// Record an ordinary dependency edge. Both ends must be present.
    pub fn add_child(&mut self, from: &ArtifactCoords, to: &ArtifactCoords) -> bool {
        if from == to || !self.nodes.contains_key(to) {
            return false;
        }
        self.nodes.get_mut(from).is_some_and(|n| n.children.insert(to.clone()))
    }

    /// Record an imported constraint manifest edge.
    pub fn add_import(&mut self, from: &ArtifactCoords, to: &ArtifactCoords) -> bool {
        if from == to || !self.nodes.contains_key(to) {
            return false;
        }
        self.nodes.get_mut(from).is_some_and(|n| n.imports.insert(to.clone()))
    }

    /// Set the parent manifest edge.
    pub fn set_parent(&mut self, from: &ArtifactCoords, parent: &ArtifactCoords) -> bool {
        if from == parent || !self.nodes.contains_key(parent) {
            return false;
        }
        match self.nodes.get_mut(from) {
            Some(node) => {
                node.parent = Some(parent.clone());
                true
            }
            None => false,
        }
    }

    /// Remove a component and every edge pointing at it.
    pub fn remove(&mut self, coords: &ArtifactCoords) -> Option<ResolvedComponent> {
        let removed = self.nodes.remove(coords)?;
        for node in self.nodes.values_mut() {
            node.children.remove(coords);
            node.imports.remove(coords);
            if node.parent.as_ref() == Some(coords) {
                node.parent = None;
            }
        }
        Some(removed.component)
    }
}

//! Release graph: components grouped by release identity.
//!
//! Each distinct [`ReleaseId`] maps to one [`ReleaseNode`] holding the
//! artifacts built from that source revision. Edges point from a release to
//! the releases it depends on. They are derived from the component graph once
//! all components are known ([`ReleaseGraph::derive_edges`]); a release never
//! depends on itself.
//!
//! Nodes live in a petgraph `StableDiGraph` so removing an empty release
//! keeps every other node index valid and drops its edges in both directions.
//!
//! # Cycles and Build Order
//!
//! [`ReleaseGraph::find_cycles`] reports every elementary cycle once, starting
//! from its smallest release and listed in dependency order.
//! [`ReleaseGraph::build_order`] lists releases dependencies-first; releases
//! on or behind a cycle are returned separately as unorderable.

use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::Write as _;

use super::artifact_graph::ArtifactGraph;
use crate::core::{ArtifactCoords, ReleaseId};
use crate::provider::RemoteRepository;

/// All artifacts built from one source revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseNode {
    id: ReleaseId,
    artifacts: BTreeMap<ArtifactCoords, BTreeSet<RemoteRepository>>,
}

impl ReleaseNode {
    fn new(id: ReleaseId) -> Self {
        Self {
            id,
            artifacts: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &ReleaseId {
        &self.id
    }

    pub fn artifacts(&self) -> &BTreeMap<ArtifactCoords, BTreeSet<RemoteRepository>> {
        &self.artifacts
    }
}

/// Result of ordering the release graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOrder {
    /// Releases with every dependency listed before them.
    pub ordered: Vec<ReleaseId>,
    /// Releases on a cycle or depending on one.
    pub unorderable: Vec<ReleaseId>,
}

impl BuildOrder {
    pub fn is_complete(&self) -> bool {
        self.unorderable.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReleaseGraph {
    graph: StableDiGraph<ReleaseNode, ()>,
    index: BTreeMap<ReleaseId, NodeIndex>,
}

impl ReleaseGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group the components of `components` by release, without edges.
    pub fn from_components(components: &ArtifactGraph) -> Self {
        let mut graph = Self::new();
        for component in components.components() {
            graph.add_artifact(
                component.release_id(),
                component.coords(),
                &component.repository_list(),
            );
        }
        graph
    }

    fn get_or_create(&mut self, id: &ReleaseId) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(ReleaseNode::new(id.clone()));
        self.index.insert(id.clone(), idx);
        idx
    }

    /// Add an artifact to the release `id`, creating the release if needed.
    ///
    /// Adding a known artifact merges its repositories.
    pub fn add_artifact(
        &mut self,
        id: &ReleaseId,
        coords: &ArtifactCoords,
        repositories: &[RemoteRepository],
    ) {
        let idx = self.get_or_create(id);
        self.graph[idx]
            .artifacts
            .entry(coords.clone())
            .or_default()
            .extend(repositories.iter().cloned());
    }

    /// Record that `from` depends on `to`. Self edges and duplicates are ignored.
    pub fn add_dependency(&mut self, from: &ReleaseId, to: &ReleaseId) -> bool {
        if from == to {
            return false;
        }
        let (Some(&a), Some(&b)) = (self.index.get(from), self.index.get(to)) else {
            return false;
        };
        if self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, ());
        true
    }

    /// Derive release edges from every component edge crossing releases.
    pub fn derive_edges(&mut self, components: &ArtifactGraph) {
        for node in components.nodes() {
            let from = node.component().release_id();
            for dep in node.all_dependencies() {
                if let Some(to) = components.get(dep) {
                    self.add_dependency(from, to.release_id());
                }
            }
        }
    }

    pub fn get(&self, id: &ReleaseId) -> Option<&ReleaseNode> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    pub fn contains(&self, id: &ReleaseId) -> bool {
        self.index.contains_key(id)
    }

    /// Releases in identity order.
    pub fn releases(&self) -> impl Iterator<Item = &ReleaseNode> {
        self.index.values().map(|&idx| &self.graph[idx])
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn neighbors(&self, id: &ReleaseId, direction: Direction) -> Vec<&ReleaseId> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut ids: Vec<&ReleaseId> =
            self.graph.neighbors_directed(idx, direction).map(|n| &self.graph[n].id).collect();
        ids.sort();
        ids
    }

    /// Releases `id` depends on, sorted.
    pub fn dependencies(&self, id: &ReleaseId) -> Vec<&ReleaseId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Releases depending on `id`, sorted.
    pub fn dependants(&self, id: &ReleaseId) -> Vec<&ReleaseId> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Releases nothing depends on.
    pub fn roots(&self) -> Vec<&ReleaseId> {
        self.index
            .iter()
            .filter(|&(_, &idx)| {
                self.graph.neighbors_directed(idx, Direction::Incoming).next().is_none()
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Remove every artifact matching `predicate`, then drop releases left
    /// empty together with all their edges. Returns the removed artifacts.
    pub fn prune<F>(&mut self, predicate: F) -> Vec<ArtifactCoords>
    where
        F: Fn(&ArtifactCoords) -> bool,
    {
        let mut removed = Vec::new();
        for &idx in self.index.values() {
            let artifacts = &mut self.graph[idx].artifacts;
            let matching: Vec<ArtifactCoords> =
                artifacts.keys().filter(|c| predicate(c)).cloned().collect();
            for coords in matching {
                artifacts.remove(&coords);
                removed.push(coords);
            }
        }
        self.remove_empty();
        removed
    }

    /// Drop releases without artifacts. Returns their identities.
    pub fn remove_empty(&mut self) -> Vec<ReleaseId> {
        let empty: Vec<ReleaseId> = self
            .index
            .iter()
            .filter(|&(_, &idx)| self.graph[idx].artifacts.is_empty())
            .map(|(id, _)| id.clone())
            .collect();
        for id in &empty {
            if let Some(idx) = self.index.remove(id) {
                self.graph.remove_node(idx);
            }
        }
        empty
    }

    /// Every elementary cycle, each reported once.
    ///
    /// A chain `[a, b, c]` means `a -> b -> c -> a`; it starts at its smallest
    /// release.
    pub fn find_cycles(&self) -> Vec<Vec<ReleaseId>> {
        let mut cycles = Vec::new();
        for component in tarjan_scc(&self.graph) {
            if component.len() < 2 {
                continue;
            }
            let mut members: Vec<NodeIndex> = component;
            members.sort_by(|a, b| self.graph[*a].id.cmp(&self.graph[*b].id));
            for (position, &start) in members.iter().enumerate() {
                // Only later members may appear, so each cycle is found from
                // its smallest node exactly once.
                let allowed: HashSet<NodeIndex> = members[position + 1..].iter().copied().collect();
                let mut path = vec![start];
                self.collect_cycles(start, start, &allowed, &mut path, &mut cycles);
            }
        }
        cycles.sort();
        cycles
    }

    fn collect_cycles(
        &self,
        start: NodeIndex,
        current: NodeIndex,
        allowed: &HashSet<NodeIndex>,
        path: &mut Vec<NodeIndex>,
        cycles: &mut Vec<Vec<ReleaseId>>,
    ) {
        let mut next: Vec<NodeIndex> = self.graph.neighbors_directed(current, Direction::Outgoing).collect();
        next.sort_by(|a, b| self.graph[*a].id.cmp(&self.graph[*b].id));
        for n in next {
            if n == start {
                cycles.push(path.iter().map(|&i| self.graph[i].id.clone()).collect());
            } else if allowed.contains(&n) && !path.contains(&n) {
                path.push(n);
                self.collect_cycles(start, n, allowed, path, cycles);
                path.pop();
            }
        }
    }

    /// Releases ordered dependencies first.
    ///
    /// Ties are broken by release identity so the order is reproducible.
    pub fn build_order(&self) -> BuildOrder {
        let mut pending: BTreeMap<NodeIndex, usize> = BTreeMap::new();
        let mut ready: BTreeSet<&ReleaseId> = BTreeSet::new();
        for (id, &idx) in &self.index {
            let count = self.graph.neighbors_directed(idx, Direction::Outgoing).count();
            if count == 0 {
                ready.insert(id);
            } else {
                pending.insert(idx, count);
            }
        }

        let mut ordered = Vec::with_capacity(self.index.len());
        while let Some(id) = ready.pop_first() {
            ordered.push(id.clone());
            let Some(&idx) = self.index.get(id) else {
                continue;
            };
            for dependant in self.graph.neighbors_directed(idx, Direction::Incoming) {
                if let Some(count) = pending.get_mut(&dependant) {
                    *count -= 1;
                    if *count == 0 {
                        pending.remove(&dependant);
                        ready.insert(&self.graph[dependant].id);
                    }
                }
            }
        }

        let mut unorderable: Vec<ReleaseId> =
            pending.keys().map(|&idx| self.graph[idx].id.clone()).collect();
        unorderable.sort();
        BuildOrder {
            ordered,
            unorderable,
        }
    }

    /// Indented dependency tree starting at every root release.
    ///
    /// A release already shown on the current path is printed with a `(cycle)`
    /// marker instead of being expanded again.
    pub fn to_tree_string(&self) -> String {
        let mut out = String::new();
        let mut roots = self.roots();
        if roots.is_empty() {
            // Everything is on a cycle; start from the smallest release.
            roots = self.index.keys().take(1).collect();
        }
        for root in roots {
            let mut path = Vec::new();
            self.write_tree(root, 0, &mut path, &mut out);
        }
        out
    }

    fn write_tree<'g>(
        &'g self,
        id: &'g ReleaseId,
        depth: usize,
        path: &mut Vec<&'g ReleaseId>,
        out: &mut String,
    ) {
        let indent = "  ".repeat(depth);
        if path.contains(&id) {
            let _ = writeln!(out, "{indent}{id} (cycle)");
            return;
        }
        let _ = writeln!(out, "{indent}{id}");
        path.push(id);
        for dep in self.dependencies(id) {
            self.write_tree(dep, depth + 1, path, out);
        }
        path.pop();
    }
}

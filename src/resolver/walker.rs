//! Depth-first walk over collected dependency trees.
//!
//! Direct children of a root are at depth 1. An excluded node cuts off its
//! subtree. A node past the depth limit is skipped. In either case, when
//! remaining-diagnostics are on, the subtree is still walked in
//! remaining-only mode: nodes are recorded as remaining and never accepted.

use tracing::debug;

use super::RunContext;
use super::artifact_graph::ResolvedComponent;
use crate::core::{ArtifactCoords, Diagnostic, RelgraphError};
use crate::provider::{DependencyTree, RemoteRepository};

impl RunContext<'_> {
    /// Collect and walk the tree of one root.
    pub(super) fn process_root(&mut self, root: &ArtifactCoords) -> Result<(), RelgraphError> {
        self.current_root = Some(root.clone());
        let tree = match self.provider.collect(
            root,
            &self.constraints,
            self.policy.excluded_scopes(),
        ) {
            Ok(tree) => tree,
            Err(e) => return self.resolution_failure(e.coords().clone(), e.to_string()),
        };
        debug!("Collected {} nodes under {}", tree.size(), root);

        let Some(component) = self.add_artifact_to_build(&tree.coords, &tree.repositories)? else {
            debug!("Root {} is not accepted", root);
            if self.policy.log_remaining {
                for child in &tree.children {
                    self.process_node(child, None, 1, true)?;
                }
            }
            return Ok(());
        };
        self.visit(|v| v.enter_root_artifact(&component));
        self.include_ancestry(&component)?;
        for child in &tree.children {
            if child.optional && !self.policy.follows_optional(&child.coords) {
                debug!("Skipping optional {}", child.coords);
                continue;
            }
            self.process_node(child, Some(component.coords()), 1, false)?;
        }
        self.visit(|v| v.leave_root_artifact(&component));
        Ok(())
    }

    fn process_node(
        &mut self,
        node: &DependencyTree,
        parent: Option<&ArtifactCoords>,
        depth: u32,
        remaining: bool,
    ) -> Result<(), RelgraphError> {
        let coords = &node.coords;
        if self.policy.is_excluded(coords) {
            debug!("Excluded {}", coords);
            if self.policy.log_remaining {
                for child in &node.children {
                    self.process_node(child, None, depth + 1, true)?;
                }
            }
            return Ok(());
        }

        let mut remaining = remaining;
        let mut accepted: Option<ResolvedComponent> = None;
        if remaining {
            self.add_to_remaining(coords);
        } else if self.policy.within_depth(depth) {
            match self.add_artifact_to_build(coords, &node.repositories)? {
                Some(component) => {
                    if let Some(parent) = parent {
                        self.components.add_child(parent, coords);
                    }
                    self.visit(|v| v.enter_dependency(&component));
                    self.include_ancestry(&component)?;
                    accepted = Some(component);
                }
                None if self.policy.log_remaining => remaining = true,
                None => return Ok(()),
            }
        } else {
            debug!("{} is beyond the depth limit", coords);
            self.add_to_skipped(coords);
            if !self.policy.log_remaining {
                return Ok(());
            }
            remaining = true;
            self.add_to_remaining(coords);
        }

        let from = accepted.as_ref().map(|c| c.coords().clone());
        for child in &node.children {
            if !remaining && child.optional && !self.policy.follows_optional(&child.coords) {
                continue;
            }
            self.process_node(child, from.as_ref(), depth + 1, remaining)?;
        }
        if let Some(component) = &accepted {
            self.visit(|v| v.leave_dependency(component));
        }
        Ok(())
    }

    /// Apply the acceptance rule and, when it passes, accept `coords`.
    ///
    /// A visited coordinate is accepted when it is managed, when non-managed
    /// coordinates are welcome, when an include pattern names it, or when it
    /// is a manifest and parent manifests are followed (project manifests
    /// always are).
    pub(super) fn add_artifact_to_build(
        &mut self,
        coords: &ArtifactCoords,
        repositories: &[RemoteRepository],
    ) -> Result<Option<ResolvedComponent>, RelgraphError> {
        let managed = self.constraints.is_managed(coords);
        if !managed && self.policy.collects_non_managed() {
            self.non_managed_visited.insert(coords.clone());
        }

        let accepted = managed
            || self.policy.include_non_managed
            || self.policy.is_included(coords)
            || (coords.is_manifest()
                && (!self.policy.exclude_parent_poms
                    || self.project_gavs.contains(&coords.gav())));
        if !accepted {
            debug!("Skipping non-managed {}", coords);
            self.add_to_skipped(coords);
            if self.policy.log_remaining {
                self.add_to_remaining(coords);
            }
            return Ok(None);
        }
        self.accept(coords, repositories, managed).map(Some)
    }

    /// Upsert a component. A known coordinate keeps its release and only
    /// gains repositories.
    fn accept(
        &mut self,
        coords: &ArtifactCoords,
        repositories: &[RemoteRepository],
        managed: bool,
    ) -> Result<ResolvedComponent, RelgraphError> {
        if let Some(existing) = self.components.merge_repositories(coords, repositories) {
            let existing = existing.clone();
            self.promote(coords);
            return Ok(existing);
        }

        let release_id = self.release_ids.resolve(coords, repositories, &mut self.diagnostics)?;
        let component = ResolvedComponent::new(coords.clone(), release_id, repositories, managed);
        debug!("Accepted {} from {}", coords, component.release_id());
        self.components.insert(component.clone());
        self.promote(coords);
        Ok(component)
    }

    /// An accepted coordinate is neither skipped nor remaining.
    fn promote(&mut self, coords: &ArtifactCoords) {
        self.skipped.remove(coords);
        self.remaining.remove(coords);
    }

    fn add_to_skipped(&mut self, coords: &ArtifactCoords) {
        if !self.components.contains(coords) {
            self.skipped.insert(coords.clone());
        }
    }

    fn add_to_remaining(&mut self, coords: &ArtifactCoords) {
        if !self.components.contains(coords) {
            self.remaining.insert(coords.clone());
        }
    }

    /// Drop the coordinate with a diagnostic, or abort the run.
    pub(super) fn resolution_failure(
        &mut self,
        coords: ArtifactCoords,
        reason: String,
    ) -> Result<(), RelgraphError> {
        let root = self.current_root.clone();
        if self.policy.warn_on_resolution_errors {
            self.diagnostics.push(Diagnostic::ResolutionFailure {
                coords,
                root,
                reason,
            });
            Ok(())
        } else {
            Err(RelgraphError::ResolutionFailed {
                coords,
                root,
                reason,
            })
        }
    }
}

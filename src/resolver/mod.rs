//! Release dependency graph resolution.
//!
//! This module turns a policy and a set of root artifacts into the graph of
//! releases that must be rebuilt, and the order to rebuild them in.
//!
//! # Resolution Process
//!
//! 1. **Constraints**: the managed dependencies of the project BOM and the
//!    non-project BOMs become the enforced constraint set.
//! 2. **Roots**: [`roots::select_roots`] picks the root artifacts.
//! 3. **Walk**: each root's dependency tree is collected and walked depth
//!    first (`walker`). Accepted artifacts become [`ResolvedComponent`]s,
//!    each with a memoized [`ReleaseId`].
//! 4. **Manifest closure**: the parent and imported manifests of every
//!    accepted component are accepted too (`manifest_closure`).
//! 5. **Aggregation**: components are grouped into release nodes; already
//!    built artifacts are pruned together with releases left empty.
//! 6. **Edges**: descriptor dependencies are added to the component edges,
//!    then release edges are derived from every edge crossing releases.
//! 7. **Cycles**: every release cycle is reported as a chain.
//!
//! The run is single threaded and deterministic: roots, children and
//! collections are visited in a stable order.
//!
//! # Error Handling
//!
//! Fatal conditions abort with a [`RelgraphError`] naming the offending
//! coordinate and root. With `warn-on-resolution-errors` and
//! `warn-on-missing-scm`, failures are recorded as [`Diagnostic`]s in the
//! [`Resolution`] instead. Cycles are never fatal.
//!
//! # Example
//!
//! ```rust,no_run
//! use relgraph_cli::config::ResolverConfig;
//! use relgraph_cli::provider::registry::RegistrySnapshot;
//! use relgraph_cli::resolver::ProjectDependencyResolver;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let registry = RegistrySnapshot::load("registry.json".as_ref()).await?;
//! let config = ResolverConfig::load_or_default(None).await?;
//! let resolution = ProjectDependencyResolver::new(&config, &registry, &registry)?.resolve()?;
//! for release in resolution.build_order().ordered {
//!     println!("{release}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifact_graph;
mod manifest_closure;
pub mod properties;
pub mod release_graph;
pub mod roots;
pub mod visitor;
mod walker;

pub use artifact_graph::{ArtifactGraph, ComponentNode, ResolvedComponent};
pub use release_graph::{BuildOrder, ReleaseGraph, ReleaseNode};
pub use visitor::{DependencyTreeVisitor, LoggingTreeVisitor};

use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{info, warn};

use crate::config::{InclusionPolicy, ResolverConfig};
use crate::core::{ArtifactCoords, Diagnostic, Diagnostics, Gav, ReleaseId, RelgraphError};
use crate::provider::{DependencyTreeProvider, DescriptorReader, ManagedConstraints};
use crate::release_id::{DetectionStats, ReleaseIdDetector, ReleaseIdResolver, rules};
use crate::utils::progress::ProgressBar;
use manifest_closure::ManifestInfo;

/// Everything a resolution run produced.
#[derive(Debug)]
pub struct Resolution {
    pub releases: ReleaseGraph,
    pub components: ArtifactGraph,
    pub roots: Vec<ArtifactCoords>,
    /// Visited but not accepted.
    pub skipped: BTreeSet<ArtifactCoords>,
    /// Seen only below a depth limit or a rejected node.
    pub remaining: BTreeSet<ArtifactCoords>,
    pub non_managed_visited: BTreeSet<ArtifactCoords>,
    /// Accepted artifacts removed because a prior build produced them.
    pub already_built: Vec<ArtifactCoords>,
    /// Release cycles; `[a, b]` means `a -> b -> a`.
    pub cycles: Vec<Vec<ReleaseId>>,
    pub diagnostics: Vec<Diagnostic>,
    pub detection_stats: DetectionStats,
}

impl Resolution {
    pub fn build_order(&self) -> BuildOrder {
        self.releases.build_order()
    }

    pub fn is_resolved(&self, coords: &ArtifactCoords) -> bool {
        self.components.contains(coords)
    }

    pub fn release_of(&self, coords: &ArtifactCoords) -> Option<&ReleaseId> {
        self.components.get(coords).map(ResolvedComponent::release_id)
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }
}

/// Resolves the release graph of a project.
///
/// Owns the per-run configuration; the providers are borrowed for the run.
pub struct ProjectDependencyResolver<'a> {
    config: ResolverConfig,
    policy: InclusionPolicy,
    provider: &'a dyn DependencyTreeProvider,
    reader: &'a dyn DescriptorReader,
    detectors: Vec<Box<dyn ReleaseIdDetector + 'a>>,
    visitors: Vec<Box<dyn DependencyTreeVisitor + 'a>>,
    progress: ProgressBar,
}

impl<'a> ProjectDependencyResolver<'a> {
    /// Compile the policy of `config`. Invalid patterns fail here.
    pub fn new(
        config: &ResolverConfig,
        provider: &'a dyn DependencyTreeProvider,
        reader: &'a dyn DescriptorReader,
    ) -> Result<Self, RelgraphError> {
        Ok(Self {
            config: config.clone(),
            policy: config.policy()?,
            provider,
            reader,
            detectors: Vec::new(),
            visitors: Vec::new(),
            progress: ProgressBar::hidden(),
        })
    }

    /// Add a detector consulted before the configured and built-in rules.
    pub fn add_detector(&mut self, detector: Box<dyn ReleaseIdDetector + 'a>) {
        self.detectors.push(detector);
    }

    pub fn add_visitor(&mut self, visitor: Box<dyn DependencyTreeVisitor + 'a>) {
        self.visitors.push(visitor);
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Run the resolution.
    pub fn resolve(self) -> Result<Resolution, RelgraphError> {
        let Self {
            config,
            policy,
            provider,
            reader,
            detectors,
            mut visitors,
            progress,
        } = self;

        let constraints = enforced_constraints(&config, provider)?;
        let selection = roots::select_roots(&config, &policy, &constraints)?;
        info!(
            "Resolving {} root(s) against {} managed constraint(s)",
            selection.roots.len(),
            constraints.len()
        );

        let mut release_ids = ReleaseIdResolver::new(reader, policy.warn_on_missing_scm);
        for detector in detectors {
            release_ids.add_detector(detector);
        }
        for detector in rules::detectors_for(policy.release_id_rules())? {
            release_ids.add_detector(Box::new(detector));
        }
        if policy.log_trees {
            visitors.push(Box::new(LoggingTreeVisitor::new()));
        }

        let mut ctx = RunContext {
            policy,
            provider,
            reader,
            release_ids,
            visitors,
            constraints,
            project_gavs: selection.project_gavs,
            components: ArtifactGraph::new(),
            skipped: BTreeSet::new(),
            remaining: BTreeSet::new(),
            non_managed_visited: BTreeSet::new(),
            manifests: HashMap::new(),
            in_progress: HashSet::new(),
            diagnostics: Diagnostics::new(),
            current_root: None,
            progress,
        };
        ctx.walk(&selection.roots)?;
        ctx.finish(selection.roots)
    }
}

/// Managed dependencies of every configured BOM, earlier BOMs first.
fn enforced_constraints(
    config: &ResolverConfig,
    provider: &dyn DependencyTreeProvider,
) -> Result<ManagedConstraints, RelgraphError> {
    let mut constraints = ManagedConstraints::new();
    for bom in config.project_bom.iter().chain(&config.non_project_boms) {
        let manifest = bom.to_manifest();
        let descriptor = provider.resolve_descriptor(&manifest).map_err(|e| {
            RelgraphError::DescriptorUnavailable {
                coords: manifest.clone(),
                reason: e.to_string(),
            }
        })?;
        if descriptor.managed_dependencies.is_empty() {
            return Err(RelgraphError::InvalidPolicy {
                reason: format!("{manifest} does not manage any dependencies"),
            });
        }
        constraints.extend(&descriptor.managed_dependencies);
    }
    Ok(constraints)
}

/// Mutable state of a single run, torn down when the run completes.
struct RunContext<'a> {
    policy: InclusionPolicy,
    provider: &'a dyn DependencyTreeProvider,
    reader: &'a dyn DescriptorReader,
    release_ids: ReleaseIdResolver<'a>,
    visitors: Vec<Box<dyn DependencyTreeVisitor + 'a>>,
    constraints: ManagedConstraints,
    project_gavs: BTreeSet<Gav>,
    components: ArtifactGraph,
    skipped: BTreeSet<ArtifactCoords>,
    remaining: BTreeSet<ArtifactCoords>,
    non_managed_visited: BTreeSet<ArtifactCoords>,
    manifests: HashMap<ArtifactCoords, ManifestInfo>,
    in_progress: HashSet<ArtifactCoords>,
    diagnostics: Diagnostics,
    current_root: Option<ArtifactCoords>,
    progress: ProgressBar,
}

impl<'a> RunContext<'a> {
    fn visit(&mut self, mut hook: impl FnMut(&mut (dyn DependencyTreeVisitor + 'a))) {
        for visitor in &mut self.visitors {
            hook(visitor.as_mut());
        }
    }

    fn walk(&mut self, roots: &[ArtifactCoords]) -> Result<(), RelgraphError> {
        self.progress.set_length(roots.len() as u64);
        self.progress.set_prefix("Resolving");
        self.visit(|v| v.before_all_roots());
        for root in roots {
            self.progress.set_message(root.to_compact_string());
            self.process_root(root)?;
            self.progress.inc(1);
        }
        self.current_root = None;
        self.visit(|v| v.after_all_roots());
        self.progress.finish_and_clear();
        Ok(())
    }

    fn finish(mut self, roots: Vec<ArtifactCoords>) -> Result<Resolution, RelgraphError> {
        let mut releases = ReleaseGraph::from_components(&self.components);

        let mut already_built = Vec::new();
        if !self.policy.include_already_built {
            let policy = &self.policy;
            already_built = releases.prune(|c| policy.is_already_built(c));
            for coords in &already_built {
                self.components.remove(coords);
            }
            if !already_built.is_empty() {
                info!("Pruned {} already built artifact(s)", already_built.len());
            }
        }

        self.add_descriptor_edges()?;
        releases.derive_edges(&self.components);

        let cycles = releases.find_cycles();
        for cycle in &cycles {
            let mut chain: Vec<String> = cycle.iter().map(ToString::to_string).collect();
            if let Some(first) = chain.first().cloned() {
                chain.push(first);
            }
            warn!("Release cycle: {}", chain.join(" -> "));
        }
        info!(
            "Resolved {} artifact(s) in {} release(s)",
            self.components.len(),
            releases.len()
        );
        if self.policy.log_summary {
            info!(
                "Summary: {} root(s), {} skipped, {} remaining, {} non-managed visited, {} cycle(s)",
                roots.len(),
                self.skipped.len(),
                self.remaining.len(),
                self.non_managed_visited.len(),
                cycles.len()
            );
        }

        Ok(Resolution {
            releases,
            components: self.components,
            roots,
            skipped: self.skipped,
            remaining: self.remaining,
            non_managed_visited: self.non_managed_visited,
            already_built,
            cycles,
            diagnostics: self.diagnostics.into_vec(),
            detection_stats: self.release_ids.into_stats(),
        })
    }

    /// Link every component to the resolved components its descriptor
    /// declares as direct dependencies, matched by exact coordinates.
    fn add_descriptor_edges(&mut self) -> Result<(), RelgraphError> {
        let accepted: Vec<ArtifactCoords> = self.components.coords().cloned().collect();
        for coords in accepted {
            let descriptor = match self.provider.resolve_descriptor(&coords) {
                Ok(descriptor) => descriptor,
                Err(e) => {
                    self.resolution_failure(coords, e.to_string())?;
                    continue;
                }
            };
            for dep in &descriptor.dependencies {
                if self.components.contains(&dep.coords) {
                    self.components.add_child(&coords, &dep.coords);
                }
            }
        }
        Ok(())
    }
}

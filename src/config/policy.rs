//! Compiled inclusion policy.
//!
//! [`InclusionPolicy`] is the immutable snapshot the resolver consults for
//! every visited coordinate. It is built once per run from a
//! [`ResolverConfig`]; all patterns are compiled up front so invalid input
//! fails before traversal begins.
//!
//! # Decision Rules
//!
//! - `excluded(c)`: any exclude pattern matches, or `c` has the `tests`
//!   classifier and test artifacts are not enabled.
//! - `included(c)`: any include pattern (or include artifact) matches.
//! - Roots are selected when `included(c) || !excluded(c)`, then go through
//!   the same acceptance rule as any visited node.
//! - During traversal an excluded node stops its whole subtree even when an
//!   include pattern also matches it; includes only decide acceptance of
//!   nodes that are not excluded.

use regex::Regex;
use std::collections::BTreeSet;

use super::{ReleaseIdRule, ResolverConfig};
use crate::core::{ArtifactCoords, RelgraphError, TESTS_CLASSIFIER};
use crate::pattern::{ArtifactCoordsPattern, PatternSet};

/// Immutable per-run policy snapshot.
#[derive(Debug, Clone)]
pub struct InclusionPolicy {
    includes: PatternSet,
    excludes: PatternSet,
    /// `None` means unlimited.
    depth_limit: Option<u32>,
    excluded_scopes: BTreeSet<String>,
    already_built: Regex,
    root_versions: Vec<glob::Pattern>,
    pub include_optional_deps: bool,
    pub include_non_managed: bool,
    pub include_test_jars: bool,
    pub include_already_built: bool,
    pub exclude_parent_poms: bool,
    pub exclude_bom_imports: bool,
    pub warn_on_resolution_errors: bool,
    pub warn_on_missing_scm: bool,
    pub log_remaining: bool,
    pub log_non_managed_visited: bool,
    pub log_summary: bool,
    pub log_trees: bool,
    release_id_rules: Vec<ReleaseIdRule>,
}

impl InclusionPolicy {
    pub fn from_config(config: &ResolverConfig) -> Result<Self, RelgraphError> {
        let mut includes = PatternSet::compile(&config.include_patterns)?;
        for coords in &config.include_artifacts {
            includes.push(ArtifactCoordsPattern::exact(coords));
        }
        let excludes = PatternSet::compile(&config.exclude_patterns)?;
        let already_built = Regex::new(&config.already_built_version_pattern).map_err(|e| {
            RelgraphError::InvalidPattern {
                pattern: config.already_built_version_pattern.clone(),
                reason: e.to_string(),
            }
        })?;
        let root_versions = config
            .root_versions
            .iter()
            .map(|v| {
                glob::Pattern::new(v).map_err(|e| RelgraphError::InvalidPattern {
                    pattern: v.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        for rule in &config.release_id_rules {
            if rule.group_id.trim().is_empty() {
                return Err(RelgraphError::ConfigError {
                    message: "release-id rule with an empty group-id".to_string(),
                });
            }
        }

        Ok(Self {
            includes,
            excludes,
            depth_limit: u32::try_from(config.level).ok(),
            excluded_scopes: config.exclude_scopes.clone(),
            already_built,
            root_versions,
            include_optional_deps: config.include_optional_deps,
            include_non_managed: config.include_non_managed,
            include_test_jars: config.include_test_jars,
            include_already_built: config.include_already_built,
            exclude_parent_poms: config.exclude_parent_poms,
            exclude_bom_imports: config.exclude_bom_imports,
            warn_on_resolution_errors: config.warn_on_resolution_errors,
            warn_on_missing_scm: config.warn_on_missing_scm,
            log_remaining: config.log_remaining,
            log_non_managed_visited: config.log_non_managed_visited,
            log_summary: config.log_summary,
            log_trees: config.log_trees,
            release_id_rules: config.release_id_rules.clone(),
        })
    }

    pub fn is_excluded(&self, coords: &ArtifactCoords) -> bool {
        self.excludes.matches(coords)
            || (!self.include_test_jars && coords.classifier() == TESTS_CLASSIFIER)
    }

    pub fn is_included(&self, coords: &ArtifactCoords) -> bool {
        self.includes.matches(coords)
    }

    pub fn has_include_patterns(&self) -> bool {
        !self.includes.is_empty()
    }

    /// Explicit include overrides exclusion; otherwise exclusion wins.
    pub fn accepts_root(&self, coords: &ArtifactCoords) -> bool {
        self.is_included(coords) || !self.is_excluded(coords)
    }

    /// Whether an optional dependency should be followed.
    pub fn follows_optional(&self, coords: &ArtifactCoords) -> bool {
        self.include_optional_deps || self.is_included(coords)
    }

    /// Whether `depth` (1 for direct children of a root) is within the limit.
    pub fn within_depth(&self, depth: u32) -> bool {
        self.depth_limit.is_none_or(|limit| depth <= limit)
    }

    pub fn depth_limit(&self) -> Option<u32> {
        self.depth_limit
    }

    pub fn excluded_scopes(&self) -> &BTreeSet<String> {
        &self.excluded_scopes
    }

    /// Whether the artifact was produced by a prior production build.
    pub fn is_already_built(&self, coords: &ArtifactCoords) -> bool {
        self.already_built.is_match(coords.version())
    }

    /// Whether a root's version passes the `root-versions` filter.
    pub fn root_version_allowed(&self, coords: &ArtifactCoords) -> bool {
        self.root_versions.is_empty()
            || self.root_versions.iter().any(|p| p.matches(coords.version()))
    }

    pub fn release_id_rules(&self) -> &[ReleaseIdRule] {
        &self.release_id_rules
    }

    /// Whether the resolver should record non-managed visited artifacts.
    pub fn collects_non_managed(&self) -> bool {
        (self.log_summary && self.include_non_managed) || self.log_non_managed_visited
    }
}

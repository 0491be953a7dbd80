//! Root artifact selection.

use std::collections::BTreeSet;
use tracing::debug;

use crate::config::{InclusionPolicy, ResolverConfig};
use crate::core::{ArtifactCoords, Gav, RelgraphError};
use crate::provider::ManagedConstraints;

/// Roots of a run and the GAV of the project BOM, if one is configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootSelection {
    pub roots: Vec<ArtifactCoords>,
    pub project_gavs: BTreeSet<Gav>,
}

/// Select the roots to traverse.
///
/// Explicit project artifacts win; otherwise the project constraint manifest
/// contributes its managed constraints that belong to the project, either by
/// include pattern or by a group that starts with the manifest's group.
/// Include artifacts are appended after the project roots.
pub fn select_roots(
    config: &ResolverConfig,
    policy: &InclusionPolicy,
    constraints: &ManagedConstraints,
) -> Result<RootSelection, RelgraphError> {
    let mut project: Vec<ArtifactCoords> = Vec::new();

    if !config.project_artifacts.is_empty() {
        project.extend(config.project_artifacts.iter().cloned());
        if let Some(bom) = &config.project_bom {
            project.push(bom.to_manifest());
        }
    } else if let Some(bom) = &config.project_bom {
        project.push(bom.to_manifest());
        for coords in constraints.iter() {
            if policy.is_excluded(coords) {
                continue;
            }
            let belongs = if policy.has_include_patterns() {
                policy.is_included(coords)
            } else {
                coords.group_id().starts_with(bom.group_id())
            };
            if belongs {
                project.push(coords.clone());
            }
        }
    } else if config.include_artifacts.is_empty() {
        return Err(RelgraphError::InvalidPolicy {
            reason: "neither project artifacts, a project BOM nor include artifacts are configured"
                .to_string(),
        });
    }

    project.sort();
    project.dedup();
    project.retain(|c| policy.root_version_allowed(c));

    let project_gavs = config.project_bom.iter().map(ArtifactCoords::gav).collect();

    let mut extra: Vec<ArtifactCoords> = config
        .include_artifacts
        .iter()
        .filter(|c| !project.contains(c))
        .cloned()
        .collect();
    extra.sort();
    extra.dedup();

    let roots: Vec<ArtifactCoords> = project
        .into_iter()
        .chain(extra)
        .filter(|c| {
            let accepted = policy.accepts_root(c);
            if !accepted {
                debug!("Root {} is excluded", c);
            }
            accepted
        })
        .collect();

    if roots.is_empty() {
        return Err(RelgraphError::InvalidPolicy {
            reason: "no root artifact is accepted by the inclusion policy".to_string(),
        });
    }
    Ok(RootSelection {
        roots,
        project_gavs,
    })
}

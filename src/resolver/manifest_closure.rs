//! Constraint-manifest ancestry of accepted components.
//!
//! Every accepted component is backed by a manifest (itself, or the `pom` of
//! a binary). The manifest's parent and the constraint manifests it imports
//! are accepted too, so the release graph also covers the releases that own
//! them. Results are memoized per manifest coordinate for the whole run.

use tracing::{debug, trace};

use super::RunContext;
use super::artifact_graph::ResolvedComponent;
use super::properties::{self, Properties};
use crate::core::{ArtifactCoords, Diagnostic, RelgraphError};
use crate::provider::{Model, ParentRef};

/// Memoized outcome of processing one manifest.
#[derive(Debug, Clone, Default)]
pub(super) struct ManifestInfo {
    properties: Properties,
    parent: Option<ArtifactCoords>,
    imports: Vec<ArtifactCoords>,
}

impl RunContext<'_> {
    /// Accept the parent and imported manifests of `component`, recursively.
    ///
    /// Returns the effective properties of the component's manifest. Does
    /// nothing when parent manifests are excluded from the run.
    pub(super) fn include_ancestry(
        &mut self,
        component: &ResolvedComponent,
    ) -> Result<Properties, RelgraphError> {
        if self.policy.exclude_parent_poms {
            return Ok(Properties::new());
        }
        let manifest = component.coords().to_manifest();
        if let Some(info) = self.manifests.get(&manifest) {
            let info = info.clone();
            self.link(component.coords(), &info);
            return Ok(info.properties);
        }
        if !self.in_progress.insert(manifest.clone()) {
            trace!("{} is already being processed", manifest);
            return Ok(Properties::new());
        }

        let result = self.process_manifest(component, &manifest);
        self.in_progress.remove(&manifest);
        let info = result?;

        self.link(component.coords(), &info);
        let properties = info.properties.clone();
        self.manifests.insert(manifest, info);
        Ok(properties)
    }

    fn link(&mut self, coords: &ArtifactCoords, info: &ManifestInfo) {
        if let Some(parent) = &info.parent {
            self.components.set_parent(coords, parent);
        }
        for import in &info.imports {
            self.components.add_import(coords, import);
        }
    }

    fn process_manifest(
        &mut self,
        component: &ResolvedComponent,
        manifest: &ArtifactCoords,
    ) -> Result<ManifestInfo, RelgraphError> {
        let model = match self.reader.read_model(manifest) {
            Ok(model) => model,
            Err(e) => {
                if !self.policy.warn_on_resolution_errors {
                    return Err(RelgraphError::DescriptorUnavailable {
                        coords: manifest.clone(),
                        reason: e.to_string(),
                    });
                }
                self.diagnostics.push(Diagnostic::ResolutionFailure {
                    coords: manifest.clone(),
                    root: self.current_root.clone(),
                    reason: e.to_string(),
                });
                return Ok(ManifestInfo::default());
            }
        };
        let repositories = component.repository_list();
        let mut info = ManifestInfo::default();

        let mut parent_properties = Properties::new();
        if let Some(parent) = &model.parent {
            match parent_coords(manifest, &model, parent) {
                Some(coords) if self.policy.is_excluded(&coords) => {
                    debug!("Parent {} of {} is excluded", coords, manifest);
                }
                Some(coords) => {
                    if let Some(accepted) = self.add_artifact_to_build(&coords, &repositories)? {
                        self.visit(|v| v.enter_parent_manifest(&accepted));
                        parent_properties = self.include_ancestry(&accepted)?;
                        self.visit(|v| v.leave_parent_manifest(&accepted));
                        info.parent = Some(coords);
                    }
                }
                None => self.diagnostics.push(Diagnostic::UnresolvedParentVersion {
                    manifest: manifest.clone(),
                    parent: format!(
                        "{}:{}:{}",
                        parent.group_id, parent.artifact_id, parent.version
                    ),
                }),
            }
        }

        info.properties = properties::merge_under(
            &parent_properties,
            properties::model_properties(manifest.group_id(), manifest.version(), &model),
        );
        if self.policy.exclude_bom_imports {
            return Ok(info);
        }

        for declaration in model.dependency_management.iter().filter(|d| d.is_manifest_import()) {
            let resolved = (
                properties::resolve(&declaration.group_id, &info.properties),
                properties::resolve(&declaration.artifact_id, &info.properties),
                properties::resolve(&declaration.version, &info.properties),
            );
            let (Some(group_id), Some(artifact_id), Some(version)) = resolved else {
                self.diagnostics.push(Diagnostic::UnresolvedImport {
                    manifest: manifest.clone(),
                    declaration: declaration.to_string(),
                });
                continue;
            };
            let coords = ArtifactCoords::pom(group_id, artifact_id, version);
            if self.policy.is_excluded(&coords) {
                debug!("Import {} of {} is excluded", coords, manifest);
                continue;
            }
            if let Some(imported) = self.add_artifact_to_build(&coords, &repositories)? {
                self.visit(|v| v.enter_manifest_import(&imported));
                self.include_ancestry(&imported)?;
                self.visit(|v| v.leave_manifest_import(&imported));
                info.imports.push(coords);
            }
        }
        Ok(info)
    }
}

/// Coordinates of the parent manifest.
///
/// A parent version that is still an expression is taken to be the child's
/// own version when the child declares no version or declares exactly the
/// same expression. This is an approximation; other expressions are
/// reported as unresolved.
fn parent_coords(manifest: &ArtifactCoords, model: &Model, parent: &ParentRef) -> Option<ArtifactCoords> {
    let version = if !properties::is_expression(&parent.version) {
        parent.version.as_str()
    } else {
        match model.version.as_deref() {
            None => manifest.version(),
            Some(own) if own == parent.version => manifest.version(),
            Some(_) => return None,
        }
    };
    Some(ArtifactCoords::pom(&parent.group_id, &parent.artifact_id, version))
}

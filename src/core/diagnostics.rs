//! Non-fatal conditions collected during a resolution run.

use serde::Serialize;
use std::fmt;

use crate::core::ArtifactCoords;

/// A condition that did not abort the run but that an operator should see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Diagnostic {
    /// An artifact or descriptor could not be fetched and was dropped.
    ResolutionFailure {
        coords: ArtifactCoords,
        #[serde(skip_serializing_if = "Option::is_none")]
        root: Option<ArtifactCoords>,
        reason: String,
    },
    /// An imported constraint manifest had an expression that did not resolve.
    UnresolvedImport {
        manifest: ArtifactCoords,
        declaration: String,
    },
    /// A parent manifest version expression could not be resolved.
    UnresolvedParentVersion {
        manifest: ArtifactCoords,
        parent: String,
    },
    /// No release identity was found; an unknown-origin identity was used.
    MissingScm { coords: ArtifactCoords, reason: String },
    /// A single detector failed; the chain continued with the next one.
    DetectorFailure {
        detector: String,
        coords: ArtifactCoords,
        reason: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResolutionFailure {
                coords,
                root,
                reason,
            } => {
                write!(f, "failed to resolve {coords}")?;
                if let Some(root) = root {
                    write!(f, " (root {root})")?;
                }
                write!(f, ": {reason}")
            }
            Self::UnresolvedImport {
                manifest,
                declaration,
            } => write!(f, "failed to resolve coordinates of import {declaration} in {manifest}"),
            Self::UnresolvedParentVersion {
                manifest,
                parent,
            } => write!(f, "failed to resolve the version of {parent} as a parent of {manifest}"),
            Self::MissingScm {
                coords,
                reason,
            } => write!(f, "failed to determine the SCM of {coords}: {reason}"),
            Self::DetectorFailure {
                detector,
                coords,
                reason,
            } => write!(f, "release-id detector '{detector}' failed for {coords}: {reason}"),
        }
    }
}

/// Collector that also emits every diagnostic as a `tracing` warning.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{diagnostic}");
        self.entries.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

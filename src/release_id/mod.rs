//! Release identity detection.
//!
//! A component's [`ReleaseId`] is found by an ordered chain of
//! [`ReleaseIdDetector`]s. The first detector returning an identity wins and
//! later detectors are not consulted. When every detector declines, the
//! declared `scm` block of the component's build descriptor is used
//! ([`ScmMetadataReader`]).
//!
//! [`ReleaseIdResolver`] memoizes the outcome per coordinate, so a component
//! reached through many dependency paths is detected once and always maps to
//! the same release.

pub mod rules;

use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::{debug, trace};

use crate::core::{ArtifactCoords, Diagnostic, Diagnostics, ReleaseId, RelgraphError};
use crate::provider::{DescriptorReader, Model, RemoteRepository};

/// Parent chains longer than this are treated as broken.
const MAX_PARENT_DEPTH: usize = 32;

/// Revision placeholder meaning "no tag recorded".
const HEAD: &str = "HEAD";

/// Name under which fallback detections are counted.
pub const SCM_FALLBACK: &str = "scm";

/// A detector could not complete (distinct from declining).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DetectionError {
    pub message: String,
}

impl DetectionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A release identity detection strategy.
pub trait ReleaseIdDetector {
    /// Short name used in statistics and diagnostics.
    fn name(&self) -> &str;

    /// Identity for `coords`, or `None` when this detector does not apply.
    ///
    /// `scm` gives access to the identity declared in the descriptor, which
    /// detectors commonly rewrite.
    fn detect(
        &self,
        scm: &ScmMetadataReader<'_>,
        coords: &ArtifactCoords,
        repositories: &[RemoteRepository],
    ) -> Result<Option<ReleaseId>, DetectionError>;
}

/// Reads the identity declared in a component's build descriptor.
pub struct ScmMetadataReader<'a> {
    reader: &'a dyn DescriptorReader,
}

impl<'a> ScmMetadataReader<'a> {
    pub fn new(reader: &'a dyn DescriptorReader) -> Self {
        Self {
            reader,
        }
    }

    /// Identity from the `scm` block of `coords`' descriptor.
    ///
    /// The url comes from the nearest descriptor in the parent chain that
    /// declares one. The tag comes from the nearest declared tag that is not
    /// `HEAD`, else from the component version.
    pub fn read_release_id(&self, coords: &ArtifactCoords) -> Result<ReleaseId, DetectionError> {
        let mut manifest = coords.to_manifest();
        let mut tag: Option<String> = None;

        for _ in 0..MAX_PARENT_DEPTH {
            let model = self
                .reader
                .read_model(&manifest)
                .map_err(|e| DetectionError::new(e.to_string()))?;

            let scm = model.scm.as_ref();
            if tag.is_none()
                && let Some(declared) = scm.and_then(|s| s.tag.as_deref())
                && !declared.trim().is_empty()
                && declared != HEAD
            {
                tag = Some(declared.to_string());
            }
            if let Some(url) = scm.and_then(|s| s.url.as_deref().or(s.connection.as_deref()))
                && !url.trim().is_empty()
            {
                let revision = tag.unwrap_or_else(|| coords.version().to_string());
                return Ok(ReleaseId::for_scm_and_tag(url, revision));
            }

            match parent_manifest(&manifest, &model) {
                Some(parent) => {
                    trace!("No scm url in {}, trying parent {}", manifest, parent);
                    manifest = parent;
                }
                None => {
                    return Err(DetectionError::new(format!(
                        "no scm url declared by {} or its parents",
                        coords.to_manifest()
                    )));
                }
            }
        }
        Err(DetectionError::new(format!("parent chain of {coords} is too deep")))
    }
}

/// Parent manifest coordinates. An expression version falls back to the
/// child's own version.
fn parent_manifest(child: &ArtifactCoords, model: &Model) -> Option<ArtifactCoords> {
    let parent = model.parent.as_ref()?;
    let version = if parent.version.contains("${") {
        child.version()
    } else {
        parent.version.as_str()
    };
    Some(ArtifactCoords::pom(&parent.group_id, &parent.artifact_id, version))
}

/// Counters describing a run's identity detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct DetectionStats {
    /// Distinct coordinates detection was attempted for.
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Lookups answered from the memo.
    pub cache_hits: usize,
    /// Successful detections per detector name.
    pub by_detector: BTreeMap<String, usize>,
}

/// Detector chain with fallback and per-run memoization.
pub struct ReleaseIdResolver<'a> {
    detectors: Vec<Box<dyn ReleaseIdDetector + 'a>>,
    scm: ScmMetadataReader<'a>,
    memo: HashMap<ArtifactCoords, ReleaseId>,
    stats: DetectionStats,
    warn_on_missing_scm: bool,
}

impl<'a> ReleaseIdResolver<'a> {
    pub fn new(reader: &'a dyn DescriptorReader, warn_on_missing_scm: bool) -> Self {
        Self {
            detectors: Vec::new(),
            scm: ScmMetadataReader::new(reader),
            memo: HashMap::new(),
            stats: DetectionStats::default(),
            warn_on_missing_scm,
        }
    }

    /// Append a detector to the end of the chain.
    pub fn add_detector(&mut self, detector: Box<dyn ReleaseIdDetector + 'a>) {
        self.detectors.push(detector);
    }

    pub fn stats(&self) -> &DetectionStats {
        &self.stats
    }

    pub fn into_stats(self) -> DetectionStats {
        self.stats
    }

    /// Identity of `coords`, detected on first use and memoized.
    ///
    /// # Errors
    ///
    /// [`RelgraphError::ReleaseIdDetectionFailed`] when nothing identifies
    /// the component and missing SCM information is not tolerated. Failures
    /// are not memoized since they abort the run.
    pub fn resolve(
        &mut self,
        coords: &ArtifactCoords,
        repositories: &[RemoteRepository],
        diagnostics: &mut Diagnostics,
    ) -> Result<ReleaseId, RelgraphError> {
        if let Some(id) = self.memo.get(coords) {
            self.stats.cache_hits += 1;
            return Ok(id.clone());
        }
        self.stats.attempted += 1;

        let id = match self.detect(coords, repositories, diagnostics) {
            Ok((id, detector)) => {
                self.stats.succeeded += 1;
                *self.stats.by_detector.entry(detector).or_default() += 1;
                id
            }
            Err(e) => {
                self.stats.failed += 1;
                if !self.warn_on_missing_scm {
                    return Err(RelgraphError::ReleaseIdDetectionFailed {
                        coords: coords.clone(),
                        reason: e.message,
                    });
                }
                diagnostics.push(Diagnostic::MissingScm {
                    coords: coords.clone(),
                    reason: e.message,
                });
                ReleaseId::unknown(coords)
            }
        };
        debug!("Release of {} is {}", coords, id);
        self.memo.insert(coords.clone(), id.clone());
        Ok(id)
    }

    fn detect(
        &self,
        coords: &ArtifactCoords,
        repositories: &[RemoteRepository],
        diagnostics: &mut Diagnostics,
    ) -> Result<(ReleaseId, String), DetectionError> {
        for detector in &self.detectors {
            match detector.detect(&self.scm, coords, repositories) {
                Ok(Some(id)) => return Ok((id, detector.name().to_string())),
                Ok(None) => {}
                Err(e) => diagnostics.push(Diagnostic::DetectorFailure {
                    detector: detector.name().to_string(),
                    coords: coords.clone(),
                    reason: e.message,
                }),
            }
        }
        self.scm.read_release_id(coords).map(|id| (id, SCM_FALLBACK.to_string()))
    }
}

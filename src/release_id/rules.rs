//! Data-driven release identity rewrites.
//!
//! Many projects publish descriptors whose `scm` block points at a mirror or
//! an organisation that moved, or tag releases with a prefix the descriptor
//! does not mention. A [`ReleaseIdRule`] describes such a correction for a
//! group (optionally a single name) and [`RuleDetector`] applies it.

use crate::config::{ReleaseIdRule, TagSource};
use crate::core::{ArtifactCoords, ReleaseId, RelgraphError};
use crate::pattern::ArtifactCoordsPattern;
use crate::provider::RemoteRepository;

use super::{DetectionError, ReleaseIdDetector, ScmMetadataReader};

/// Applies one [`ReleaseIdRule`].
#[derive(Debug, Clone)]
pub struct RuleDetector {
    name: String,
    pattern: ArtifactCoordsPattern,
    rule: ReleaseIdRule,
    /// Normalized form of `rule.repository`.
    canonical_origin: Option<String>,
}

impl RuleDetector {
    pub fn new(rule: ReleaseIdRule) -> Result<Self, RelgraphError> {
        let pattern_text = match &rule.artifact_id {
            Some(artifact_id) => format!("{}:{}", rule.group_id, artifact_id),
            None => rule.group_id.clone(),
        };
        let pattern = ArtifactCoordsPattern::parse(&pattern_text)?;
        let canonical_origin = rule
            .repository
            .as_deref()
            .and_then(|url| ReleaseId::for_scm_and_tag(url, "").origin().map(String::from));
        Ok(Self {
            name: format!("rule:{pattern_text}"),
            pattern,
            rule,
            canonical_origin,
        })
    }

    fn needs_declared_id(&self) -> bool {
        self.canonical_origin.is_none()
            || self.rule.tag_source == TagSource::Scm
            || self.rule.origin_contains.is_some()
    }

    fn decorate(&self, tag: String) -> String {
        let mut tag = tag;
        if let Some(prefix) = &self.rule.tag_prefix
            && !tag.starts_with(prefix.as_str())
        {
            tag = format!("{prefix}{tag}");
        }
        if let Some(suffix) = &self.rule.tag_suffix
            && !tag.ends_with(suffix.as_str())
        {
            tag.push_str(suffix);
        }
        tag
    }
}

impl ReleaseIdDetector for RuleDetector {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(
        &self,
        scm: &ScmMetadataReader<'_>,
        coords: &ArtifactCoords,
        _repositories: &[RemoteRepository],
    ) -> Result<Option<ReleaseId>, DetectionError> {
        if !self.pattern.matches(coords) {
            return Ok(None);
        }

        let declared = if self.needs_declared_id() {
            Some(scm.read_release_id(coords)?)
        } else {
            None
        };

        if let Some(declared) = &declared {
            if self.canonical_origin.is_some()
                && declared.origin() == self.canonical_origin.as_deref()
            {
                return Ok(Some(declared.clone()));
            }
            if let Some(needle) = &self.rule.origin_contains
                && !declared.origin().is_some_and(|o| o.contains(needle.as_str()))
            {
                return Ok(Some(declared.clone()));
            }
        }

        let origin = self
            .canonical_origin
            .clone()
            .or_else(|| declared.as_ref().and_then(|d| d.origin().map(String::from)))
            .unwrap_or_default();
        let base = match (self.rule.tag_source, &declared) {
            (TagSource::Scm, Some(declared)) => declared.revision().to_string(),
            _ => coords.version().to_string(),
        };
        Ok(Some(ReleaseId::for_scm_and_tag(origin, self.decorate(base))))
    }
}

fn rule(
    group_id: &str,
    artifact_id: Option<&str>,
    repository: Option<&str>,
    tag_prefix: Option<&str>,
    tag_suffix: Option<&str>,
    tag_source: TagSource,
) -> ReleaseIdRule {
    ReleaseIdRule {
        group_id: group_id.to_string(),
        artifact_id: artifact_id.map(String::from),
        repository: repository.map(String::from),
        tag_prefix: tag_prefix.map(String::from),
        tag_suffix: tag_suffix.map(String::from),
        tag_source,
        origin_contains: None,
    }
}

/// Corrections for well-known projects whose descriptors are misleading.
pub fn builtin_rules() -> Vec<ReleaseIdRule> {
    vec![
        rule(
            "org.apache.commons",
            Some("commons-parent"),
            Some("https://github.com/apache/commons-parent"),
            Some("commons-parent-"),
            None,
            TagSource::Scm,
        ),
        rule(
            "com.jayway.jsonpath",
            None,
            Some("https://github.com/jayway/JsonPath"),
            Some("json-path-"),
            None,
            TagSource::Version,
        ),
        ReleaseIdRule {
            origin_contains: Some("eclipse-ee4j".to_string()),
            ..rule(
                "jakarta.servlet",
                None,
                Some("https://github.com/jakartaee/servlet"),
                None,
                Some("-RELEASE"),
                TagSource::Version,
            )
        },
        rule(
            "jakarta.jms",
            None,
            Some("https://github.com/jakartaee/messaging"),
            None,
            Some("-RELEASE"),
            TagSource::Version,
        ),
        ReleaseIdRule {
            origin_contains: Some("eclipse-ee4j".to_string()),
            ..rule(
                "jakarta.transaction",
                None,
                Some("https://github.com/jakartaee/transactions"),
                None,
                None,
                TagSource::Version,
            )
        },
        rule(
            "jakarta.annotation",
            None,
            Some("https://github.com/jakartaee/common-annotations-api"),
            None,
            None,
            TagSource::Scm,
        ),
        rule("net.sf.jopt-simple", None, None, Some("jopt-simple-"), None, TagSource::Scm),
        rule(
            "org.sonatype.plexus",
            Some("plexus-sec-dispatcher"),
            Some("https://github.com/codehaus-plexus/plexus-sec-dispatcher"),
            Some("sec-dispatcher-"),
            None,
            TagSource::Scm,
        ),
        rule("io.rest-assured", None, None, Some("rest-assured-"), None, TagSource::Scm),
    ]
}

/// Detectors for the configured rules followed by the built-in ones.
pub fn detectors_for(configured: &[ReleaseIdRule]) -> Result<Vec<RuleDetector>, RelgraphError> {
    configured.iter().cloned().chain(builtin_rules()).map(RuleDetector::new).collect()
}

//! Artifact coordinates.
//!
//! An [`ArtifactCoords`] identifies a single buildable component by its
//! group, name, classifier, packaging type and version. Coordinates are used as
//! map keys throughout the resolver, so equality and ordering are structural.
//!
//! # String Form
//!
//! Coordinates parse from and render to a colon-separated form:
//!
//! - `group:name:version` (type `jar`, no classifier)
//! - `group:name:classifier:version` (type `jar`)
//! - `group:name:classifier:type:version`
//!
//! [`Display`](std::fmt::Display) always renders the full five-field form so
//! that two different coordinates never print the same way.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::RelgraphError;

/// Packaging type of a constraint manifest / build descriptor.
pub const TYPE_POM: &str = "pom";
/// Default packaging type of a binary artifact.
pub const TYPE_JAR: &str = "jar";
/// Classifier used by test artifacts.
pub const TESTS_CLASSIFIER: &str = "tests";

/// Identity of a component: group, name, classifier, type and version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactCoords {
    group_id: String,
    artifact_id: String,
    classifier: String,
    artifact_type: String,
    version: String,
}

impl ArtifactCoords {
    /// Create coordinates from all five fields. An empty type becomes `jar`.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        classifier: impl Into<String>,
        artifact_type: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        let artifact_type = artifact_type.into();
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            classifier: classifier.into(),
            artifact_type: if artifact_type.is_empty() {
                TYPE_JAR.to_string()
            } else {
                artifact_type
            },
            version: version.into(),
        }
    }

    /// Binary artifact coordinates with no classifier.
    pub fn jar(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::new(group_id, artifact_id, "", TYPE_JAR, version)
    }

    /// Manifest (build descriptor) coordinates.
    pub fn pom(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::new(group_id, artifact_id, "", TYPE_POM, version)
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    pub fn artifact_type(&self) -> &str {
        &self.artifact_type
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether these coordinates point at a manifest rather than a binary.
    pub fn is_manifest(&self) -> bool {
        self.artifact_type == TYPE_POM
    }

    /// The manifest that describes this artifact (itself if already a manifest).
    #[must_use]
    pub fn to_manifest(&self) -> Self {
        if self.is_manifest() && self.classifier.is_empty() {
            return self.clone();
        }
        Self::pom(&self.group_id, &self.artifact_id, &self.version)
    }

    pub fn gav(&self) -> Gav {
        Gav {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            version: self.version.clone(),
        }
    }

    /// Key used to match constraints regardless of version.
    pub fn versionless_key(&self) -> (&str, &str, &str, &str) {
        (&self.group_id, &self.artifact_id, &self.classifier, &self.artifact_type)
    }

    /// Copy of these coordinates with another version.
    #[must_use]
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..self.clone()
        }
    }

    /// Short form: `group:name:version` for plain jars, full form otherwise.
    pub fn to_compact_string(&self) -> String {
        if self.classifier.is_empty() && self.artifact_type == TYPE_JAR {
            format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for ArtifactCoords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.group_id, self.artifact_id, self.classifier, self.artifact_type, self.version
        )
    }
}

impl FromStr for ArtifactCoords {
    type Err = RelgraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        let invalid = || RelgraphError::InvalidCoordinates {
            input: s.to_string(),
        };
        let coords = match parts.as_slice() {
            [g, a, v] => Self::jar(*g, *a, *v),
            [g, a, c, v] => Self::new(*g, *a, *c, TYPE_JAR, *v),
            [g, a, c, t, v] => Self::new(*g, *a, *c, *t, *v),
            _ => return Err(invalid()),
        };
        if coords.group_id.is_empty() || coords.artifact_id.is_empty() || coords.version.is_empty()
        {
            return Err(invalid());
        }
        Ok(coords)
    }
}

impl TryFrom<String> for ArtifactCoords {
    type Error = RelgraphError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArtifactCoords> for String {
    fn from(coords: ArtifactCoords) -> Self {
        coords.to_string()
    }
}

/// Group, name and version of a component, ignoring classifier and type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Gav {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl fmt::Display for Gav {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

//! Release identity: the source revision a component is built from.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::ArtifactCoords;

/// Repository origin plus revision token.
///
/// Two components with equal `ReleaseId` come from the same source checkout
/// and are grouped into one release. An identity without an origin is legal;
/// it still groups structurally but carries no checkout information.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReleaseId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    origin: Option<String>,
    revision: String,
}

impl ReleaseId {
    /// Identity for a repository URL and tag (or commit / branch).
    pub fn for_scm_and_tag(url: impl Into<String>, tag: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            origin: if url.trim().is_empty() {
                None
            } else {
                Some(normalize_url(&url))
            },
            revision: tag.into(),
        }
    }

    /// Identity with no known origin, keyed by group, name and version.
    pub fn unknown(coords: &ArtifactCoords) -> Self {
        Self {
            origin: None,
            revision: coords.gav().to_string(),
        }
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            Some(origin) => write!(f, "{origin}#{}", self.revision),
            None => write!(f, "<unknown>#{}", self.revision),
        }
    }
}

/// Strips SCM provider prefixes and a trailing `.git` / `/`.
fn normalize_url(url: &str) -> String {
    let mut url = url.trim();
    for prefix in ["scm:git:", "scm:"] {
        if let Some(rest) = url.strip_prefix(prefix) {
            url = rest;
        }
    }
    let url = url.trim_end_matches('/');
    url.strip_suffix(".git").unwrap_or(url).to_string()
}

//! Coordinate pattern matching for inclusion policies.
//!
//! Include and exclude rules are written as coordinate patterns where every
//! field is a glob. Patterns are compiled once per run (when the policy is
//! built) and then matched against every visited coordinate.
//!
//! # Pattern Syntax
//!
//! A pattern has the same shape as coordinates, with missing trailing fields
//! matching anything:
//!
//! - `group`: any artifact in the group
//! - `group:name`
//! - `group:name:version`
//! - `group:name:classifier:version`
//! - `group:name:classifier:type:version`
//!
//! Each field supports the usual glob syntax (`*`, `?`, `[a-z]`). An empty field
//! or a lone `*` matches any value, including the empty classifier.
//!
//! # Examples
//!
//! ```rust,no_run
//! use relgraph_cli::core::ArtifactCoords;
//! use relgraph_cli::pattern::ArtifactCoordsPattern;
//!
//! # fn example() -> anyhow::Result<()> {
//! let pattern = ArtifactCoordsPattern::parse("com.acme:internal-*")?;
//! assert!(pattern.matches(&ArtifactCoords::jar("com.acme", "internal-tools", "1.0")));
//! assert!(!pattern.matches(&ArtifactCoords::jar("com.acme", "foo", "1.0")));
//! # Ok(())
//! # }
//! ```

use glob::Pattern;
use std::fmt;
use tracing::trace;

use crate::core::{ArtifactCoords, RelgraphError};

/// Compiled glob over a single coordinate field. `None` matches anything.
#[derive(Debug, Clone)]
struct FieldPattern(Option<Pattern>);

impl FieldPattern {
    fn compile(field: &str, original: &str) -> Result<Self, RelgraphError> {
        if field.is_empty() || field == "*" {
            return Ok(Self(None));
        }
        Pattern::new(field).map(|p| Self(Some(p))).map_err(|e| RelgraphError::InvalidPattern {
            pattern: original.to_string(),
            reason: e.to_string(),
        })
    }

    fn matches(&self, value: &str) -> bool {
        self.0.as_ref().is_none_or(|p| p.matches(value))
    }

    fn as_str(&self) -> &str {
        self.0.as_ref().map_or("*", Pattern::as_str)
    }
}

/// Glob pattern over the five coordinate fields.
#[derive(Debug, Clone)]
pub struct ArtifactCoordsPattern {
    group_id: FieldPattern,
    artifact_id: FieldPattern,
    classifier: FieldPattern,
    artifact_type: FieldPattern,
    version: FieldPattern,
}

impl ArtifactCoordsPattern {
    /// Compile a pattern string.
    ///
    /// # Errors
    ///
    /// Returns [`RelgraphError::InvalidPattern`] for an empty pattern, more than
    /// five fields, or a field with invalid glob syntax.
    pub fn parse(pattern: &str) -> Result<Self, RelgraphError> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(RelgraphError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "empty pattern".to_string(),
            });
        }
        let parts: Vec<&str> = trimmed.split(':').collect();
        let (g, a, c, t, v) = match parts.as_slice() {
            [g] => (*g, "*", "*", "*", "*"),
            [g, a] => (*g, *a, "*", "*", "*"),
            [g, a, v] => (*g, *a, "*", "*", *v),
            [g, a, c, v] => (*g, *a, *c, "*", *v),
            [g, a, c, t, v] => (*g, *a, *c, *t, *v),
            _ => {
                return Err(RelgraphError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: "expected at most five ':'-separated fields".to_string(),
                });
            }
        };
        Ok(Self {
            group_id: FieldPattern::compile(g, pattern)?,
            artifact_id: FieldPattern::compile(a, pattern)?,
            classifier: FieldPattern::compile(c, pattern)?,
            artifact_type: FieldPattern::compile(t, pattern)?,
            version: FieldPattern::compile(v, pattern)?,
        })
    }

    /// Pattern that matches exactly the given coordinates.
    ///
    /// Glob metacharacters in the coordinates are escaped.
    pub fn exact(coords: &ArtifactCoords) -> Self {
        let literal = |value: &str| {
            if value.is_empty() {
                // An empty classifier must only match the empty classifier.
                FieldPattern(Pattern::new("").ok())
            } else {
                FieldPattern(Pattern::new(&Pattern::escape(value)).ok())
            }
        };
        Self {
            group_id: literal(coords.group_id()),
            artifact_id: literal(coords.artifact_id()),
            classifier: literal(coords.classifier()),
            artifact_type: literal(coords.artifact_type()),
            version: literal(coords.version()),
        }
    }

    pub fn matches(&self, coords: &ArtifactCoords) -> bool {
        self.group_id.matches(coords.group_id())
            && self.artifact_id.matches(coords.artifact_id())
            && self.classifier.matches(coords.classifier())
            && self.artifact_type.matches(coords.artifact_type())
            && self.version.matches(coords.version())
    }
}

impl fmt::Display for ArtifactCoordsPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.group_id.as_str(),
            self.artifact_id.as_str(),
            self.classifier.as_str(),
            self.artifact_type.as_str(),
            self.version.as_str()
        )
    }
}

/// Ordered list of patterns; matches when any member matches.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<ArtifactCoordsPattern>,
}

impl PatternSet {
    pub const fn new() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Compile every pattern string, failing on the first invalid one.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, RelgraphError> {
        let patterns = patterns
            .iter()
            .map(|p| ArtifactCoordsPattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns,
        })
    }

    pub fn push(&mut self, pattern: ArtifactCoordsPattern) {
        self.patterns.push(pattern);
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn matches(&self, coords: &ArtifactCoords) -> bool {
        let matched = self.patterns.iter().find(|p| p.matches(coords));
        if let Some(pattern) = matched {
            trace!("{} matched by {}", coords, pattern);
        }
        matched.is_some()
    }
}

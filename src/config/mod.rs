//! Resolution policy configuration.
//!
//! The policy is loaded from a TOML file (by default `relgraph.toml` in the
//! working directory), optionally overridden from the command line, and then
//! compiled into an immutable [`InclusionPolicy`] snapshot for a single run.
//!
//! # File Format
//!
//! ```toml
//! project-bom = "org.acme:acme-bom::pom:1.0"
//! include-patterns = ["org.acme*"]
//! exclude-patterns = ["org.acme:internal-*"]
//! exclude-scopes = ["provided", "test"]
//! level = -1
//! warn-on-missing-scm = true
//!
//! [[release-id-rules]]
//! group-id = "org.thirdparty"
//! repository = "https://github.com/thirdparty/thirdparty"
//! tag-prefix = "thirdparty-"
//! ```

pub mod policy;

pub use policy::InclusionPolicy;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::core::{ArtifactCoords, RelgraphError};

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "relgraph.toml";

/// Versions produced by a prior production build.
pub const DEFAULT_ALREADY_BUILT_PATTERN: &str = r"[.-]redhat-\d+";

fn default_exclude_scopes() -> BTreeSet<String> {
    ["provided", "test"].into_iter().map(String::from).collect()
}

const fn default_level() -> i32 {
    -1
}

const fn default_true() -> bool {
    true
}

fn default_already_built_pattern() -> String {
    DEFAULT_ALREADY_BUILT_PATTERN.to_string()
}

/// Externally loaded policy configuration.
///
/// Every field has a default so an empty file is a valid (if rootless) config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ResolverConfig {
    /// Constraint manifest whose managed dependencies are enforced and, when
    /// no project artifacts are listed, become the roots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_bom: Option<ArtifactCoords>,

    /// Additional constraint manifests enforced during collection.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_project_boms: Vec<ArtifactCoords>,

    /// Explicit root artifacts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub project_artifacts: Vec<ArtifactCoords>,

    /// Artifacts processed as extra roots and always treated as included.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_artifacts: Vec<ArtifactCoords>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_patterns: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_patterns: Vec<String>,

    /// Dependency scopes dropped by the tree collector.
    #[serde(default = "default_exclude_scopes")]
    pub exclude_scopes: BTreeSet<String>,

    /// Traversal depth limit; negative means unlimited.
    #[serde(default = "default_level")]
    pub level: i32,

    /// Glob patterns a root version must match (all versions when empty).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub root_versions: Vec<String>,

    #[serde(default = "default_true")]
    pub include_non_managed: bool,

    #[serde(default)]
    pub include_optional_deps: bool,

    #[serde(default)]
    pub include_test_jars: bool,

    #[serde(default)]
    pub include_already_built: bool,

    #[serde(default)]
    pub exclude_parent_poms: bool,

    #[serde(default)]
    pub exclude_bom_imports: bool,

    #[serde(default)]
    pub warn_on_resolution_errors: bool,

    #[serde(default)]
    pub warn_on_missing_scm: bool,

    /// Track depth-limited and rejected subtrees as "remaining".
    #[serde(default)]
    pub log_remaining: bool,

    #[serde(default)]
    pub log_non_managed_visited: bool,

    /// Log a closing summary of the run.
    #[serde(default)]
    pub log_summary: bool,

    /// Render every traversed tree through the logging visitor.
    #[serde(default)]
    pub log_trees: bool,

    /// Regex over versions identifying already-built artifacts.
    #[serde(default = "default_already_built_pattern")]
    pub already_built_version_pattern: String,

    /// Release identity rewrite rules, tried before the built-in ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub release_id_rules: Vec<ReleaseIdRule>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            project_bom: None,
            non_project_boms: Vec::new(),
            project_artifacts: Vec::new(),
            include_artifacts: Vec::new(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            exclude_scopes: default_exclude_scopes(),
            level: default_level(),
            root_versions: Vec::new(),
            include_non_managed: true,
            include_optional_deps: false,
            include_test_jars: false,
            include_already_built: false,
            exclude_parent_poms: false,
            exclude_bom_imports: false,
            warn_on_resolution_errors: false,
            warn_on_missing_scm: false,
            log_remaining: false,
            log_non_managed_visited: false,
            log_summary: false,
            log_trees: false,
            already_built_version_pattern: default_already_built_pattern(),
            release_id_rules: Vec::new(),
        }
    }
}

/// Where a rewritten release identity takes its revision from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagSource {
    /// The revision declared in the descriptor's `scm` section.
    #[default]
    Scm,
    /// The artifact version.
    Version,
}

/// Data-driven release identity rewrite for a group (and optionally a name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ReleaseIdRule {
    pub group_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,

    /// Canonical repository URL that replaces the declared one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_suffix: Option<String>,

    #[serde(default)]
    pub tag_source: TagSource,

    /// Only rewrite when the declared origin contains this text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_contains: Option<String>,
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub project_bom: Option<ArtifactCoords>,
    pub roots: Vec<ArtifactCoords>,
    pub level: Option<i32>,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub include_non_managed: Option<bool>,
    pub include_optional_deps: bool,
    pub include_already_built: bool,
    pub warn_on_resolution_errors: bool,
    pub warn_on_missing_scm: bool,
    pub log_remaining: bool,
    pub log_summary: bool,
    pub log_trees: bool,
}

impl ResolverConfig {
    /// Load the config from `path`, or from [`DEFAULT_CONFIG_FILE`] if present.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file yields [`ResolverConfig::default`].
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(RelgraphError::ConfigNotFound {
                        path: path.display().to_string(),
                    }
                    .into());
                }
                Self::load_from(path).await
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::load_from(&path).await
                } else {
                    tracing::debug!("No {} found, using the default policy", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read policy config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .map_err(RelgraphError::from)
            .with_context(|| format!("Failed to parse policy config from {}", path.display()))?;
        tracing::debug!("Loaded policy config from {}", path.display());
        Ok(config)
    }

    /// Apply command-line overrides. List overrides extend, scalars replace.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if overrides.project_bom.is_some() {
            self.project_bom = overrides.project_bom;
        }
        if !overrides.roots.is_empty() {
            self.project_artifacts = overrides.roots;
        }
        if let Some(level) = overrides.level {
            self.level = level;
        }
        self.include_patterns.extend(overrides.include_patterns);
        self.exclude_patterns.extend(overrides.exclude_patterns);
        if let Some(include_non_managed) = overrides.include_non_managed {
            self.include_non_managed = include_non_managed;
        }
        self.include_optional_deps |= overrides.include_optional_deps;
        self.include_already_built |= overrides.include_already_built;
        self.warn_on_resolution_errors |= overrides.warn_on_resolution_errors;
        self.warn_on_missing_scm |= overrides.warn_on_missing_scm;
        self.log_remaining |= overrides.log_remaining;
        self.log_summary |= overrides.log_summary;
        self.log_trees |= overrides.log_trees;
    }

    /// Compile the config into the immutable per-run policy.
    pub fn policy(&self) -> Result<InclusionPolicy, RelgraphError> {
        InclusionPolicy::from_config(self)
    }
}

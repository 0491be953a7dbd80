//! Argument groups and helpers shared by the commands.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{ConfigOverrides, ResolverConfig};
use crate::core::ArtifactCoords;
use crate::provider::registry::RegistrySnapshot;
use crate::resolver::{ProjectDependencyResolver, Resolution};
use crate::utils::progress::ProgressBar;

/// Global options resolved once per invocation.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    pub config_path: Option<PathBuf>,
    pub show_progress: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Registry location and policy overrides.
#[derive(Debug, Clone, Args)]
pub struct PolicyArgs {
    /// Registry snapshot (JSON, YAML or TOML)
    #[arg(long, value_name = "FILE")]
    pub registry: PathBuf,

    /// Project BOM whose managed dependencies are enforced
    #[arg(long, value_name = "COORDS")]
    pub bom: Option<ArtifactCoords>,

    /// Root artifacts, replacing the configured project artifacts
    #[arg(long, value_name = "COORDS", value_delimiter = ',')]
    pub roots: Vec<ArtifactCoords>,

    /// Traversal depth limit, negative for unlimited
    #[arg(long, allow_negative_numbers = true)]
    pub level: Option<i32>,

    /// Include pattern (repeatable)
    #[arg(long = "include", value_name = "PATTERN")]
    pub include_patterns: Vec<String>,

    /// Exclude pattern (repeatable)
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub exclude_patterns: Vec<String>,

    /// Accept dependencies not governed by a BOM
    #[arg(long, value_name = "BOOL")]
    pub include_non_managed: Option<bool>,

    /// Follow optional dependencies
    #[arg(long)]
    pub include_optional: bool,

    /// Keep artifacts produced by a prior production build
    #[arg(long)]
    pub include_already_built: bool,

    /// Drop unresolvable artifacts with a warning instead of failing
    #[arg(long)]
    pub warn_on_resolution_errors: bool,

    /// Use an unknown release instead of failing when no SCM is found
    #[arg(long)]
    pub warn_on_missing_scm: bool,

    /// Report artifacts below the depth limit or a rejected node
    #[arg(long)]
    pub log_remaining: bool,

    /// Log a summary of the run, including non-managed artifacts visited
    #[arg(long)]
    pub log_summary: bool,

    /// Log every traversed dependency tree
    #[arg(long)]
    pub log_trees: bool,
}

impl PolicyArgs {
    pub fn to_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            project_bom: self.bom.clone(),
            roots: self.roots.clone(),
            level: self.level,
            include_patterns: self.include_patterns.clone(),
            exclude_patterns: self.exclude_patterns.clone(),
            include_non_managed: self.include_non_managed,
            include_optional_deps: self.include_optional,
            include_already_built: self.include_already_built,
            warn_on_resolution_errors: self.warn_on_resolution_errors,
            warn_on_missing_scm: self.warn_on_missing_scm,
            log_remaining: self.log_remaining,
            log_summary: self.log_summary,
            log_trees: self.log_trees,
        }
    }

    /// Load the policy and registry, then run a resolution.
    pub async fn resolve(&self, context: &CommandContext) -> Result<Resolution> {
        let mut config = ResolverConfig::load_or_default(context.config_path.as_deref()).await?;
        config.apply_overrides(self.to_overrides());
        let registry = load_registry(&self.registry).await?;

        let progress = if context.show_progress {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };
        let resolution = ProjectDependencyResolver::new(&config, &registry, &registry)?
            .with_progress(progress)
            .resolve()?;
        Ok(resolution)
    }
}

async fn load_registry(path: &Path) -> Result<RegistrySnapshot> {
    let registry = RegistrySnapshot::load(path)
        .await
        .with_context(|| format!("Failed to load registry snapshot {}", path.display()))?;
    debug!("Registry snapshot has {} artifacts", registry.artifact_count());
    Ok(registry)
}

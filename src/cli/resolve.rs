//! Resolve the release graph and report it.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::common::{CommandContext, OutputFormat, PolicyArgs};
use crate::core::{Diagnostic, ReleaseId};
use crate::release_id::DetectionStats;
use crate::resolver::{ReleaseNode, Resolution};

#[derive(Args)]
pub struct ResolveCommand {
    #[command(flatten)]
    pub(crate) policy: PolicyArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,

    /// Also print the code repository dependency tree
    #[arg(long)]
    pub(crate) tree: bool,
}

#[derive(Debug, Serialize)]
struct ArtifactReport {
    coords: String,
    repositories: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ReleaseReport {
    id: String,
    origin: Option<String>,
    revision: String,
    orderable: bool,
    artifacts: Vec<ArtifactReport>,
    dependencies: Vec<String>,
}

impl ReleaseReport {
    fn new(node: &ReleaseNode, resolution: &Resolution, orderable: bool) -> Self {
        let id = node.id();
        Self {
            id: id.to_string(),
            origin: id.origin().map(String::from),
            revision: id.revision().to_string(),
            orderable,
            artifacts: node
                .artifacts()
                .iter()
                .map(|(coords, repositories)| ArtifactReport {
                    coords: coords.to_string(),
                    repositories: repositories.iter().map(|r| r.url.clone()).collect(),
                })
                .collect(),
            dependencies: resolution
                .releases
                .dependencies(id)
                .into_iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    releases: usize,
    artifacts: usize,
    cycles: usize,
    skipped: usize,
    remaining: usize,
    already_built: usize,
    diagnostics: usize,
}

#[derive(Debug, Serialize)]
struct ResolveReport<'r> {
    releases: Vec<ReleaseReport>,
    cycles: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tree: Option<String>,
    remaining: Vec<String>,
    non_managed_visited: Vec<String>,
    already_built: Vec<String>,
    diagnostics: &'r [Diagnostic],
    detection: &'r DetectionStats,
    summary: Summary,
}

impl<'r> ResolveReport<'r> {
    fn build(resolution: &'r Resolution, tree: bool) -> Self {
        let order = resolution.build_order();
        let report_of = |id: &ReleaseId, orderable: bool| {
            resolution.releases.get(id).map(|node| ReleaseReport::new(node, resolution, orderable))
        };
        let releases = order
            .ordered
            .iter()
            .filter_map(|id| report_of(id, true))
            .chain(order.unorderable.iter().filter_map(|id| report_of(id, false)))
            .collect();

        Self {
            releases,
            cycles: cycle_strings(&resolution.cycles),
            tree: tree.then(|| resolution.releases.to_tree_string()),
            remaining: display_all(&resolution.remaining),
            non_managed_visited: display_all(&resolution.non_managed_visited),
            already_built: display_all(&resolution.already_built),
            diagnostics: &resolution.diagnostics,
            detection: &resolution.detection_stats,
            summary: Summary {
                releases: resolution.releases.len(),
                artifacts: resolution.components.len(),
                cycles: resolution.cycles.len(),
                skipped: resolution.skipped.len(),
                remaining: resolution.remaining.len(),
                already_built: resolution.already_built.len(),
                diagnostics: resolution.diagnostics.len(),
            },
        }
    }

    fn print_text(&self) {
        println!("{}", "Releases in build order:".bold());
        for (index, release) in self.releases.iter().enumerate() {
            let marker = if release.orderable {
                format!("{:>3}.", index + 1)
            } else {
                "  !".red().to_string()
            };
            println!("{marker} {}", release.id.cyan());
            for artifact in &release.artifacts {
                println!("       {}", artifact.coords);
            }
        }

        if !self.cycles.is_empty() {
            println!();
            println!("{}", "Release cycles:".yellow().bold());
            for cycle in &self.cycles {
                println!("  {}", cycle_line(cycle));
            }
        }

        if let Some(tree) = &self.tree {
            println!();
            println!("{}", "Code repository tree:".bold());
            print!("{tree}");
        }

        print_list("Remaining artifacts:", &self.remaining);
        print_list("Non-managed artifacts visited:", &self.non_managed_visited);
        print_list("Already built artifacts:", &self.already_built);

        if !self.diagnostics.is_empty() {
            println!();
            println!("{}", "Warnings:".yellow().bold());
            for diagnostic in self.diagnostics {
                println!("  {diagnostic}");
            }
        }

        let s = &self.summary;
        println!();
        println!(
            "{} {} release(s), {} artifact(s), {} cycle(s), {} skipped, {} warning(s)",
            "Summary:".bold(),
            s.releases,
            s.artifacts,
            s.cycles,
            s.skipped,
            s.diagnostics
        );
        println!(
            "Release detection: {} attempted, {} succeeded, {} failed",
            self.detection.attempted, self.detection.succeeded, self.detection.failed
        );
    }
}

fn display_all<'i, T: ToString + 'i>(items: impl IntoIterator<Item = &'i T>) -> Vec<String> {
    items.into_iter().map(ToString::to_string).collect()
}

pub(super) fn cycle_strings(cycles: &[Vec<ReleaseId>]) -> Vec<Vec<String>> {
    cycles.iter().map(|c| c.iter().map(ToString::to_string).collect()).collect()
}

/// `a -> b -> a`
pub(super) fn cycle_line(cycle: &[String]) -> String {
    let mut chain = cycle.to_vec();
    if let Some(first) = cycle.first() {
        chain.push(first.clone());
    }
    chain.join(" -> ")
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!();
    println!("{}", title.bold());
    for item in items {
        println!("  {item}");
    }
}

impl ResolveCommand {
    pub async fn execute(self, context: &CommandContext) -> Result<()> {
        let resolution = self.policy.resolve(context).await?;
        let report = ResolveReport::build(&resolution, self.tree);
        match self.format {
            OutputFormat::Text => report.print_text(),
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&report)
                    .context("Failed to serialize the resolution report")?;
                println!("{json}");
            }
        }
        Ok(())
    }
}

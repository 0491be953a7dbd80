//! Print the release build order.
//!
//! Cycles never make the command fail; releases on or behind a cycle are
//! listed separately as unorderable.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::common::{CommandContext, OutputFormat, PolicyArgs};
use super::resolve::{cycle_line, cycle_strings};
use crate::resolver::Resolution;

#[derive(Args)]
pub struct OrderCommand {
    #[command(flatten)]
    policy: PolicyArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct OrderReport {
    order: Vec<String>,
    unorderable: Vec<String>,
    cycles: Vec<Vec<String>>,
}

impl OrderReport {
    fn build(resolution: &Resolution) -> Self {
        let order = resolution.build_order();
        Self {
            order: order.ordered.iter().map(ToString::to_string).collect(),
            unorderable: order.unorderable.iter().map(ToString::to_string).collect(),
            cycles: cycle_strings(&resolution.cycles),
        }
    }
}

impl OrderCommand {
    pub async fn execute(self, context: &CommandContext) -> Result<()> {
        let resolution = self.policy.resolve(context).await?;
        let report = OrderReport::build(&resolution);
        match self.format {
            OutputFormat::Text => {
                for release in &report.order {
                    println!("{release}");
                }
                if !report.unorderable.is_empty() {
                    eprintln!(
                        "{} {} release(s) cannot be ordered:",
                        "warning:".yellow().bold(),
                        report.unorderable.len()
                    );
                    for release in &report.unorderable {
                        eprintln!("  {release}");
                    }
                    for cycle in &report.cycles {
                        eprintln!("  cycle: {}", cycle_line(cycle));
                    }
                }
            }
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&report)
                    .context("Failed to serialize the build order")?;
                println!("{json}");
            }
        }
        Ok(())
    }
}

//! Command-line interface for relgraph.
//!
//! # Available Commands
//!
//! - `resolve` - Resolve the release graph and report releases, cycles and
//!   diagnostics
//! - `order` - Print the order in which releases must be rebuilt
//!
//! # Usage
//!
//! ```bash
//! # Resolve using relgraph.toml from the working directory
//! relgraph resolve --registry registry.json
//!
//! # Override the policy from the command line
//! relgraph -c policy.toml resolve --registry registry.json --level 2 --log-remaining
//!
//! # Machine-readable build order
//! relgraph order --registry registry.json --format json
//! ```
//!
//! # Global Options
//!
//! - `--verbose` / `-v`: debug logging
//! - `--quiet` / `-q`: errors only, no progress bar
//! - `--no-progress`: hide the progress bar
//! - `--config` / `-c`: policy file (default `relgraph.toml` when present)
//!
//! `RUST_LOG` takes precedence over `--verbose` and `--quiet`.

mod common;
mod order;
mod resolve;

pub use common::{CommandContext, OutputFormat, PolicyArgs};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "relgraph",
    about = "Release dependency graph resolver",
    version,
    long_about = "relgraph walks the dependency trees of a project's artifacts, groups every \
                  artifact that must be rebuilt by the source release it comes from, and \
                  orders those releases for rebuilding."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors and hide the progress bar
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the policy file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the release graph and report it
    Resolve(resolve::ResolveCommand),

    /// Print the release build order
    Order(order::OrderCommand),
}

impl Cli {
    /// Default log level implied by the global flags.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }

    pub fn build_context(&self) -> CommandContext {
        CommandContext {
            config_path: self.config.clone(),
            show_progress: !(self.quiet || self.no_progress),
        }
    }

    pub async fn execute(self) -> Result<()> {
        let context = self.build_context();
        match self.command {
            Commands::Resolve(cmd) => cmd.execute(&context).await,
            Commands::Order(cmd) => cmd.execute(&context).await,
        }
    }
}

//! Library-level test suite for relgraph.
//!
//! These tests drive [`ProjectDependencyResolver`](relgraph_cli::resolver::ProjectDependencyResolver)
//! end to end against in-memory registry snapshots built with the
//! `test-utils` fixtures. No binary is spawned.
//!
//! # Running
//!
//! ```bash
//! cargo test --test unit
//! ```
//!
//! # Organization
//!
//! - **resolution**: inclusion policy, depth limits, manifest ancestry, BOM roots
//! - **build_order**: cycles, pruning and release ordering
//! - **hooks**: custom release-id detectors and tree visitors

mod build_order;
mod hooks;
mod resolution;

use relgraph_cli::config::ResolverConfig;
use relgraph_cli::provider::registry::RegistrySnapshot;
use relgraph_cli::resolver::{ProjectDependencyResolver, Resolution};
use relgraph_cli::test_utils::coords;

/// Config rooted at the given coordinates, everything else default.
pub fn rooted_at(roots: &[&str]) -> ResolverConfig {
    ResolverConfig {
        project_artifacts: roots.iter().map(|r| coords(r)).collect(),
        ..ResolverConfig::default()
    }
}

pub fn resolve(config: &ResolverConfig, registry: &RegistrySnapshot) -> Resolution {
    relgraph_cli::test_utils::init_test_logging(None);
    ProjectDependencyResolver::new(config, registry, registry)
        .expect("policy should compile")
        .resolve()
        .expect("resolution should succeed")
}

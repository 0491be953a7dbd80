//! Integration test suite for relgraph
//!
//! End-to-end tests that run the `relgraph` binary against registry snapshots
//! and policy files written into a temporary project directory.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **resolve**: `relgraph resolve` text and JSON reports
//! - **order**: `relgraph order` output, including cyclic graphs
//! - **errors**: exit codes and messages for bad input

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod errors;
mod order;
mod resolve;

use relgraph_cli::test_utils::RegistryFixture;

/// `app -> core -> util`, each from its own repository.
pub fn chain_registry() -> RegistryFixture {
    RegistryFixture::new()
        .artifact("org.acme:app:1.0", "acme/app", &["org.acme:core:1.0"])
        .artifact("org.acme:core:1.0", "acme/core", &["org.acme:util:1.0"])
        .artifact("org.acme:util:1.0", "acme/util", &[])
}

//! relgraph: release dependency graph resolution.
//!
//! Given a set of root artifacts and an inclusion policy, relgraph computes
//! every artifact that must be rebuilt from source, groups those artifacts by
//! the source release they come from, and orders the releases so that each
//! is built after the releases it depends on. Release cycles are reported as
//! chains rather than failing the run.
//!
//! # Modules
//!
//! - [`core`] - Coordinates, release identities, errors and diagnostics
//! - [`pattern`] - Glob patterns over artifact coordinates
//! - [`config`] - Policy configuration and the compiled inclusion policy
//! - [`provider`] - Collaborator traits and the registry snapshot provider
//! - [`release_id`] - Release identity detection chain
//! - [`resolver`] - Tree walk, manifest closure and the release graph
//! - [`cli`] - Command-line interface
//! - [`utils`] - Progress reporting

pub mod cli;
pub mod config;
pub mod core;
pub mod pattern;
pub mod provider;
pub mod release_id;
pub mod resolver;
pub mod utils;

// Fixtures shared by unit tests and the test suites
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

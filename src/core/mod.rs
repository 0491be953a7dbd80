//! Core types and error handling for relgraph
//!
//! This module holds the value types every other module keys on, and the error
//! machinery shared across the crate.
//!
//! - [`ArtifactCoords`] identifies a component (group, name, classifier, type, version)
//! - [`ReleaseId`] identifies the source revision a component is built from
//! - [`RelgraphError`] enumerates fatal failures; [`ErrorContext`] decorates them for display
//! - [`Diagnostic`] records non-fatal conditions collected during a run

pub mod coords;
pub mod diagnostics;
pub mod error;
pub mod release;

pub use coords::{ArtifactCoords, Gav, TESTS_CLASSIFIER, TYPE_JAR, TYPE_POM};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{ErrorContext, RelgraphError, user_friendly_error};
pub use release::ReleaseId;

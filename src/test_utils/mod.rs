//! Test utilities for relgraph
//!
//! Shared by the unit tests in `src/` and the `unit` and `integration` test
//! suites (through the `test-utils` feature).
//!
//! # Example
//!
//! ```rust,no_run
//! use relgraph_cli::test_utils::{RegistryFixture, init_test_logging};
//!
//! init_test_logging(None);
//! let registry = RegistryFixture::new()
//!     .artifact("org.acme:app:1.0", "acme/app", &["org.acme:core:1.0"])
//!     .artifact("org.acme:core:1.0", "acme/core", &[])
//!     .build();
//! ```

pub mod fixtures;

pub use fixtures::{PolicyFixture, RegistryFixture, coords, release};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests, once per process.
///
/// Uses `level` when given, else `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=relgraph_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

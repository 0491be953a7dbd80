//! Shared utilities
//!
//! - [`progress`] - Progress bars for long-running resolution runs

pub mod progress;

pub use progress::ProgressBar;

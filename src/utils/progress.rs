//! Progress reporting for resolution runs
//!
//! A thin wrapper over `indicatif` with one consistent style. Bars are hidden
//! when the `RELGRAPH_NO_PROGRESS` environment variable is set, or when the
//! caller asks for a hidden bar (`--quiet`, `--no-progress`, library use).
//!
//! # Examples
//!
//! ```rust
//! use relgraph_cli::utils::progress::ProgressBar;
//!
//! let progress = ProgressBar::hidden();
//! progress.set_length(3);
//! for root in ["a", "b", "c"] {
//!     progress.set_message(root);
//!     progress.inc(1);
//! }
//! progress.finish_and_clear();
//! ```

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};

/// Environment variable that disables every progress bar.
pub const NO_PROGRESS_ENV: &str = "RELGRAPH_NO_PROGRESS";

fn is_progress_disabled() -> bool {
    std::env::var_os(NO_PROGRESS_ENV).is_some()
}

/// Progress bar over a known number of work units.
#[derive(Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Visible bar of `len` units unless disabled by the environment.
    pub fn new(len: u64) -> Self {
        let bar = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new(len);
            bar.set_style(default_style());
            bar
        };
        Self {
            inner: bar,
        }
    }

    /// A bar that ignores every update.
    pub fn hidden() -> Self {
        Self {
            inner: IndicatifBar::hidden(),
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.inner.is_hidden()
    }

    pub fn set_length(&self, len: u64) {
        self.inner.set_length(len);
    }

    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.inner.set_prefix(prefix.into());
    }

    pub fn inc(&self, delta: u64) {
        self.inner.inc(delta);
    }

    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.inner.finish_with_message(msg.into());
    }

    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}

fn default_style() -> IndicatifStyle {
    IndicatifStyle::default_bar()
        .template("{prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("━╸━"))
        .unwrap_or_else(|_| IndicatifStyle::default_bar())
}

//! Error handling for relgraph
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`RelgraphError`]) for everything the library
//!    can fail on, so callers can match on the failure mode.
//! 2. **User-friendly messages** ([`ErrorContext`]) for the CLI, carrying
//!    details and an actionable suggestion.
//!
//! Only fatal conditions are errors. Non-fatal conditions (a dropped
//! coordinate, an unresolvable import expression, a missing SCM entry in
//! warn mode) are collected as [`Diagnostic`](crate::core::Diagnostic)s and
//! returned alongside the resolution result.
//!
//! # Examples
//!
//! ```rust,no_run
//! use relgraph_cli::core::{RelgraphError, user_friendly_error};
//!
//! let error = RelgraphError::InvalidPolicy {
//!     reason: "no root artifacts".to_string(),
//! };
//! user_friendly_error(anyhow::Error::from(error)).display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::core::ArtifactCoords;

/// The main error type for relgraph operations.
#[derive(Error, Debug)]
pub enum RelgraphError {
    /// The dependency tree of a coordinate could not be collected.
    ///
    /// Fatal unless `warn-on-resolution-errors` is enabled.
    #[error("Failed to resolve {coords}{}: {reason}", root_suffix(.root.as_ref()))]
    ResolutionFailed {
        /// Coordinate that failed
        coords: ArtifactCoords,
        /// Root artifact whose traversal reached the coordinate
        root: Option<ArtifactCoords>,
        /// Underlying failure
        reason: String,
    },

    /// A build descriptor could not be fetched or read.
    #[error("Failed to read the descriptor of {coords}: {reason}")]
    DescriptorUnavailable {
        /// Manifest coordinates
        coords: ArtifactCoords,
        /// Underlying failure
        reason: String,
    },

    /// No release identity could be determined for a coordinate.
    ///
    /// Fatal unless `warn-on-missing-scm` is enabled.
    #[error("Failed to determine the SCM revision of {coords}: {reason}")]
    ReleaseIdDetectionFailed {
        /// Coordinate that failed
        coords: ArtifactCoords,
        /// Underlying failure
        reason: String,
    },

    /// The policy cannot produce a resolution run.
    #[error("Invalid resolution policy: {reason}")]
    InvalidPolicy {
        /// What is wrong with the policy
        reason: String,
    },

    /// An include/exclude pattern or version pattern failed to compile.
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// A coordinate string could not be parsed.
    #[error("Invalid artifact coordinates '{input}', expected group:name[:classifier[:type]]:version")]
    InvalidCoordinates {
        /// The offending input
        input: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// Configuration file missing
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was looked up
        path: String,
    },

    /// A registry snapshot document is malformed.
    #[error("Invalid registry snapshot {file}: {reason}")]
    RegistryParseError {
        /// Snapshot file
        file: String,
        /// Parser message
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

fn root_suffix(root: Option<&ArtifactCoords>) -> String {
    match root {
        Some(root) => format!(" (reached from root {root})"),
        None => String::new(),
    }
}

/// Error wrapper with a suggestion and details for terminal display.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: RelgraphError,
    /// Full context chain, when callers wrapped the error
    pub context: Option<String>,
    /// What the user can do about it
    pub suggestion: Option<String>,
    /// Extra explanation
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: RelgraphError) -> Self {
        Self {
            error,
            context: None,
            suggestion: None,
            details: None,
        }
    }

    /// Headline: the context chain if there is one, else the error itself.
    pub fn headline(&self) -> String {
        self.context.clone().unwrap_or_else(|| self.error.to_string())
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.headline());

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.headline())?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with a suggestion where one is known.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let message = format!("{error:#}");
    match error.downcast::<RelgraphError>() {
        Ok(error) => {
            let wrapped = message != error.to_string();
            let mut ctx = create_error_context(error);
            if wrapped {
                ctx.context = Some(message);
            }
            ctx
        }
        Err(error) => {
            if let Some(io_error) = error.downcast_ref::<std::io::Error>()
                && io_error.kind() == std::io::ErrorKind::NotFound
            {
                return ErrorContext::new(RelgraphError::Other {
                    message,
                })
                .with_suggestion("Check that the file exists and the path is correct");
            }
            ErrorContext::new(RelgraphError::Other {
                message,
            })
        }
    }
}

fn create_error_context(error: RelgraphError) -> ErrorContext {
    match &error {
        RelgraphError::ResolutionFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Pass --warn-on-resolution-errors to drop unresolvable artifacts instead of aborting")
            .with_details("The registry snapshot has no entry for this artifact or one of its descriptors"),
        RelgraphError::ReleaseIdDetectionFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Add a release-id rule for the artifact's group or pass --warn-on-missing-scm")
            .with_details("Neither a detector nor the descriptor's scm section identified the source revision"),
        RelgraphError::InvalidPolicy { .. } => ErrorContext::new(error)
            .with_suggestion("Configure project-artifacts, project-bom or include-artifacts (or pass --roots / --bom)"),
        RelgraphError::InvalidPattern { .. } => ErrorContext::new(error)
            .with_suggestion("Patterns use group:name[:classifier[:type[:version]]] with '*' wildcards"),
        RelgraphError::InvalidCoordinates { .. } => ErrorContext::new(error)
            .with_suggestion("Use group:name:version, group:name:classifier:version or group:name:classifier:type:version"),
        RelgraphError::ConfigNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Create a relgraph.toml policy file or pass --config <path>"),
        RelgraphError::Toml(_) | RelgraphError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion("Check the TOML syntax and key names in the policy file")
            .with_details("Policy keys are kebab-case, e.g. include-patterns, warn-on-missing-scm"),
        RelgraphError::RegistryParseError { .. } => ErrorContext::new(error)
            .with_suggestion("Check the registry snapshot format (json, yaml or toml by file extension)"),
        _ => ErrorContext::new(error),
    }
}

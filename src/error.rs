//! Error types for publish order computation.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use crate::workspace::{CycleViolation, ExemptionViolation};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for publish_order operations
pub type Result<T> = std::result::Result<T, PublishOrderError>;

/// Main error type for all publish_order operations
#[derive(Error, Debug)]
pub enum PublishOrderError {
    /// Dependency graph and ordering errors
    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    /// Metadata retrieval and parsing errors
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Errors raised while ordering workspace packages
#[derive(Error, Debug)]
pub enum WorkspaceError {
    /// Direct cycles or misconfigured self dev-dependencies were found before ordering
    #[error(
        "{} circular dependencies and {} misconfigured self dev-dependencies found",
        cycles.len(),
        exemptions.len()
    )]
    Violations {
        /// Mutually dependent package pairs
        cycles: Vec<CycleViolation>,
        /// Self dev-dependencies that pin a version
        exemptions: Vec<ExemptionViolation>,
    },

    /// Ordering stopped making progress before every package was placed
    #[error("Circular dependency suspected between these packages: {}", packages.join(", "))]
    UnresolvedCycle {
        /// Every package left unordered, in workspace order
        packages: Vec<String>,
        /// Strongly connected groups among the remaining packages
        components: Vec<Vec<String>>,
    },

    /// Package not found in workspace
    #[error("Package '{name}' not found in workspace")]
    PackageNotFound {
        /// Package name
        name: String,
    },
}

/// Errors raised while obtaining the workspace metadata snapshot
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Cargo binary could not be located
    #[error("Could not locate cargo: {reason}")]
    CargoNotFound {
        /// Reason for the error
        reason: String,
    },

    /// `cargo metadata` exited unsuccessfully
    #[error("`{command}` failed with {status}: {stderr}")]
    CommandFailed {
        /// Command line that was run
        command: String,
        /// Exit status description
        status: String,
        /// Captured standard error
        stderr: String,
    },

    /// Metadata document is malformed or missing required fields
    #[error("Invalid metadata document: {source}")]
    Parse {
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Metadata file could not be read
    #[error("Failed to read metadata from {path}: {source}")]
    Read {
        /// File that was read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The same package name appears twice
    #[error("Package '{name}' appears more than once in the metadata")]
    DuplicatePackage {
        /// Package name
        name: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl PublishOrderError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            PublishOrderError::Workspace(WorkspaceError::Violations { cycles, exemptions }) => {
                let mut suggestions = Vec::new();
                if !cycles.is_empty() {
                    suggestions.push(
                        "Remove circular dependencies by restructuring package relationships"
                            .to_string(),
                    );
                }
                for exemption in exemptions {
                    suggestions.push(format!(
                        "In '{}', declare the self dev-dependency as: {}",
                        exemption.package,
                        exemption.suggestion()
                    ));
                }
                suggestions
            }
            PublishOrderError::Workspace(WorkspaceError::UnresolvedCycle {
                packages,
                components,
            }) => {
                let mut suggestions: Vec<String> = components
                    .iter()
                    .map(|group| format!("Break the cycle between: {}", group.join(", ")))
                    .collect();
                if suggestions.is_empty() {
                    suggestions.push(format!(
                        "Review dependencies between packages: {}",
                        packages.join(", ")
                    ));
                }
                suggestions
            }
            PublishOrderError::Metadata(MetadataError::CargoNotFound { .. }) => vec![
                "Install a Rust toolchain so `cargo` is on PATH".to_string(),
                "Point at a cargo binary with --cargo or the CARGO environment variable"
                    .to_string(),
            ],
            PublishOrderError::Metadata(MetadataError::CommandFailed { .. }) => vec![
                "Run from within a Cargo workspace or pass --manifest-path".to_string(),
                "Run `cargo metadata --no-deps --format-version=1` manually to see the failure"
                    .to_string(),
            ],
            PublishOrderError::Metadata(MetadataError::Parse { .. }) => vec![
                "Provide output of `cargo metadata --no-deps --format-version=1`".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

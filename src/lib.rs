//! # Publish Order
//!
//! Figures out the order in which the crates of a Cargo workspace must be
//! published, and makes sure there are no circular dependencies that would
//! cause `cargo publish` to fail.
//!
//! ## Rules
//!
//! - Only dependencies whose name starts with the configured prefix take part
//!   in ordering; everything else is assumed to come from a registry.
//! - A crate may dev-depend on itself through a path (to enable test-only
//!   features) as long as no version is attached to that dependency.
//! - Two crates depending on each other, or any longer cycle, is an error.
//!
//! ## Usage
//!
//! ```bash
//! publish_order                          # print Cargo.toml paths in publish order
//! publish_order --prefix agave --names   # print crate names instead
//! cargo metadata --no-deps --format-version=1 | publish_order --metadata -
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod error;
pub mod metadata;
pub mod workspace;

pub use cli::Args;
pub use error::{PublishOrderError, Result};
pub use metadata::{DependencyKind, DependencyRecord, MetadataSnapshot, PackageRecord};
pub use workspace::{
    CycleViolation, DependencyGraph, DomainFilter, ExemptionViolation, GraphBuilder,
    PublishOrder, PublishOrderer,
};

/// Default prefix of crates that take part in ordering
pub const DEFAULT_DOMAIN_PREFIX: &str = "solana";

/// Configuration for publish order computation
#[derive(Debug, Clone)]
pub struct OrderConfig {
    /// Dependencies whose names start with this prefix become graph edges
    pub domain_prefix: String,
    /// Requirement cargo reports for a dependency without an explicit version
    pub unconstrained_req: String,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            domain_prefix: DEFAULT_DOMAIN_PREFIX.to_string(),
            unconstrained_req: workspace::UNCONSTRAINED_REQ.to_string(),
        }
    }
}

impl OrderConfig {
    /// Graph builder configured from this config
    pub fn graph_builder(&self) -> GraphBuilder {
        GraphBuilder::new(DomainFilter::new(self.domain_prefix.clone()))
            .with_unconstrained_req(self.unconstrained_req.clone())
    }
}

/// Build the dependency graph of `snapshot` and order it
pub fn compute_publish_order(
    snapshot: &MetadataSnapshot,
    config: &OrderConfig,
) -> Result<PublishOrder> {
    let workspace = config.graph_builder().build(snapshot);
    log::debug!(
        "Built dependency graph with {} packages, {} exemption violations",
        workspace.graph.len(),
        workspace.exemption_violations.len()
    );
    PublishOrderer::from(workspace).order()
}

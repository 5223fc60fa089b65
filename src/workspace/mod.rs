//! Workspace dependency analysis.
//!
//! This module builds the in-domain dependency graph from a metadata snapshot and
//! determines the order in which packages must be published.

mod analyzer;
mod dependency;

pub use analyzer::{
    DependencyGraph, DomainFilter, ExemptionViolation, GraphBuilder, ManifestIndex,
    UNCONSTRAINED_REQ, WorkspaceGraph,
};
pub use dependency::{CycleViolation, PublishEntry, PublishOrder, PublishOrderer, PublishTier};

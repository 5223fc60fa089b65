//! Cycle detection and publish ordering.
//!
//! Packages are peeled off in passes: every package whose dependencies have all
//! been placed already is ready, and all ready packages of a pass are placed
//! together in workspace order. A pass that places nothing means the remaining
//! packages form (or depend on) a cycle.

use crate::error::{Result, WorkspaceError};
use crate::workspace::{DependencyGraph, ExemptionViolation, ManifestIndex, WorkspaceGraph};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;

/// Two packages that depend on each other directly
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CycleViolation {
    first: String,
    second: String,
}

impl CycleViolation {
    /// Canonical pair, independent of argument order
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// Both packages, lexicographically ordered
    pub fn packages(&self) -> (&str, &str) {
        (&self.first, &self.second)
    }
}

impl fmt::Display for CycleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circular dependency: {} <--> {}", self.first, self.second)
    }
}

/// A package placed in the publish order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishEntry {
    /// Package name
    pub name: String,
    /// Path to the package's Cargo.toml
    pub manifest_path: PathBuf,
}

/// Packages that became ready in the same pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishTier {
    /// Package names in this tier, in workspace order
    pub packages: Vec<String>,
    /// Tier number (0-based)
    pub tier_number: usize,
}

/// Resolved publish order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishOrder {
    /// Packages in the order they must be published
    pub entries: Vec<PublishEntry>,
    /// The passes that produced `entries`
    pub tiers: Vec<PublishTier>,
}

impl PublishOrder {
    /// Package names in publish order
    pub fn ordered_packages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Position of `package` in the order
    pub fn position(&self, package: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name == package)
    }

    /// Tier `package` was placed in
    pub fn tier_for_package(&self, package: &str) -> Option<usize> {
        self.tiers
            .iter()
            .find(|tier| tier.packages.iter().any(|name| name == package))
            .map(|tier| tier.tier_number)
    }

    /// Number of tiers
    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    /// Number of packages
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing needs publishing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Orders the packages of a [`WorkspaceGraph`]
#[derive(Debug)]
pub struct PublishOrderer {
    graph: DependencyGraph,
    manifests: ManifestIndex,
    exemption_violations: Vec<ExemptionViolation>,
}

impl From<WorkspaceGraph> for PublishOrderer {
    fn from(workspace: WorkspaceGraph) -> Self {
        Self {
            graph: workspace.graph,
            manifests: workspace.manifests,
            exemption_violations: workspace.exemption_violations,
        }
    }
}

impl PublishOrderer {
    /// Orderer over an explicit graph
    pub fn new(
        graph: DependencyGraph,
        manifests: ManifestIndex,
        exemption_violations: Vec<ExemptionViolation>,
    ) -> Self {
        Self {
            graph,
            manifests,
            exemption_violations,
        }
    }

    /// Every pair of packages that depend on each other directly
    pub fn direct_cycles(&self) -> Vec<CycleViolation> {
        let mut found = BTreeSet::new();
        for (package, dependencies) in self.graph.iter() {
            for dependency in dependencies {
                if self.graph.has_edge(dependency, package) {
                    found.insert(CycleViolation::new(package, dependency.as_str()));
                }
            }
        }
        found.into_iter().collect()
    }

    /// Compute the publish order, consuming the graph.
    ///
    /// Fails without ordering anything if a direct cycle or an exemption
    /// violation exists; all of them are reported at once.
    pub fn order(self) -> Result<PublishOrder> {
        let cycles = self.direct_cycles();
        if !cycles.is_empty() || !self.exemption_violations.is_empty() {
            return Err(WorkspaceError::Violations {
                cycles,
                exemptions: self.exemption_violations,
            }
            .into());
        }

        let Self {
            graph, manifests, ..
        } = self;
        let tiers = peel(graph)?;

        let mut entries = Vec::with_capacity(manifests.len());
        for tier in &tiers {
            for name in &tier.packages {
                let manifest_path = manifests
                    .get(name)
                    .ok_or_else(|| WorkspaceError::PackageNotFound { name: name.clone() })?
                    .to_path_buf();
                entries.push(PublishEntry {
                    name: name.clone(),
                    manifest_path,
                });
            }
        }

        log::info!(
            "Ordered {} packages in {} tiers",
            entries.len(),
            tiers.len()
        );
        Ok(PublishOrder { entries, tiers })
    }
}

fn peel(graph: DependencyGraph) -> Result<Vec<PublishTier>> {
    let mut remaining = graph.into_nodes();
    let max_passes = remaining.len().saturating_mul(remaining.len());
    let mut tiers = Vec::new();

    while !remaining.is_empty() {
        if tiers.len() >= max_passes {
            log::warn!("Gave up ordering after {} passes", tiers.len());
            return Err(unresolved(&remaining));
        }

        let ready: Vec<bool> = {
            let present: HashSet<&str> = remaining.iter().map(|(name, _)| name.as_str()).collect();
            remaining
                .iter()
                .map(|(_, deps)| deps.iter().all(|dep| !present.contains(dep.as_str())))
                .collect()
        };

        if !ready.contains(&true) {
            return Err(unresolved(&remaining));
        }

        let mut packages = Vec::new();
        let mut blocked = Vec::with_capacity(remaining.len());
        for (node, is_ready) in remaining.into_iter().zip(ready) {
            if is_ready {
                packages.push(node.0);
            } else {
                blocked.push(node);
            }
        }

        log::debug!("Tier {}: {:?}", tiers.len(), packages);
        tiers.push(PublishTier {
            packages,
            tier_number: tiers.len(),
        });
        remaining = blocked;
    }

    Ok(tiers)
}

fn unresolved(remaining: &[(String, Vec<String>)]) -> crate::error::PublishOrderError {
    WorkspaceError::UnresolvedCycle {
        packages: remaining.iter().map(|(name, _)| name.clone()).collect(),
        components: cycle_components(remaining),
    }
    .into()
}

/// Groups of remaining packages that actually form cycles, each sorted by name
fn cycle_components(remaining: &[(String, Vec<String>)]) -> Vec<Vec<String>> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut nodes: HashMap<&str, NodeIndex> = HashMap::with_capacity(remaining.len());
    for (name, _) in remaining {
        nodes.insert(name.as_str(), graph.add_node(name.as_str()));
    }
    for (name, deps) in remaining {
        let Some(&from) = nodes.get(name.as_str()) else {
            continue;
        };
        for dep in deps {
            if let Some(&to) = nodes.get(dep.as_str()) {
                graph.add_edge(from, to, ());
            }
        }
    }

    let mut components: Vec<Vec<String>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| match component.as_slice() {
            [single] => graph.contains_edge(*single, *single),
            _ => true,
        })
        .map(|component| {
            let mut names: Vec<String> = component
                .into_iter()
                .map(|index| graph[index].to_string())
                .collect();
            names.sort();
            names
        })
        .collect();
    components.sort();
    components
}

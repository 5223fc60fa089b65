//! Dependency graph construction from a metadata snapshot.

use crate::metadata::{DependencyRecord, MetadataSnapshot, PackageRecord};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Requirement cargo reports for a dependency declared without a version
pub const UNCONSTRAINED_REQ: &str = "*";

/// Decides which dependency names take part in ordering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainFilter {
    prefix: String,
}

impl DomainFilter {
    /// Accept names starting with `prefix`
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The configured name prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether `name` belongs to the domain
    pub fn contains(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
    }
}

/// Package name to in-domain dependency names, in snapshot order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    nodes: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl DependencyGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package with its dependencies, replacing any previous entry.
    /// Repeated dependency names are kept once, first occurrence wins.
    pub fn insert(&mut self, package: impl Into<String>, dependencies: Vec<String>) {
        let package = package.into();
        let mut unique = Vec::with_capacity(dependencies.len());
        for dependency in dependencies {
            if !unique.contains(&dependency) {
                unique.push(dependency);
            }
        }

        match self.index.get(&package) {
            Some(&slot) => self.nodes[slot].1 = unique,
            None => {
                self.index.insert(package.clone(), self.nodes.len());
                self.nodes.push((package, unique));
            }
        }
    }

    /// Whether `package` is a node of the graph
    pub fn contains(&self, package: &str) -> bool {
        self.index.contains_key(package)
    }

    /// Dependencies recorded for `package`
    pub fn dependencies(&self, package: &str) -> Option<&[String]> {
        self.index
            .get(package)
            .map(|&slot| self.nodes[slot].1.as_slice())
    }

    /// Whether the edge `package -> dependency` exists
    pub fn has_edge(&self, package: &str, dependency: &str) -> bool {
        self.dependencies(package)
            .is_some_and(|deps| deps.iter().any(|d| d == dependency))
    }

    /// Nodes with their dependencies in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.nodes
            .iter()
            .map(|(name, deps)| (name.as_str(), deps.as_slice()))
    }

    /// Package names in insertion order
    pub fn package_names(&self) -> Vec<String> {
        self.nodes.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Number of packages
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no packages
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn into_nodes(self) -> Vec<(String, Vec<String>)> {
        self.nodes
    }
}

/// Package name to manifest location
#[derive(Debug, Clone, Default)]
pub struct ManifestIndex {
    paths: HashMap<String, PathBuf>,
}

impl ManifestIndex {
    /// Manifest of `package`
    pub fn get(&self, package: &str) -> Option<&Path> {
        self.paths.get(package).map(PathBuf::as_path)
    }

    /// Number of indexed packages
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether no package is indexed
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FromIterator<(String, PathBuf)> for ManifestIndex {
    fn from_iter<I: IntoIterator<Item = (String, PathBuf)>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

/// A self dev-dependency on a local path that still pins a version.
///
/// Usually the result of `{ workspace = true, ... }`, which pulls the
/// workspace version in with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExemptionViolation {
    /// Package declaring the dependency
    pub package: String,
    /// Dependency name (same as `package`)
    pub dependency: String,
    /// The offending requirement
    pub req: String,
    /// Features enabled on the dependency
    pub features: Vec<String>,
}

impl ExemptionViolation {
    fn from_record(package: &PackageRecord, dependency: &DependencyRecord) -> Self {
        Self {
            package: package.name.clone(),
            dependency: dependency.name.clone(),
            req: dependency.req.clone(),
            features: dependency.features.clone(),
        }
    }

    /// Manifest line that declares the dependency correctly
    pub fn suggestion(&self) -> String {
        let features: Vec<String> = self
            .features
            .iter()
            .map(|feature| serde_json::Value::from(feature.as_str()).to_string())
            .collect();
        format!(
            "{} = {{ path = \".\", features = [{}] }}",
            self.dependency,
            features.join(", ")
        )
    }
}

impl fmt::Display for ExemptionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wrong dev-context-only-utils circular dependency. try: {}",
            self.suggestion()
        )
    }
}

/// Everything derived from a snapshot that ordering needs
#[derive(Debug, Clone)]
pub struct WorkspaceGraph {
    /// In-domain dependency edges
    pub graph: DependencyGraph,
    /// Where each package's manifest lives
    pub manifests: ManifestIndex,
    /// Misconfigured self dev-dependencies
    pub exemption_violations: Vec<ExemptionViolation>,
}

/// Builds a [`WorkspaceGraph`] from package records
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    domain: DomainFilter,
    unconstrained_req: String,
}

impl GraphBuilder {
    /// Builder accepting dependencies inside `domain`
    pub fn new(domain: DomainFilter) -> Self {
        Self {
            domain,
            unconstrained_req: UNCONSTRAINED_REQ.to_string(),
        }
    }

    /// Override the requirement treated as "no explicit version"
    pub fn with_unconstrained_req(mut self, req: impl Into<String>) -> Self {
        self.unconstrained_req = req.into();
        self
    }

    /// Build the graph, the manifest index and the exemption violations
    pub fn build(&self, snapshot: &MetadataSnapshot) -> WorkspaceGraph {
        let mut graph = DependencyGraph::new();
        let mut exemption_violations = Vec::new();

        for package in &snapshot.packages {
            let mut dependencies = Vec::new();
            for dependency in &package.dependencies {
                if self.should_add(package, dependency, &mut exemption_violations) {
                    dependencies.push(dependency.name.clone());
                }
            }
            log::debug!("{} -> {:?}", package.name, dependencies);
            graph.insert(package.name.clone(), dependencies);
        }

        let manifests = snapshot
            .packages
            .iter()
            .map(|package| (package.name.clone(), package.manifest_path.clone()))
            .collect();

        WorkspaceGraph {
            graph,
            manifests,
            exemption_violations,
        }
    }

    fn should_add(
        &self,
        package: &PackageRecord,
        dependency: &DependencyRecord,
        violations: &mut Vec<ExemptionViolation>,
    ) -> bool {
        if !self.domain.contains(&dependency.name) {
            return false;
        }

        if self.is_self_path_dev_dependency(package, dependency) {
            if dependency.req != self.unconstrained_req {
                log::warn!(
                    "{} declares itself as a dev-dependency with requirement '{}'",
                    package.name,
                    dependency.req
                );
                violations.push(ExemptionViolation::from_record(package, dependency));
            }
            return false;
        }

        true
    }

    // cargo publish accepts a crate dev-depending on itself through a path
    fn is_self_path_dev_dependency(
        &self,
        package: &PackageRecord,
        dependency: &DependencyRecord,
    ) -> bool {
        dependency.is_dev() && dependency.name == package.name && dependency.is_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::DependencyKind;

    fn dep(name: &str, kind: DependencyKind, req: &str, path: bool) -> DependencyRecord {
        DependencyRecord {
            name: name.to_string(),
            kind,
            req: req.to_string(),
            path: path.then(|| PathBuf::from(format!("/ws/{name}"))),
            features: vec!["dev-context-only-utils".to_string()],
            rename: None,
            optional: false,
        }
    }

    fn package(name: &str, dependencies: Vec<DependencyRecord>) -> PackageRecord {
        PackageRecord {
            name: name.to_string(),
            version: Some("1.0.0".to_string()),
            id: None,
            manifest_path: PathBuf::from(format!("/ws/{name}/Cargo.toml")),
            dependencies,
        }
    }

    fn build(packages: Vec<PackageRecord>) -> WorkspaceGraph {
        let snapshot = MetadataSnapshot {
            packages,
            workspace_root: None,
        };
        GraphBuilder::new(DomainFilter::new("solana")).build(&snapshot)
    }

    #[test]
    fn test_out_of_domain_dependencies_are_dropped() {
        let built = build(vec![package(
            "solana-a",
            vec![
                dep("serde", DependencyKind::Normal, "^1", false),
                dep("solana-b", DependencyKind::Normal, "=1.0.0", true),
            ],
        )]);

        assert_eq!(
            built.graph.dependencies("solana-a"),
            Some(&["solana-b".to_string()][..])
        );
        assert!(!built.graph.contains("serde"));
        assert!(built.exemption_violations.is_empty());
    }

    #[test]
    fn test_self_path_dev_dependency_is_exempt() {
        let built = build(vec![package(
            "solana-a",
            vec![dep("solana-a", DependencyKind::Dev, "*", true)],
        )]);

        assert_eq!(built.graph.dependencies("solana-a"), Some(&[][..]));
        assert!(built.exemption_violations.is_empty());
    }

    #[test]
    fn test_self_path_dev_dependency_with_version_is_violation() {
        let built = build(vec![package(
            "solana-a",
            vec![dep("solana-a", DependencyKind::Dev, "=2.1.0", true)],
        )]);

        assert_eq!(built.graph.dependencies("solana-a"), Some(&[][..]));
        assert_eq!(built.exemption_violations.len(), 1);
        let violation = &built.exemption_violations[0];
        assert_eq!(violation.package, "solana-a");
        assert_eq!(violation.req, "=2.1.0");
    }

    #[test]
    fn test_self_dev_dependency_from_registry_is_an_edge() {
        let built = build(vec![package(
            "solana-a",
            vec![dep("solana-a", DependencyKind::Dev, "=2.1.0", false)],
        )]);

        assert!(built.graph.has_edge("solana-a", "solana-a"));
        assert!(built.exemption_violations.is_empty());
    }

    #[test]
    fn test_dev_dependency_on_other_package_is_an_edge() {
        let built = build(vec![package(
            "solana-a",
            vec![dep("solana-b", DependencyKind::Dev, "*", true)],
        )]);

        assert!(built.graph.has_edge("solana-a", "solana-b"));
    }

    #[test]
    fn test_out_of_domain_self_dev_dependency_ignored() {
        let built = build(vec![package(
            "helper",
            vec![dep("helper", DependencyKind::Dev, "=1.0.0", true)],
        )]);

        assert!(built.graph.contains("helper"));
        assert!(built.exemption_violations.is_empty());
    }

    #[test]
    fn test_duplicate_dependency_entries_collapse() {
        let built = build(vec![package(
            "solana-a",
            vec![
                dep("solana-b", DependencyKind::Normal, "=1.0.0", true),
                dep("solana-b", DependencyKind::Dev, "*", true),
            ],
        )]);

        assert_eq!(
            built.graph.dependencies("solana-a"),
            Some(&["solana-b".to_string()][..])
        );
    }

    #[test]
    fn test_manifest_index_covers_every_package() {
        let built = build(vec![package("solana-a", vec![]), package("other", vec![])]);

        assert_eq!(built.manifests.len(), 2);
        assert_eq!(
            built.manifests.get("other"),
            Some(Path::new("/ws/other/Cargo.toml"))
        );
        assert_eq!(built.graph.package_names(), vec!["solana-a", "other"]);
    }

    #[test]
    fn test_suggestion_renders_features_as_json() {
        let violation = ExemptionViolation {
            package: "solana-a".to_string(),
            dependency: "solana-a".to_string(),
            req: "=1.0.0".to_string(),
            features: vec!["dev-context-only-utils".to_string(), "x".to_string()],
        };

        assert_eq!(
            violation.to_string(),
            "wrong dev-context-only-utils circular dependency. try: \
             solana-a = { path = \".\", features = [\"dev-context-only-utils\", \"x\"] }"
        );
    }

    #[test]
    fn test_custom_unconstrained_req() {
        let snapshot = MetadataSnapshot {
            packages: vec![package(
                "solana-a",
                vec![dep("solana-a", DependencyKind::Dev, "", true)],
            )],
            workspace_root: None,
        };
        let built = GraphBuilder::new(DomainFilter::new("solana"))
            .with_unconstrained_req("")
            .build(&snapshot);

        assert!(built.exemption_violations.is_empty());
    }
}

//! Workspace metadata snapshot.
//!
//! Strongly typed view of `cargo metadata --no-deps --format-version=1` output,
//! plus the thin wrappers that obtain it from cargo, a file, or stdin.

use crate::error::{MetadataError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Every package known to the workspace, as reported by cargo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    /// Packages in the order cargo reported them
    pub packages: Vec<PackageRecord>,
    /// Workspace root directory
    #[serde(default)]
    pub workspace_root: Option<PathBuf>,
}

/// A single package entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Package name, unique within the snapshot
    pub name: String,
    /// Package version
    #[serde(default)]
    pub version: Option<String>,
    /// Opaque cargo package id
    #[serde(default)]
    pub id: Option<String>,
    /// Path to the package's Cargo.toml
    pub manifest_path: PathBuf,
    /// Declared dependencies in manifest order
    pub dependencies: Vec<DependencyRecord>,
}

/// A declared dependency of a package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyRecord {
    /// Name of the referenced package
    pub name: String,
    /// Dependency section the entry was declared in
    #[serde(default, deserialize_with = "deserialize_kind")]
    pub kind: DependencyKind,
    /// Version requirement; `*` when no version was given
    pub req: String,
    /// Local path the dependency resolves to
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Enabled features
    #[serde(default)]
    pub features: Vec<String>,
    /// Name the dependency is imported under, if renamed
    #[serde(default)]
    pub rename: Option<String>,
    /// Whether the dependency is optional
    #[serde(default)]
    pub optional: bool,
}

/// Manifest section a dependency was declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// `[dependencies]`
    #[default]
    Normal,
    /// `[dev-dependencies]`
    #[serde(alias = "development")]
    Dev,
    /// `[build-dependencies]`
    Build,
}

// cargo reports normal dependencies as `"kind": null`
fn deserialize_kind<'de, D>(deserializer: D) -> std::result::Result<DependencyKind, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<DependencyKind>::deserialize(deserializer)?.unwrap_or_default())
}

impl DependencyRecord {
    /// Whether the dependency resolves through the filesystem rather than a registry
    pub fn is_path(&self) -> bool {
        self.path.is_some()
    }

    /// Whether the dependency only applies to tests, examples and benches
    pub fn is_dev(&self) -> bool {
        self.kind == DependencyKind::Dev
    }
}

impl MetadataSnapshot {
    /// Parse a snapshot from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|source| MetadataError::Parse { source })?;
        snapshot.ensure_unique_names()?;
        Ok(snapshot)
    }

    /// Parse a snapshot from raw JSON bytes
    pub fn from_json_slice(json: &[u8]) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_slice(json).map_err(|source| MetadataError::Parse { source })?;
        snapshot.ensure_unique_names()?;
        Ok(snapshot)
    }

    /// Look up a package by name
    pub fn package(&self, name: &str) -> Option<&PackageRecord> {
        self.packages.iter().find(|package| package.name == name)
    }

    fn ensure_unique_names(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.packages.len());
        for package in &self.packages {
            if !seen.insert(package.name.as_str()) {
                return Err(MetadataError::DuplicatePackage {
                    name: package.name.clone(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Where the metadata snapshot comes from
#[derive(Debug, Clone)]
pub enum MetadataSource {
    /// Run `cargo metadata --no-deps --format-version=1`
    Cargo {
        /// Explicit cargo binary; searched on PATH when absent
        cargo: Option<PathBuf>,
        /// Workspace manifest to pass via `--manifest-path`
        manifest_path: Option<PathBuf>,
    },
    /// Read a previously captured JSON document
    File(PathBuf),
    /// Read the JSON document from standard input
    Stdin,
}

impl MetadataSource {
    /// Obtain the snapshot
    pub fn load(&self) -> Result<MetadataSnapshot> {
        match self {
            MetadataSource::Cargo {
                cargo,
                manifest_path,
            } => {
                let cargo = locate_cargo(cargo.as_deref())?;
                load_from_cargo(&cargo, manifest_path.as_deref())
            }
            MetadataSource::File(path) => {
                log::debug!("Reading metadata from {}", path.display());
                let content =
                    std::fs::read_to_string(path).map_err(|source| MetadataError::Read {
                        path: path.clone(),
                        source,
                    })?;
                MetadataSnapshot::from_json_str(&content)
            }
            MetadataSource::Stdin => {
                log::debug!("Reading metadata from stdin");
                let mut content = String::new();
                std::io::stdin()
                    .read_to_string(&mut content)
                    .map_err(|source| MetadataError::Read {
                        path: PathBuf::from("-"),
                        source,
                    })?;
                MetadataSnapshot::from_json_str(&content)
            }
        }
    }
}

/// Resolve the cargo binary, preferring an explicit path
pub fn locate_cargo(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    which::which("cargo").map_err(|e| {
        MetadataError::CargoNotFound {
            reason: e.to_string(),
        }
        .into()
    })
}

/// Run `cargo metadata` and parse its output
pub fn load_from_cargo(cargo: &Path, manifest_path: Option<&Path>) -> Result<MetadataSnapshot> {
    let mut command = Command::new(cargo);
    command.args(["metadata", "--no-deps", "--format-version=1"]);
    if let Some(manifest_path) = manifest_path {
        command.arg("--manifest-path").arg(manifest_path);
    }

    let rendered = format!("{:?}", command);
    log::debug!("Running {}", rendered);

    let output = command.output()?;
    if !output.status.success() {
        return Err(MetadataError::CommandFailed {
            command: rendered,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }

    let snapshot = MetadataSnapshot::from_json_slice(&output.stdout)?;
    log::info!("Loaded metadata for {} packages", snapshot.packages.len());
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PublishOrderError;

    #[test]
    fn test_parse_cargo_metadata_kinds() {
        let snapshot = MetadataSnapshot::from_json_str(
            r#"{
                "packages": [{
                    "name": "solana-foo",
                    "version": "1.0.0",
                    "id": "solana-foo 1.0.0 (path+file:///ws/foo)",
                    "manifest_path": "/ws/foo/Cargo.toml",
                    "dependencies": [
                        {"name": "solana-bar", "kind": null, "req": "=1.0.0", "path": "/ws/bar"},
                        {"name": "solana-foo", "kind": "dev", "req": "*", "path": "/ws/foo",
                         "features": ["dev-context-only-utils"]},
                        {"name": "cc", "kind": "build", "req": "^1"}
                    ]
                }],
                "workspace_members": [],
                "workspace_root": "/ws",
                "version": 1
            }"#,
        )
        .expect("metadata should parse");

        let package = snapshot.package("solana-foo").expect("package exists");
        let kinds: Vec<_> = package.dependencies.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DependencyKind::Normal,
                DependencyKind::Dev,
                DependencyKind::Build
            ]
        );
        assert!(package.dependencies[1].is_path());
        assert!(!package.dependencies[2].is_path());
        assert_eq!(
            package.dependencies[1].features,
            vec!["dev-context-only-utils"]
        );
        assert_eq!(snapshot.workspace_root, Some(PathBuf::from("/ws")));
    }

    #[test]
    fn test_missing_kind_is_normal() {
        let snapshot = MetadataSnapshot::from_json_str(
            r#"{"packages": [{"name": "a", "manifest_path": "a/Cargo.toml",
                "dependencies": [{"name": "b", "req": "*"}]}]}"#,
        )
        .expect("metadata should parse");
        assert_eq!(
            snapshot.packages[0].dependencies[0].kind,
            DependencyKind::Normal
        );
    }

    #[test]
    fn test_development_alias() {
        let snapshot = MetadataSnapshot::from_json_str(
            r#"{"packages": [{"name": "a", "manifest_path": "a/Cargo.toml",
                "dependencies": [{"name": "a", "kind": "development", "req": "*", "path": "."}]}]}"#,
        )
        .expect("metadata should parse");
        assert!(snapshot.packages[0].dependencies[0].is_dev());
    }

    #[test]
    fn test_missing_manifest_path_rejected() {
        let result = MetadataSnapshot::from_json_str(
            r#"{"packages": [{"name": "a", "dependencies": []}]}"#,
        );
        assert!(matches!(
            result,
            Err(PublishOrderError::Metadata(MetadataError::Parse { .. }))
        ));
    }

    #[test]
    fn test_missing_req_rejected() {
        let result = MetadataSnapshot::from_json_str(
            r#"{"packages": [{"name": "a", "manifest_path": "a/Cargo.toml",
                "dependencies": [{"name": "b", "kind": null}]}]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_package_rejected() {
        let result = MetadataSnapshot::from_json_str(
            r#"{"packages": [
                {"name": "a", "manifest_path": "a/Cargo.toml", "dependencies": []},
                {"name": "a", "manifest_path": "b/Cargo.toml", "dependencies": []}
            ]}"#,
        );
        match result {
            Err(PublishOrderError::Metadata(MetadataError::DuplicatePackage { name })) => {
                assert_eq!(name, "a");
            }
            other => panic!("expected duplicate package error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_missing_file() {
        let source = MetadataSource::File(PathBuf::from("/definitely/not/here.json"));
        assert!(matches!(
            source.load(),
            Err(PublishOrderError::Metadata(MetadataError::Read { .. }))
        ));
    }

    #[test]
    fn test_locate_cargo_prefers_explicit() {
        let path = locate_cargo(Some(Path::new("/opt/cargo"))).expect("explicit path is used");
        assert_eq!(path, PathBuf::from("/opt/cargo"));
    }
}

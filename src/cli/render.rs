//! Rendering of a resolved publish order.

use super::OutputFormat;
use crate::error::{Result, WorkspaceError};
use crate::workspace::PublishOrder;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct JsonEntry<'a> {
    name: &'a str,
    manifest_path: PathBuf,
}

/// `manifest` expressed relative to `cwd`, or unchanged when that is impossible
pub fn relative_manifest_path(manifest: &Path, cwd: &Path) -> PathBuf {
    pathdiff::diff_paths(manifest, cwd).unwrap_or_else(|| manifest.to_path_buf())
}

/// Lines to print for `order` in `format`
pub fn render_order(order: &PublishOrder, format: OutputFormat, cwd: &Path) -> Result<Vec<String>> {
    let lines = match format {
        OutputFormat::Paths => order
            .entries
            .iter()
            .map(|entry| {
                relative_manifest_path(&entry.manifest_path, cwd)
                    .display()
                    .to_string()
            })
            .collect(),
        OutputFormat::Names => order.ordered_packages().map(str::to_string).collect(),
        OutputFormat::Tiers => order
            .tiers
            .iter()
            .map(|tier| tier.packages.join(" "))
            .collect(),
        OutputFormat::Json => {
            let entries: Vec<JsonEntry<'_>> = order
                .entries
                .iter()
                .map(|entry| JsonEntry {
                    name: &entry.name,
                    manifest_path: relative_manifest_path(&entry.manifest_path, cwd),
                })
                .collect();
            vec![serde_json::to_string_pretty(&entries)?]
        }
    };
    Ok(lines)
}

/// Diagnostic lines for a workspace defect, without the `Error:` prefix.
///
/// Continuation lines start with a space and belong to the preceding diagnostic.
pub fn render_workspace_error(error: &WorkspaceError) -> Vec<String> {
    match error {
        WorkspaceError::Violations { cycles, exemptions } => cycles
            .iter()
            .map(ToString::to_string)
            .chain(exemptions.iter().map(ToString::to_string))
            .collect(),
        WorkspaceError::UnresolvedCycle {
            packages,
            components,
        } => {
            let mut lines = vec!["Circular dependency suspected between these packages:".to_string()];
            lines.extend(packages.iter().map(|package| format!(" {package}")));
            lines.extend(
                components
                    .iter()
                    .map(|group| format!("Packages forming a cycle: {}", group.join(", "))),
            );
            lines
        }
        other => vec![other.to_string()],
    }
}

//! Command line interface for publish_order.
//!
//! Loads workspace metadata, computes the publish order and prints it, or
//! prints every diagnostic found and reports failure through the exit code.

mod args;
mod output;
mod render;

pub use args::{Args, ColorMode, OutputFormat};
pub use output::OutputManager;
pub use render::{relative_manifest_path, render_order, render_workspace_error};

use crate::error::{CliError, PublishOrderError, Result};
use anyhow::Context;
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Main CLI entry point
pub fn run() -> Result<i32> {
    let args = Args::parse_args();
    let cwd = std::env::current_dir().context("Failed to determine the working directory")?;
    execute(&args, &cwd)
}

/// Execute parsed arguments, rendering paths relative to `cwd`
pub fn execute(args: &Args, cwd: &Path) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let output = OutputManager::new(args.color);
    let snapshot = args.metadata_source().load()?;

    match crate::compute_publish_order(&snapshot, &args.order_config()) {
        Ok(order) => {
            for line in render_order(&order, args.output_format(), cwd)? {
                output.println(&line)?;
            }
            Ok(0)
        }
        Err(PublishOrderError::Workspace(error)) => {
            log::debug!("Ordering failed: {}", error);
            for line in render_workspace_error(&error) {
                match line.strip_prefix(' ') {
                    Some(continuation) => output.indent(continuation),
                    None => output.diagnostic(&line),
                }
            }
            Ok(1)
        }
        Err(e) => Err(e),
    }
}

/// Absolute form of a user supplied path, resolved against the current directory
pub(crate) fn absolutize(path: &Path) -> PathBuf {
    path.absolutize()
        .map(|absolute| absolute.into_owned())
        .unwrap_or_else(|_| path.to_path_buf())
}

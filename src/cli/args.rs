//! Command line argument parsing and validation.

use crate::OrderConfig;
use crate::metadata::MetadataSource;
use crate::workspace::UNCONSTRAINED_REQ;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Print workspace crates in the order they must be published
#[derive(Parser, Debug)]
#[command(
    name = "publish_order",
    version,
    about = "Print workspace crates in the order they must be published",
    long_about = "Figures the order in which workspace crates must be published to crates.io.
Along the way it also ensures there are no circular dependencies that would
cause `cargo publish` to fail.

On success an ordered list of Cargo.toml files is written to stdout."
)]
pub struct Args {
    /// Only dependencies starting with this prefix affect the order
    #[arg(long, env = "PUBLISH_ORDER_PREFIX", default_value = crate::DEFAULT_DOMAIN_PREFIX)]
    pub prefix: String,

    /// Path to the workspace Cargo.toml
    #[arg(long, value_name = "PATH")]
    pub manifest_path: Option<PathBuf>,

    /// Cargo binary used to read workspace metadata
    #[arg(long, env = "CARGO", value_name = "PATH")]
    pub cargo: Option<PathBuf>,

    /// Read `cargo metadata` JSON from a file (`-` for stdin) instead of running cargo
    #[arg(long, value_name = "FILE")]
    pub metadata: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Paths)]
    pub format: OutputFormat,

    /// Print crate names instead of manifest paths
    #[arg(long, conflicts_with_all = ["format", "json", "tiers"])]
    pub names: bool,

    /// Print JSON instead of manifest paths
    #[arg(long, conflicts_with_all = ["format", "tiers"])]
    pub json: bool,

    /// Print one line per publishing tier
    #[arg(long, conflicts_with = "format")]
    pub tiers: bool,

    /// When to color diagnostics
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,
}

/// How the resolved order is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Manifest paths relative to the working directory
    Paths,
    /// Crate names
    Names,
    /// JSON array of `{name, manifest_path}`
    Json,
    /// Space separated crate names, one tier per line
    Tiers,
}

/// Color preference for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Color when stderr is a terminal
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.prefix.is_empty() {
            return Err("--prefix must not be empty".to_string());
        }

        if let Some(path) = &self.manifest_path
            && path.file_name().is_some_and(|name| name != "Cargo.toml")
        {
            return Err(format!(
                "--manifest-path must point to a Cargo.toml file, got {}",
                path.display()
            ));
        }

        Ok(())
    }

    /// Effective output format, folding in the shorthand flags
    pub fn output_format(&self) -> OutputFormat {
        if self.names {
            OutputFormat::Names
        } else if self.json {
            OutputFormat::Json
        } else if self.tiers {
            OutputFormat::Tiers
        } else {
            self.format
        }
    }

    /// Where workspace metadata should be read from
    pub fn metadata_source(&self) -> MetadataSource {
        match &self.metadata {
            Some(path) if path.as_os_str() == "-" => MetadataSource::Stdin,
            Some(path) => MetadataSource::File(path.clone()),
            None => MetadataSource::Cargo {
                cargo: self.cargo.clone(),
                manifest_path: self.manifest_path.as_deref().map(super::absolutize),
            },
        }
    }

    /// Ordering configuration
    pub fn order_config(&self) -> OrderConfig {
        OrderConfig {
            domain_prefix: self.prefix.clone(),
            unconstrained_req: UNCONSTRAINED_REQ.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("publish_order").chain(args.iter().copied()))
            .expect("arguments parse")
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["publish_order", "--prefix", "solana"])
            .expect("arguments parse");
        assert_eq!(args.output_format(), OutputFormat::Paths);
        assert_eq!(args.color, ColorMode::Auto);
        assert!(args.validate().is_ok());
        assert!(matches!(
            args.metadata_source(),
            MetadataSource::Cargo { .. }
        ));
    }

    #[test]
    fn test_shorthand_formats() {
        assert_eq!(
            parse(&["--prefix", "x", "--names"]).output_format(),
            OutputFormat::Names
        );
        assert_eq!(
            parse(&["--prefix", "x", "--json"]).output_format(),
            OutputFormat::Json
        );
        assert_eq!(
            parse(&["--prefix", "x", "--format", "tiers"]).output_format(),
            OutputFormat::Tiers
        );
    }

    #[test]
    fn test_conflicting_formats_rejected() {
        let result =
            Args::try_parse_from(["publish_order", "--prefix", "x", "--names", "--json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_metadata_sources() {
        assert!(matches!(
            parse(&["--prefix", "x", "--metadata", "-"]).metadata_source(),
            MetadataSource::Stdin
        ));
        assert!(matches!(
            parse(&["--prefix", "x", "--metadata", "meta.json"]).metadata_source(),
            MetadataSource::File(path) if path == PathBuf::from("meta.json")
        ));
    }

    #[test]
    fn test_validate_rejects_empty_prefix() {
        assert!(parse(&["--prefix", ""]).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_manifest_path() {
        let args = parse(&["--prefix", "x", "--manifest-path", "ws/Cargo.lock"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_order_config_uses_prefix() {
        let config = parse(&["--prefix", "agave"]).order_config();
        assert_eq!(config.domain_prefix, "agave");
        assert_eq!(config.unconstrained_req, "*");
    }
}

//! Publish Order - prints workspace crates in the order they must be published.
//!
//! Exits with status 1 when a circular dependency or a misdeclared self
//! dev-dependency prevents publishing.

use publish_order::cli;
use publish_order::cli::{ColorMode, OutputManager};
use std::process;

fn main() {
    env_logger::init();

    match cli::run() {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            let output = OutputManager::new(ColorMode::Auto);
            output.error(&format!("Fatal error: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                output.indent("Recovery suggestions:");
                for suggestion in suggestions {
                    output.hint(&suggestion);
                }
            }

            process::exit(1);
        }
    }
}

//! Terminal output for publish order results and diagnostics
//!
//! Results go to stdout uncolored so they can be piped; diagnostics go to
//! stderr with a colored `Error:` prefix.

use super::ColorMode;
use std::io::{IsTerminal, Write};
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent terminal output
#[derive(Debug)]
pub struct OutputManager {
    stdout: BufferWriter,
    stderr: BufferWriter,
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(color: ColorMode) -> Self {
        let stderr_choice = match color {
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
            ColorMode::Auto if std::io::stderr().is_terminal() => ColorChoice::Auto,
            ColorMode::Auto => ColorChoice::Never,
        };

        Self {
            stdout: BufferWriter::stdout(ColorChoice::Never),
            stderr: BufferWriter::stderr(stderr_choice),
        }
    }

    /// Print a result line to stdout
    pub fn println(&self, message: &str) -> std::io::Result<()> {
        let mut buffer = self.stdout.buffer();
        writeln!(&mut buffer, "{}", message)?;
        self.stdout.print(&buffer)
    }

    /// Print a diagnostic line, prefixed with `Error:`, to stderr
    pub fn diagnostic(&self, message: &str) {
        let mut buffer = self.stderr.buffer();
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
        let _ = write!(&mut buffer, "Error:");
        let _ = buffer.reset();
        let _ = writeln!(&mut buffer, " {}", message);
        if self.stderr.print(&buffer).is_err() {
            eprintln!("Error: {}", message);
        }
    }

    /// Print a fatal error message to stderr
    pub fn error(&self, message: &str) {
        let mut buffer = self.stderr.buffer();
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
        let _ = write!(&mut buffer, "✗");
        let _ = buffer.reset();
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
        let _ = writeln!(&mut buffer, " {}", message);
        let _ = buffer.reset();
        if self.stderr.print(&buffer).is_err() {
            eprintln!("✗ {}", message);
        }
    }

    /// Print indented text to stderr (for sub-items of a diagnostic)
    pub fn indent(&self, message: &str) {
        let mut buffer = self.stderr.buffer();
        let _ = writeln!(&mut buffer, " {}", message);
        let _ = self.stderr.print(&buffer);
    }

    /// Print a hint to stderr
    pub fn hint(&self, message: &str) {
        let mut buffer = self.stderr.buffer();
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
        let _ = write!(&mut buffer, "  •");
        let _ = buffer.reset();
        let _ = writeln!(&mut buffer, " {}", message);
        let _ = self.stderr.print(&buffer);
    }
}

//! Colored terminal output for publish runs
//!
//! Every line goes through one writer so quiet/verbose handling and color
//! choice stay consistent.

use std::io::Write;
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    stdout: BufferWriter,
    verbose: bool,
    quiet: bool,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self::new(self.verbose, self.quiet)
    }
}

/// Leading marker of a line
struct Marker {
    symbol: &'static str,
    color: Color,
    bold: bool,
    /// Color the message as well as the marker
    tint_message: bool,
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            stdout: BufferWriter::stdout(ColorChoice::Auto),
            verbose,
            quiet,
        }
    }

    fn write_marked(&self, writer: &BufferWriter, marker: &Marker, message: &str) -> std::io::Result<()> {
        let mut buffer = writer.buffer();
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(marker.color)).set_bold(marker.bold);

        buffer.set_color(&spec)?;
        write!(&mut buffer, "{}", marker.symbol)?;
        if !marker.tint_message {
            buffer.reset()?;
        }
        writeln!(&mut buffer, " {}", message)?;
        buffer.reset()?;
        writer.print(&buffer)
    }

    fn write_plain(&self, line: &str) -> std::io::Result<()> {
        let mut buffer = self.stdout.buffer();
        writeln!(&mut buffer, "{}", line)?;
        self.stdout.print(&buffer)
    }

    /// Print an info message (normal output)
    pub fn info(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let marker = Marker {
            symbol: "ℹ",
            color: Color::Cyan,
            bold: false,
            tint_message: false,
        };
        self.write_marked(&self.stdout, &marker, message)
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let marker = Marker {
            symbol: "✓",
            color: Color::Green,
            bold: true,
            tint_message: false,
        };
        self.write_marked(&self.stdout, &marker, message)
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let marker = Marker {
            symbol: "⚠",
            color: Color::Yellow,
            bold: true,
            tint_message: true,
        };
        self.write_marked(&self.stdout, &marker, message)
    }

    /// Print an error message to stderr (always shown)
    pub fn error(&self, message: &str) {
        let stderr = BufferWriter::stderr(ColorChoice::Auto);
        let marker = Marker {
            symbol: "✗",
            color: Color::Red,
            bold: true,
            tint_message: true,
        };
        if self.write_marked(&stderr, &marker, message).is_err() {
            eprintln!("✗ {}", message);
        }
    }

    /// Print a verbose/debug message (only in verbose mode)
    pub fn verbose(&self, message: &str) -> std::io::Result<()> {
        if !self.verbose || self.quiet {
            return Ok(());
        }
        let marker = Marker {
            symbol: "→",
            color: Color::Blue,
            bold: false,
            tint_message: false,
        };
        self.write_marked(&self.stdout, &marker, message)
    }

    /// Print a section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut buffer = self.stdout.buffer();
        writeln!(&mut buffer)?;
        buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        writeln!(&mut buffer, "═══ {} ═══", title)?;
        buffer.reset()?;
        self.stdout.print(&buffer)
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write_plain(&format!("    {}", message))
    }

    /// Print a plain message (respects quiet mode)
    pub fn println(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write_plain(message)
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

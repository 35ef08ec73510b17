//! Colored terminal output.
//!
//! Progress goes to stdout, warnings and errors to stderr. Colors are
//! disabled automatically when the stream is not a terminal.

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use std::io::{self, IsTerminal, Write};

/// Terminal printer honoring verbose and quiet modes.
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
}

impl OutputManager {
    /// Creates a printer. `quiet` suppresses everything but errors.
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Whether `verbose` messages are printed.
    pub fn is_verbose(&self) -> bool {
        self.verbose && !self.quiet
    }

    fn stdout() -> StandardStream {
        let choice = if io::stdout().is_terminal() {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        StandardStream::stdout(choice)
    }

    fn stderr() -> StandardStream {
        let choice = if io::stderr().is_terminal() {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        StandardStream::stderr(choice)
    }

    fn write_tagged(
        stream: &mut impl WriteColor,
        tag: &str,
        color: Color,
        message: &str,
    ) -> io::Result<()> {
        stream.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(stream, "{tag}")?;
        stream.reset()?;
        writeln!(stream, " {message}")
    }

    /// Print verbose message if in verbose mode
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.is_verbose() {
            return Ok(());
        }
        let mut out = Self::stdout();
        out.set_color(ColorSpec::new().set_dimmed(true))?;
        writeln!(out, "{message}")?;
        out.reset()
    }

    /// Print progress message
    pub fn progress(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        Self::write_tagged(&mut Self::stdout(), "→", Color::Cyan, message)
    }

    /// Print success message
    pub fn success(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        Self::write_tagged(&mut Self::stdout(), "✓", Color::Green, message)
    }

    /// Print warning message
    pub fn warn(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        Self::write_tagged(&mut Self::stderr(), "⚠", Color::Yellow, message)
    }

    /// Print error message (shown even in quiet mode)
    pub fn error(&self, message: &str) -> io::Result<()> {
        Self::write_tagged(&mut Self::stderr(), "✗", Color::Red, message)
    }

    /// Print section header
    pub fn section(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut out = Self::stdout();
        writeln!(out)?;
        out.set_color(ColorSpec::new().set_bold(true).set_underline(true))?;
        writeln!(out, "{title}")?;
        out.reset()
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(Self::stdout(), "    {message}")
    }

    /// Print an indented line to stderr (shown even in quiet mode)
    pub fn indent_err(&self, message: &str) -> io::Result<()> {
        writeln!(Self::stderr(), "    {message}")
    }
}

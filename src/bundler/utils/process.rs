//! External tool invocation.
//!
//! Every external program the pipeline uses (packager, transcoders, hdiutil,
//! makensis) is reached through [`ToolRunner`]. Production code uses
//! [`SystemToolRunner`]; tests substitute fakes that produce files directly.

use crate::bundler::error::{Error, Result};
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Mutex;

/// Number of stderr lines kept in error messages.
const STDERR_TAIL_LINES: usize = 12;

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    program: String,
    args: Vec<OsString>,
}

impl ToolInvocation {
    /// Starts an invocation of `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Program name as configured.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments in order.
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// Value following the flag `name`, if present.
    pub fn flag_value(&self, name: &str) -> Option<&OsStr> {
        self.args
            .iter()
            .position(|a| a == name)
            .and_then(|i| self.args.get(i + 1))
            .map(OsString::as_os_str)
    }

    /// All values following occurrences of the flag `name`.
    pub fn flag_values(&self, name: &str) -> Vec<&OsStr> {
        self.args
            .windows(2)
            .filter(|w| w[0] == name)
            .map(|w| w[1].as_os_str())
            .collect()
    }

    /// Human-readable command line for logs.
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

/// Captured result of a finished tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code; `None` when terminated by a signal.
    pub code: Option<i32>,
    /// Captured stdout (lossy UTF-8).
    pub stdout: String,
    /// Captured stderr (lossy UTF-8).
    pub stderr: String,
}

impl ToolOutput {
    /// Successful run with no output.
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            ..Default::default()
        }
    }

    /// Failed run with the given code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Whether the tool exited with status 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Last lines of stderr, for diagnostics.
    pub fn stderr_tail(&self) -> String {
        let lines: Vec<&str> = self.stderr.lines().collect();
        let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
        lines[start..].join("\n")
    }
}

/// Runs external programs.
///
/// Invocations are synchronous from the pipeline's point of view: each call
/// resolves once the program has exited. No timeout is applied.
pub trait ToolRunner: Send + Sync + 'static {
    /// Whether `program` can be executed.
    fn is_available(&self, program: &str) -> bool;

    /// Runs the invocation to completion and captures its output.
    ///
    /// Returns `Err` only if the program could not be started; a non-zero
    /// exit is reported through [`ToolOutput::code`].
    fn run(&self, invocation: &ToolInvocation)
    -> impl Future<Output = Result<ToolOutput>> + Send;
}

/// Runs `invocation` and turns a non-zero exit into [`Error::ToolFailed`].
pub async fn run_checked<R: ToolRunner + ?Sized>(
    runner: &R,
    invocation: &ToolInvocation,
) -> Result<ToolOutput> {
    log::debug!("Running: {}", invocation.display());
    let output = runner.run(invocation).await?;
    if !output.success() {
        return Err(Error::ToolFailed {
            tool: invocation.program().to_string(),
            code: output.code,
            stderr: output.stderr_tail(),
        });
    }
    Ok(output)
}

/// [`ToolRunner`] backed by `tokio::process` and `PATH` lookup.
///
/// Program locations are resolved with `which` once and cached.
#[derive(Debug, Default)]
pub struct SystemToolRunner {
    resolved: Mutex<HashMap<String, Option<PathBuf>>>,
}

impl SystemToolRunner {
    /// Creates a runner with an empty lookup cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve(&self, program: &str) -> Option<PathBuf> {
        let mut cache = match self.resolved.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache
            .entry(program.to_string())
            .or_insert_with(|| match which::which(program) {
                Ok(path) => {
                    log::debug!("Found {} at: {}", program, path.display());
                    Some(path)
                }
                Err(e) => {
                    log::debug!("{} not found in PATH: {}", program, e);
                    None
                }
            })
            .clone()
    }
}

impl ToolRunner for SystemToolRunner {
    fn is_available(&self, program: &str) -> bool {
        self.resolve(program).is_some()
    }

    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput> {
        let path = self
            .resolve(invocation.program())
            .ok_or_else(|| Error::ToolMissing {
                tool: invocation.program().to_string(),
                purpose: "this stage",
            })?;

        let output = tokio::process::Command::new(&path)
            .args(invocation.arguments())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|error| Error::CommandFailed {
                command: invocation.program().to_string(),
                error,
            })?;

        Ok(ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

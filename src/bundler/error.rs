//! Pipeline error type and context helpers.
//!
//! Every stage returns [`Result`]. Fatal conditions (missing sources, missing
//! tools, failed packagers, audit violations) are variants of [`Error`];
//! per-file media failures never reach this type.

use super::audit::AuditResult;
use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
};

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by pipeline stages.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Free-form error with a descriptive message.
    #[error("{0}")]
    GenericError(String),

    /// Filesystem operation failed on a known path.
    #[error("{context} {}: {error}", .path.display())]
    Fs {
        /// What was being done.
        context: &'static str,
        /// Path the operation touched.
        path: PathBuf,
        /// Underlying error.
        error: io::Error,
    },

    /// Bare I/O error.
    #[error(transparent)]
    IoError(#[from] io::Error),

    /// Directory traversal failed.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Path prefix stripping failed.
    #[error(transparent)]
    StripPrefix(#[from] std::path::StripPrefixError),

    /// Spawning an external command failed.
    #[error("failed to run `{command}`: {error}")]
    CommandFailed {
        /// Program name.
        command: String,
        /// Spawn error.
        error: io::Error,
    },

    /// External command ran and exited unsuccessfully.
    #[error("`{tool}` exited with {}: {stderr}", .code.map_or_else(|| "signal".to_string(), |c| format!("status {c}")))]
    ToolFailed {
        /// Program name.
        tool: String,
        /// Exit code, `None` if killed by a signal.
        code: Option<i32>,
        /// Tail of the captured stderr.
        stderr: String,
    },

    /// Required external tool is not installed.
    #[error("required tool `{tool}` not found on PATH (needed for {purpose})")]
    ToolMissing {
        /// Program name.
        tool: String,
        /// Stage that needs it.
        purpose: &'static str,
    },

    /// An external tool reported success but its output is absent.
    #[error("{stage}: expected output not found at {}", .path.display())]
    MissingOutput {
        /// Stage that produced nothing.
        stage: &'static str,
        /// Expected output location.
        path: PathBuf,
    },

    /// Source resource tree does not exist or is not a directory.
    #[error("resource directory not found: {}", .0.display())]
    SourceMissing(PathBuf),

    /// The leak audit found violations; nothing was shipped.
    #[error("release audit failed with {} violation(s); nothing was shipped", .0.violations.len())]
    AuditFailed(AuditResult),

    /// Image decoding/encoding error.
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// Property list error.
    #[error(transparent)]
    Plist(#[from] plist::Error),

    /// JSON serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AuditFailed(_) => 2,
            _ => 1,
        }
    }
}

/// Attach path context to I/O results.
pub trait ErrorExt<T> {
    /// Convert an I/O error into [`Error::Fs`] naming the operation and path.
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Attach a message to a failure or an absent value.
pub trait Context<T> {
    /// Wrap the failure with `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Wrap the failure with a lazily built context.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error> Context<T> for std::result::Result<T, E> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::GenericError(format!("{context}: {e}")))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::GenericError(format!("{}: {e}", f())))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Return early with an [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError(format!($msg)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}

//! Release packaging pipeline for media-bundled desktop applications
//!
//! This library provides the complete release path for a desktop app whose
//! resources ship inside the application bundle:
//! - Resource staging and media transcoding (images, audio, video remux)
//! - Application bundle assembly through an external packager
//! - Developer-state sanitization and leak auditing
//! - macOS disk images (.dmg) and Windows installers (.exe via NSIS)
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};

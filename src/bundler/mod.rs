//! Release pipeline for media-bundled desktop applications.
//!
//! # Overview
//!
//! A release runs as a strictly linear sequence of stages, each consuming the
//! previous stage's output:
//!
//! 1. Preflight: required tools and developer-state location
//! 2. Clean: staging and build directories recreated from scratch
//! 3. [`resources::stage`]: copy the resource tree, remapping extensions
//! 4. [`resources::transcode`]: shrink images/audio, remux video
//! 5. [`platform::app::assemble_bundle`]: run the application packager
//! 6. [`audit::sanitize`]: delete developer-only state from the bundle
//! 7. [`audit::audit`]: verify no forbidden file or canary remains
//! 8. [`PackageFormat::assemble`]: produce the .dmg / -setup.exe
//! 9. Publish: move the artifact into the output directory, clean up
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use kodegen_bundler_desktop::bundler::{Pipeline, Platform, ReleaseContextBuilder, SystemToolRunner};
//!
//! # async fn example() -> kodegen_bundler_desktop::bundler::Result<()> {
//! let ctx = ReleaseContextBuilder::new()
//!     .platform(Platform::MacOs)
//!     .version("1.2.0")
//!     .product_name("Fleet Snowfluff")
//!     .resources_dir("resources")
//!     .entry_point("main.py")
//!     .staging_dir("build/staging_resources")
//!     .build_dir("build/bundle")
//!     .output_dir("dist")
//!     .build()?;
//!
//! let outcome = Pipeline::new(ctx, Arc::new(SystemToolRunner::new())).run().await?;
//! println!("Created {} (sha256 {})", outcome.artifact.display(), outcome.checksum);
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`settings`] - [`ReleaseContext`] and policies
//! - [`resources`] - staging, media transcoding, icon preparation
//! - [`audit`] - forbidden artifacts, sanitizer, leak auditor
//! - [`platform`] - application packager and per-platform package assemblers
//! - [`builder`] - the [`Pipeline`] orchestrator and release report
//! - [`utils`] - filesystem and process helpers

pub mod audit;
pub mod builder;
pub mod error;
pub mod platform;
pub mod resources;
pub mod settings;
pub mod utils;

pub use audit::{
    AuditResult, Canary, DeveloperState, ForbiddenArtifactSet, Violation, ViolationReason,
};
pub use builder::{NoopObserver, Pipeline, ReleaseOutcome, ReleaseReport, Stage, StageObserver};
pub use error::{Error, Result};
pub use platform::PackageFormat;
pub use resources::{FileOutcome, StagedResource, TranscodeReport};
pub use settings::{
    AuditSettings, DmgFormat, NsisCompression, PackageSettings, Platform, ReleaseContext,
    ReleaseContextBuilder, TranscodePolicy,
};
pub use utils::process::{SystemToolRunner, ToolInvocation, ToolOutput, ToolRunner};

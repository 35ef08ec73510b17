//! Platform-specific bundle and installer assembly.
//!
//! [`app::assemble_bundle`] turns the entry point plus the staged resources
//! into a native application bundle through the configured packager.
//! [`PackageFormat`] then wraps that bundle into the distributable artifact.

pub mod app;
pub mod macos;
pub mod windows;

use crate::bundler::{
    error::{Error, Result},
    settings::{Platform, ReleaseContext},
    utils::{fs, process::ToolRunner},
};
use std::path::{Path, PathBuf};

/// Distributable artifact format, one per platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageFormat {
    /// macOS disk image built with `hdiutil`.
    Dmg,
    /// Windows installer built with `makensis`.
    Nsis,
}

impl PackageFormat {
    /// Format used for `platform`.
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::MacOs => Self::Dmg,
            Platform::Windows => Self::Nsis,
        }
    }

    /// Program that assembles this format.
    pub fn required_tool(self) -> &'static str {
        match self {
            Self::Dmg => "hdiutil",
            Self::Nsis => "makensis",
        }
    }

    /// Builds the artifact into `ctx.package_dir()`.
    ///
    /// The artifact is only verified here; moving it to the output directory
    /// is the caller's job, once every gate has passed.
    ///
    /// # Errors
    /// [`Error::ToolFailed`] if the tool fails, [`Error::MissingOutput`] if
    /// it exits cleanly but leaves no (or an empty) artifact.
    pub async fn assemble<R: ToolRunner>(
        self,
        ctx: &ReleaseContext,
        runner: &R,
        icon: Option<&Path>,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&ctx.package_dir(), true).await?;

        let artifact = match self {
            Self::Dmg => macos::dmg::bundle_project(ctx, runner).await?,
            Self::Nsis => windows::nsis::bundle_project(ctx, runner, icon).await?,
        };

        if fs::file_len(&artifact).await == 0 {
            return Err(Error::MissingOutput {
                stage: "package",
                path: artifact,
            });
        }

        log::info!("Assembled {}", artifact.display());
        Ok(artifact)
    }
}

//! Windows NSIS installer creation.
//!
//! Creates per-user Windows installers using NSIS (Nullsoft Scriptable
//! Install System) with a Modern UI wizard and a stable uninstall identity.
//!
//! # Module Organization
//!
//! - `template` - NSI script template constant
//! - `script` - NSI script generation from templates
//! - `build` - makensis execution and compilation
//! - `utils` - Helper functions (compression, version formatting, upgrade GUID)

mod build;
mod script;
mod template;
mod utils;

pub use build::makensis_invocation;
pub use script::render_nsi_script;

use crate::bundler::{
    error::{ErrorExt, Result},
    settings::ReleaseContext,
    utils::process::ToolRunner,
};
use std::path::{Path, PathBuf};

/// Bundle the release's onedir folder as an NSIS installer.
///
/// # Process
///
/// 1. Generate the NSI script from the template
/// 2. Compile it with makensis into `ctx.package_dir()`
///
/// # Returns
///
/// Path to the generated installer .exe file
pub async fn bundle_project<R: ToolRunner>(
    ctx: &ReleaseContext,
    runner: &R,
    icon: Option<&Path>,
) -> Result<PathBuf> {
    log::info!("Building NSIS installer for {}", ctx.product_name());

    let script_dir = ctx.build_dir().join("nsis");
    tokio::fs::create_dir_all(&script_dir)
        .await
        .fs_context("creating NSIS script directory", &script_dir)?;

    let nsi_path = script::generate_nsi_script(ctx, icon, &script_dir).await?;

    let installer_path = ctx.package_dir().join(ctx.artifact_name());
    build::run_makensis(runner, &nsi_path, &installer_path).await?;

    log::info!("✓ Created NSIS installer: {}", installer_path.display());

    Ok(installer_path)
}

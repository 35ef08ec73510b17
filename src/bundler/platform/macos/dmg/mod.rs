//! macOS DMG disk image creator.
//!
//! Creates drag-to-install DMG files using the native hdiutil tool. The DMG
//! holds the sanitized, audited `.app` bundle and an Applications symlink.

mod creation;

use crate::bundler::{
    error::Result,
    settings::ReleaseContext,
    utils::process::ToolRunner,
};
use std::path::PathBuf;

pub use creation::{create_dmg, hdiutil_invocation};

/// Bundle the release's `.app` as a DMG disk image.
///
/// # Process
/// 1. Locate the `.app` produced by the bundle assembler
/// 2. Copy it into a scratch source folder next to an Applications symlink
/// 3. Run hdiutil with the configured format
///
/// # Returns
/// Path to the DMG inside `ctx.package_dir()`.
pub async fn bundle_project<R: ToolRunner>(ctx: &ReleaseContext, runner: &R) -> Result<PathBuf> {
    log::info!("Creating DMG for {}", ctx.product_name());

    let dmg_path = ctx.package_dir().join(ctx.artifact_name());
    create_dmg(
        runner,
        &ctx.bundle_dir(),
        ctx.product_name(),
        ctx.package().dmg_format.as_str(),
        ctx.build_dir(),
        &dmg_path,
    )
    .await?;

    Ok(dmg_path)
}

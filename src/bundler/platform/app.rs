//! Application bundle assembly through the configured packager.

use super::macos::info_plist;
use crate::bundler::{
    error::{Error, Result},
    settings::{Platform, ReleaseContext},
    utils::{
        fs,
        process::{ToolInvocation, ToolRunner, run_checked},
    },
};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Destination of the staged resources inside the bundle.
const RESOURCE_DEST: &str = "resources";

/// Packager invocation for `ctx`.
pub fn packager_invocation(ctx: &ReleaseContext, icon: Option<&Path>) -> ToolInvocation {
    let mut add_data = OsString::from(ctx.staging_dir());
    add_data.push(ctx.platform().data_separator().to_string());
    add_data.push(RESOURCE_DEST);

    let mut inv = ToolInvocation::new(ctx.packager())
        .args(["--noconfirm", "--clean", "--windowed", "--name", ctx.product_name()])
        .arg("--distpath")
        .arg(ctx.dist_dir())
        .arg("--workpath")
        .arg(ctx.work_dir())
        .arg("--specpath")
        .arg(ctx.build_dir())
        .arg("--add-data")
        .arg(add_data);

    if let Some(icon) = icon {
        inv = inv.arg("--icon").arg(icon);
    }
    if ctx.platform() == Platform::MacOs {
        inv = inv
            .arg("--osx-bundle-identifier")
            .arg(ctx.package().identifier_or(ctx.product_name()));
    }
    for module in ctx.exclude_modules() {
        inv = inv.arg("--exclude-module").arg(module);
    }

    inv.arg(ctx.entry_point())
}

/// Runs the packager and verifies the bundle it produced.
///
/// On macOS the bundle's `Info.plist` is stamped with the release version.
///
/// # Returns
/// The bundle directory (`<name>.app` on macOS, `<name>/` on Windows).
///
/// # Errors
/// [`Error::ToolMissing`] if the packager is not installed,
/// [`Error::ToolFailed`] on a non-zero exit, [`Error::MissingOutput`] if the
/// expected bundle is absent afterwards.
pub async fn assemble_bundle<R: ToolRunner>(
    ctx: &ReleaseContext,
    runner: &R,
    icon: Option<&Path>,
) -> Result<PathBuf> {
    if !runner.is_available(ctx.packager()) {
        return Err(Error::ToolMissing {
            tool: ctx.packager().to_string(),
            purpose: "building the application bundle",
        });
    }

    fs::create_dir_all(ctx.build_dir(), false).await?;

    log::info!("Packaging {} with {}", ctx.product_name(), ctx.packager());
    run_checked(runner, &packager_invocation(ctx, icon)).await?;

    let marker = ctx.bundle_marker();
    let present = match ctx.platform() {
        Platform::MacOs => marker.is_dir(),
        Platform::Windows => marker.is_file(),
    };
    if !present {
        return Err(Error::MissingOutput {
            stage: "bundle",
            path: marker,
        });
    }

    let bundle = ctx.bundle_dir();
    if ctx.platform() == Platform::MacOs {
        info_plist::stamp(&bundle, ctx.version(), ctx.product_name())?;
    }

    log::info!("Bundle ready: {}", bundle.display());
    Ok(bundle)
}

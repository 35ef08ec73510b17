//! Core DMG creation logic using hdiutil.
//!
//! Handles the DMG creation workflow:
//! - Staging the `.app` in a scratch source folder
//! - Creating the Applications symlink
//! - Running hdiutil to generate the DMG

use crate::bundler::{
    error::{Context, Error, Result},
    utils::{
        fs,
        process::{ToolInvocation, ToolRunner, run_checked},
    },
};
use std::path::Path;

/// hdiutil command line for a DMG of `src_folder`.
pub fn hdiutil_invocation(
    volname: &str,
    src_folder: &Path,
    format: &str,
    dmg_path: &Path,
) -> ToolInvocation {
    ToolInvocation::new("hdiutil")
        .args(["create", "-volname", volname, "-srcfolder"])
        .arg(src_folder)
        .args(["-ov", "-format", format])
        .arg(dmg_path)
}

/// Create a DMG from an `.app` bundle using hdiutil.
///
/// # DMG Creation Steps
/// 1. Create a scratch source folder under `scratch_parent` using tempfile
/// 2. Copy the `.app` bundle into it (symlinks preserved)
/// 3. Create the `Applications -> /Applications` symlink
/// 4. Run `hdiutil create` with the requested format
/// 5. Scratch folder is removed when dropped
pub async fn create_dmg<R: ToolRunner>(
    runner: &R,
    app_bundle: &Path,
    volname: &str,
    format: &str,
    scratch_parent: &Path,
    dmg_path: &Path,
) -> Result<()> {
    if !app_bundle.is_dir() {
        return Err(Error::MissingOutput {
            stage: "bundle",
            path: app_bundle.to_path_buf(),
        });
    }

    fs::remove_file(dmg_path).await?;

    let temp_dir = tempfile::Builder::new()
        .prefix("dmg-src-")
        .tempdir_in(scratch_parent)
        .with_context(|| {
            format!(
                "creating DMG source folder in {}",
                scratch_parent.display()
            )
        })?;
    let staging_path = temp_dir.path();

    let app_name = app_bundle
        .file_name()
        .ok_or_else(|| Error::GenericError("Invalid app bundle path".into()))?;
    let staged_app = staging_path.join(app_name);

    log::debug!("Copying .app to DMG source: {}", staged_app.display());
    fs::copy_dir(app_bundle, &staged_app).await?;

    #[cfg(unix)]
    {
        use crate::bundler::error::ErrorExt;
        let applications_link = staging_path.join("Applications");
        std::os::unix::fs::symlink("/Applications", &applications_link)
            .fs_context("creating Applications symlink", &applications_link)?;
    }

    log::info!("Creating DMG with format {}...", format);
    run_checked(
        runner,
        &hdiutil_invocation(volname, staging_path, format, dmg_path),
    )
    .await?;

    log::info!("✓ Created {} DMG: {}", format, dmg_path.display());

    drop(temp_dir);

    Ok(())
}

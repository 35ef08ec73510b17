//! NSIS installer build execution.
//!
//! Compiles NSI scripts into Windows installer executables using makensis.

use crate::bundler::{
    error::{ErrorExt, Result},
    utils::process::{ToolInvocation, ToolRunner, run_checked},
};
use std::ffi::OsString;
use std::path::Path;

/// makensis command line compiling `nsi_path` into `output_path`.
pub fn makensis_invocation(nsi_path: &Path, output_path: &Path) -> ToolInvocation {
    let mut output_define = OsString::from("-DOUTPUT_FILE=");
    output_define.push(output_path);

    ToolInvocation::new("makensis")
        .args(["-V3", "-INPUTCHARSET", "UTF8", "-OUTPUTCHARSET", "UTF8"])
        .arg(output_define)
        .arg(nsi_path)
}

/// Run makensis to compile NSI script into installer executable.
///
/// # Arguments
/// - `nsi_path` - Path to the NSI script file to compile
/// - `output_path` - Path where the installer .exe should be created
pub async fn run_makensis<R: ToolRunner>(
    runner: &R,
    nsi_path: &Path,
    output_path: &Path,
) -> Result<()> {
    log::info!("Running makensis...");

    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating installer output directory", parent)?;
    }

    run_checked(runner, &makensis_invocation(nsi_path, output_path)).await?;

    Ok(())
}

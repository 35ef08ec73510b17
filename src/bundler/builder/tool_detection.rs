//! External tool availability checking.
//!
//! The packager and the package tool are hard requirements and are checked
//! before any work starts. Media tools are optional: without them the
//! transcoder leaves files as staged.

use crate::bundler::{
    error::{Error, Result},
    platform::PackageFormat,
    settings::ReleaseContext,
    utils::process::ToolRunner,
};

/// Programs the transcoder can use, with what they are used for.
const MEDIA_TOOLS: &[(&str, &str)] = &[
    ("magick", "image requantization"),
    ("ffmpeg", "audio re-encoding and video remux"),
];

/// Fails fast with [`Error::ToolMissing`] if a required tool is absent.
pub fn require_tools<R: ToolRunner + ?Sized>(runner: &R, ctx: &ReleaseContext) -> Result<()> {
    let format = PackageFormat::for_platform(ctx.platform());
    let required = [
        (ctx.packager(), "building the application bundle"),
        (format.required_tool(), "assembling the installer package"),
    ];

    for (tool, purpose) in required {
        if !runner.is_available(tool) {
            return Err(Error::ToolMissing {
                tool: tool.to_string(),
                purpose,
            });
        }
        log::debug!("✓ {} available", tool);
    }

    for (tool, purpose) in MEDIA_TOOLS {
        if runner.is_available(tool) {
            log::debug!("✓ {} available", tool);
        } else {
            log::warn!("{} not found; {} will be skipped", tool, purpose);
        }
    }

    Ok(())
}

//! Command line interface for the desktop release packager.
//!
//! This module parses arguments, resolves the version, runs the release
//! pipeline and turns its outcome into user feedback and an exit code.

mod args;
mod output;

pub use args::{Args, Command, PlatformArgs, RuntimeConfig, parse_toggle};
pub use output::OutputManager;

use crate::bundler::{
    Error, FileOutcome, Pipeline, ReleaseOutcome, ReleaseReport, SystemToolRunner,
};
use crate::error::{BundlerError, CliError, Result};
use crate::metadata;
use std::sync::Arc;

/// Exit code for a published release.
pub const EXIT_SUCCESS: i32 = 0;

/// Main CLI entry point
///
/// Returns the process exit code: 0 when the artifact was published, 2 when
/// the bundle failed its audit, 1 for any other failure.
pub async fn run() -> Result<i32> {
    let args = match Args::parse_args() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { EXIT_SUCCESS };
            e.print()?;
            return Ok(code);
        }
    };
    let config = Arc::new(RuntimeConfig::from(&args));

    args.validate()
        .map_err(|reason| BundlerError::Cli(CliError::InvalidArguments { reason }))?;

    let (platform, opts) = args.target();
    let version = metadata::resolve_version(opts.version.as_deref(), &opts.metadata);
    let ctx = opts.release_context(platform, version)?;

    config.section(&format!(
        "Releasing {} {} for {}",
        ctx.product_name(),
        ctx.version(),
        platform
    ))?;

    let pipeline = Pipeline::new(ctx, Arc::new(SystemToolRunner::new()))
        .with_observer(Arc::clone(&config) as Arc<dyn crate::bundler::StageObserver>);

    match pipeline.run().await {
        Ok(outcome) => {
            print_media_summary(&config, &outcome)?;
            config.success(&format!("Published {}", outcome.artifact.display()))?;
            config.indent(&format!("size:   {} bytes", outcome.size))?;
            config.indent(&format!("sha256: {}", outcome.checksum))?;

            if let Some(path) = &opts.report {
                ReleaseReport::new(pipeline.context(), &outcome)
                    .write(path)
                    .await?;
                config.indent(&format!("report: {}", path.display()))?;
            }
            Ok(EXIT_SUCCESS)
        }
        Err(Error::AuditFailed(result)) => {
            config.error("Audit failed, nothing shipped")?;
            for violation in &result.violations {
                config.output().indent_err(&violation.to_string())?;
            }
            Ok(Error::AuditFailed(result).exit_code())
        }
        Err(e) => {
            config.error(&format!("Build tooling failed: {}", e))?;
            Ok(e.exit_code())
        }
    }
}

fn print_media_summary(config: &RuntimeConfig, outcome: &ReleaseOutcome) -> std::io::Result<()> {
    let report = &outcome.transcode;
    config.progress(&format!(
        "Media: {} optimized, {} remuxed, {} skipped, {} copied, {} bytes saved",
        report.optimized, report.remuxed, report.skipped, report.copied, report.bytes_saved
    ))?;

    for resource in outcome.staged.iter().filter(|r| r.is_remapped()) {
        config.output().verbose(&format!(
            "    staged {} as {}",
            resource.source_path.display(),
            resource.relative_path.display()
        ))?;
    }
    for file in &report.files {
        if let FileOutcome::Skipped {
            relative_path,
            reason,
        } = file
        {
            config.output().verbose(&format!(
                "    kept {} ({:?})",
                relative_path.display(),
                reason
            ))?;
        }
    }
    if outcome.sanitized > 0 {
        config.warn(&format!(
            "Removed {} developer-state file(s) the packager copied into the bundle",
            outcome.sanitized
        ))?;
    }
    Ok(())
}

//! Main release orchestration.
//!
//! This module provides the [`Pipeline`] that runs every stage in order and
//! guarantees the output directory receives either exactly one audited
//! artifact or nothing.

use super::{
    checksum::calculate_sha256,
    observer::{NoopObserver, Stage, StageObserver},
    tool_detection::require_tools,
};
use crate::bundler::{
    audit::{self, DeveloperState},
    error::{Error, Result},
    platform::{PackageFormat, app},
    resources::{self, StagedResource, TranscodeReport, icons},
    settings::ReleaseContext,
    utils::{fs, process::ToolRunner},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of a successful release.
#[derive(Debug, Clone)]
pub struct ReleaseOutcome {
    /// Published artifact inside the output directory.
    pub artifact: PathBuf,
    /// Artifact size in bytes.
    pub size: u64,
    /// Hex SHA-256 of the artifact.
    pub checksum: String,
    /// Files staged into the bundle.
    pub staged: Vec<StagedResource>,
    /// Media optimization summary.
    pub transcode: TranscodeReport,
    /// Developer-state files removed by the sanitizer.
    pub sanitized: usize,
}

/// Release pipeline for one platform.
///
/// Runs, strictly in order: preflight, staging, transcoding, icon
/// preparation, bundle assembly, sanitization, audit, package assembly and
/// publishing. Any stage error aborts the run. Whatever the outcome, the
/// staging and build directories are removed afterwards.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use kodegen_bundler_desktop::bundler::{Pipeline, ReleaseContext, SystemToolRunner};
///
/// # async fn example(ctx: ReleaseContext) -> kodegen_bundler_desktop::bundler::Result<()> {
/// let outcome = Pipeline::new(ctx, Arc::new(SystemToolRunner::new())).run().await?;
/// println!("{} bytes", outcome.size);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<R: ToolRunner> {
    ctx: ReleaseContext,
    runner: Arc<R>,
    observer: Arc<dyn StageObserver>,
    developer_state: DeveloperState,
}

impl<R: ToolRunner> std::fmt::Debug for Pipeline<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("ctx", &self.ctx)
            .field("developer_state", &self.developer_state)
            .finish_non_exhaustive()
    }
}

impl<R: ToolRunner> Pipeline<R> {
    /// Creates a pipeline for `ctx` using the host's developer-state location.
    pub fn new(ctx: ReleaseContext, runner: Arc<R>) -> Self {
        Self {
            ctx,
            runner,
            observer: Arc::new(NoopObserver),
            developer_state: DeveloperState::discover(),
        }
    }

    /// Receives stage notifications.
    pub fn with_observer(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Overrides the developer-state directories checked in preflight.
    pub fn with_developer_state(mut self, state: DeveloperState) -> Self {
        self.developer_state = state;
        self
    }

    /// The release being built.
    pub fn context(&self) -> &ReleaseContext {
        &self.ctx
    }

    /// Runs the release.
    ///
    /// # Errors
    ///
    /// [`Error::AuditFailed`] if the bundle still contains developer state
    /// after sanitization; any other variant for tooling or I/O failures.
    /// In every error case the output directory is left without an artifact
    /// from this run.
    pub async fn run(&self) -> Result<ReleaseOutcome> {
        let result = self.execute().await;

        if let Err(e) = &result {
            log::error!("Release failed: {}", e);
        }
        self.cleanup().await;

        result
    }

    async fn execute(&self) -> Result<ReleaseOutcome> {
        let ctx = &self.ctx;
        let format = PackageFormat::for_platform(ctx.platform());

        self.begin(Stage::Preflight);
        self.preflight()?;
        fs::create_dir_all(ctx.build_dir(), true).await?;
        self.end(Stage::Preflight);

        self.begin(Stage::StageResources);
        let mut staged =
            resources::stage(ctx.resources_dir(), ctx.staging_dir(), ctx.transcode()).await?;
        self.end(Stage::StageResources);

        self.begin(Stage::Transcode);
        let transcode =
            resources::transcode(Arc::clone(&self.runner), ctx.staging_dir(), ctx.transcode())
                .await?;
        resources::record_outcomes(&mut staged, &transcode);
        self.end(Stage::Transcode);

        self.begin(Stage::PrepareIcon);
        let icon = self.prepare_icon().await;
        self.end(Stage::PrepareIcon);

        self.begin(Stage::AssembleBundle);
        let bundle = app::assemble_bundle(ctx, self.runner.as_ref(), icon.as_deref()).await?;
        self.end(Stage::AssembleBundle);

        self.begin(Stage::Sanitize);
        let forbidden = ctx.audit().forbidden.clone();
        let sanitized = {
            let bundle = bundle.clone();
            blocking(move || audit::sanitize(&bundle, &forbidden)).await?
        };
        self.end(Stage::Sanitize);

        self.begin(Stage::Audit);
        let forbidden = ctx.audit().forbidden.clone();
        let canary = ctx.audit().canary.clone();
        let result = {
            let bundle = bundle.clone();
            blocking(move || audit::audit(&bundle, &forbidden, canary.as_ref())).await?
        };
        if !result.is_clean() {
            return Err(Error::AuditFailed(result));
        }
        log::info!("✓ Audit passed: {}", bundle.display());
        self.end(Stage::Audit);

        self.begin(Stage::Package);
        let packaged = format
            .assemble(ctx, self.runner.as_ref(), icon.as_deref())
            .await?;
        let checksum = calculate_sha256(&packaged).await?;
        self.end(Stage::Package);

        self.begin(Stage::Publish);
        let artifact = ctx.artifact_path();
        fs::create_dir_all(ctx.output_dir(), false).await?;
        fs::move_file(&packaged, &artifact).await?;
        let size = fs::file_len(&artifact).await;
        log::info!("✓ Published {} ({} bytes)", artifact.display(), size);
        self.end(Stage::Publish);

        Ok(ReleaseOutcome {
            artifact,
            size,
            checksum,
            staged,
            transcode,
            sanitized,
        })
    }

    /// Checks that must pass before anything is written.
    fn preflight(&self) -> Result<()> {
        let ctx = &self.ctx;

        if !ctx.resources_dir().is_dir() {
            return Err(Error::SourceMissing(ctx.resources_dir().to_path_buf()));
        }
        if !ctx.entry_point().is_file() {
            return Err(Error::GenericError(format!(
                "entry point not found: {}",
                ctx.entry_point().display()
            )));
        }

        ensure_separate(ctx.staging_dir(), "staging", ctx.resources_dir(), "resource")?;
        ensure_separate(ctx.build_dir(), "build", ctx.resources_dir(), "resource")?;
        ensure_separate(ctx.output_dir(), "output", ctx.staging_dir(), "staging")?;
        ensure_separate(ctx.output_dir(), "output", ctx.build_dir(), "build")?;

        require_tools(self.runner.as_ref(), ctx)?;

        self.developer_state.ensure_disjoint(ctx.resources_dir())?;
        for path in self.developer_state.present_files() {
            log::info!(
                "Developer state present at {} (never staged, removed from the bundle if copied)",
                path.display()
            );
        }

        Ok(())
    }

    /// Converts the configured icon; a failure only costs the icon.
    async fn prepare_icon(&self) -> Option<PathBuf> {
        let source = self.ctx.icon()?;
        match icons::prepare_icon(source, self.ctx.platform(), &self.ctx.icon_dir()).await {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Continuing without an icon: {}", e);
                None
            }
        }
    }

    async fn cleanup(&self) {
        fs::remove_dir_best_effort(self.ctx.staging_dir()).await;
        fs::remove_dir_best_effort(self.ctx.build_dir()).await;
    }

    fn begin(&self, stage: Stage) {
        log::debug!("Stage {}: {}", stage.number(), stage);
        self.observer.stage_started(stage, &self.ctx);
    }

    fn end(&self, stage: Stage) {
        self.observer.stage_finished(stage, &self.ctx);
    }
}

/// Rejects a pipeline-owned directory that overlaps another one.
///
/// Staging and build directories are erased on every run, so neither may
/// contain nor sit inside the resource tree or the output directory.
fn ensure_separate(dir: &Path, dir_role: &str, other: &Path, other_role: &str) -> Result<()> {
    if dir.starts_with(other) || other.starts_with(dir) {
        return Err(Error::GenericError(format!(
            "{} directory {} overlaps {} directory {}",
            dir_role,
            dir.display(),
            other_role,
            other.display()
        )));
    }
    Ok(())
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::GenericError(format!("Blocking task panicked: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_directories_are_rejected() {
        assert!(ensure_separate(Path::new("/p/resources/build"), "build", Path::new("/p/resources"), "resource").is_err());
        assert!(ensure_separate(Path::new("/p"), "output", Path::new("/p/build"), "build").is_err());
        assert!(ensure_separate(Path::new("/p/dist"), "output", Path::new("/p/build/bundle"), "build").is_ok());
    }
}

//! Machine-readable release report.

use super::ReleaseOutcome;
use crate::bundler::{
    error::{ErrorExt, Result},
    resources::TranscodeReport,
    settings::{Platform, ReleaseContext},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Summary of a successful release, written as JSON with `--report`.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseReport {
    pub product_name: String,
    pub version: String,
    pub platform: Platform,
    pub artifact: PathBuf,
    pub size: u64,
    pub sha256: String,
    pub staged_files: usize,
    pub remapped_files: usize,
    pub transcode: TranscodeReport,
    pub sanitized: usize,
    pub generated_at: DateTime<Utc>,
}

impl ReleaseReport {
    /// Builds the report for a finished run.
    pub fn new(ctx: &ReleaseContext, outcome: &ReleaseOutcome) -> Self {
        Self {
            product_name: ctx.product_name().to_string(),
            version: ctx.version().to_string(),
            platform: ctx.platform(),
            artifact: outcome.artifact.clone(),
            size: outcome.size,
            sha256: outcome.checksum.clone(),
            staged_files: outcome.staged.len(),
            remapped_files: outcome.staged.iter().filter(|r| r.is_remapped()).count(),
            transcode: outcome.transcode.clone(),
            sanitized: outcome.sanitized,
            generated_at: Utc::now(),
        }
    }

    /// Writes the report as pretty-printed JSON, creating parent directories.
    pub async fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .fs_context("creating report directory", parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json)
            .await
            .fs_context("writing release report", path)?;
        log::info!("Wrote release report: {}", path.display());
        Ok(())
    }
}

//! Resource staging and media optimization.
//!
//! The source resource tree is never modified. [`stage`] produces an isolated
//! copy (applying platform extension remaps), [`transcode`] shrinks media in
//! that copy in place, and [`icons`] converts the application icon into the
//! platform's container format.

pub mod icons;
mod stage;
mod transcode;

pub use stage::stage;
pub use transcode::{FileOutcome, SkipReason, TranscodeReport, transcode};

use serde::Serialize;
use std::path::PathBuf;

/// One file copied into the staging directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedResource {
    /// Path relative to the staging root (after extension remap).
    pub relative_path: PathBuf,
    /// Path relative to the source root.
    pub source_path: PathBuf,
    /// Source file size in bytes.
    pub original_size: u64,
    /// Current staged size in bytes.
    pub staged_size: u64,
    /// Whether the transcoder replaced the staged bytes.
    pub transcoded: bool,
}

impl StagedResource {
    /// Whether the staged name differs from the source name.
    pub fn is_remapped(&self) -> bool {
        self.relative_path != self.source_path
    }
}

/// Applies transcoder outcomes to the staging records.
pub fn record_outcomes(staged: &mut [StagedResource], report: &TranscodeReport) {
    for outcome in &report.files {
        if let FileOutcome::Replaced {
            relative_path,
            after,
            ..
        } = outcome
        {
            if let Some(resource) = staged
                .iter_mut()
                .find(|r| &r.relative_path == relative_path)
            {
                resource.staged_size = *after;
                resource.transcoded = true;
            }
        }
    }
}

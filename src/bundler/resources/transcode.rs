//! In-place media optimization of the staged resource tree.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    settings::{AudioCodec, MediaAction, TranscodePolicy},
    utils::{
        fs,
        process::{ToolInvocation, ToolRunner},
    },
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempPath;
use tokio::{sync::Semaphore, task::JoinSet};
use walkdir::WalkDir;

/// Why a media file kept its staged bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// Audio below the re-encode threshold.
    BelowThreshold,
    /// The transcoding program is not installed.
    ToolMissing,
    /// The program failed or produced no output.
    ToolFailed,
    /// The result would not have saved space.
    NotSmaller,
}

/// What happened to one staged file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum FileOutcome {
    /// Bytes were replaced with the transcoded result.
    Replaced {
        relative_path: PathBuf,
        #[serde(skip)]
        action: MediaAction,
        before: u64,
        after: u64,
    },
    /// A media file was left unchanged.
    Skipped {
        relative_path: PathBuf,
        reason: SkipReason,
    },
    /// Not a media file.
    Copied { relative_path: PathBuf },
}

/// Summary of a transcode pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranscodeReport {
    /// Images and audio replaced by a smaller encoding.
    pub optimized: usize,
    /// Videos replaced by a remuxed container.
    pub remuxed: usize,
    /// Media files left as staged.
    pub skipped: usize,
    /// Files with no media action.
    pub copied: usize,
    /// Total bytes saved across replacements.
    pub bytes_saved: u64,
    /// Per-file outcomes, ordered by path.
    #[serde(skip)]
    pub files: Vec<FileOutcome>,
}

impl TranscodeReport {
    fn record(&mut self, outcome: FileOutcome) {
        match &outcome {
            FileOutcome::Replaced {
                action,
                before,
                after,
                ..
            } => {
                if *action == MediaAction::VideoRemux {
                    self.remuxed += 1;
                } else {
                    self.optimized += 1;
                }
                self.bytes_saved += before.saturating_sub(*after);
            }
            FileOutcome::Skipped { .. } => self.skipped += 1,
            FileOutcome::Copied { .. } => self.copied += 1,
        }
        self.files.push(outcome);
    }
}

/// Optimizes media files under `staging_dir` in place.
///
/// Each file's action comes from [`TranscodePolicy::action_for`]. The tool
/// writes to a uniquely named scratch file in the same directory; the staged
/// file is replaced only if the result is non-empty and strictly smaller.
/// Otherwise the staged bytes stay exactly as they are and the scratch file
/// is removed, so a transcode pass never drops, grows or rewrites a file.
///
/// With `policy.enabled == false` only video remux still runs.
///
/// Files are processed concurrently, bounded by the number of CPUs.
///
/// # Errors
/// Only if the staging tree cannot be listed. Per-file failures become
/// [`FileOutcome::Skipped`].
pub async fn transcode<R: ToolRunner>(
    runner: Arc<R>,
    staging_dir: &Path,
    policy: &TranscodePolicy,
) -> Result<TranscodeReport> {
    let root = staging_dir.to_path_buf();
    let files = tokio::task::spawn_blocking(move || list_files(&root))
        .await
        .map_err(|e| Error::GenericError(format!("Listing task panicked: {}", e)))??;

    let mut available: BTreeMap<&'static str, bool> = BTreeMap::new();
    let mut jobs = Vec::with_capacity(files.len());
    for relative_path in files {
        let mut action = policy.action_for(&relative_path);
        if !policy.enabled && action != MediaAction::VideoRemux {
            action = MediaAction::CopyOnly;
        }
        if let Some(tool) = action.tool() {
            let present = *available
                .entry(tool)
                .or_insert_with(|| runner.is_available(tool));
            if !present {
                log::warn!(
                    "{} not installed; leaving {} unoptimized",
                    tool,
                    relative_path.display()
                );
                jobs.push(Job::Done(FileOutcome::Skipped {
                    relative_path,
                    reason: SkipReason::ToolMissing,
                }));
                continue;
            }
        }
        jobs.push(Job::Pending(relative_path, action));
    }

    let policy = Arc::new(policy.clone());
    let semaphore = Arc::new(Semaphore::new(num_cpus::get().max(1)));
    let mut report = TranscodeReport::default();
    let mut join_set = JoinSet::new();

    for job in jobs {
        let (relative_path, action) = match job {
            Job::Done(outcome) => {
                report.record(outcome);
                continue;
            }
            Job::Pending(relative_path, MediaAction::CopyOnly) => {
                report.record(FileOutcome::Copied { relative_path });
                continue;
            }
            Job::Pending(relative_path, action) => (relative_path, action),
        };

        let runner = Arc::clone(&runner);
        let policy = Arc::clone(&policy);
        let semaphore = Arc::clone(&semaphore);
        let path = staging_dir.join(&relative_path);
        join_set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            process_file(runner.as_ref(), &policy, path, relative_path, action).await
        });
    }

    while let Some(joined) = join_set.join_next().await {
        let outcome =
            joined.map_err(|e| Error::GenericError(format!("Transcode task panicked: {}", e)))?;
        report.record(outcome);
    }

    report.files.sort_by(|a, b| a.relative_path().cmp(b.relative_path()));

    log::info!(
        "Transcode: {} optimized, {} remuxed, {} skipped, {} copied, {} bytes saved",
        report.optimized,
        report.remuxed,
        report.skipped,
        report.copied,
        report.bytes_saved
    );

    Ok(report)
}

enum Job {
    Done(FileOutcome),
    Pending(PathBuf, MediaAction),
}

impl FileOutcome {
    /// Path relative to the staging root.
    pub fn relative_path(&self) -> &Path {
        match self {
            Self::Replaced { relative_path, .. }
            | Self::Skipped { relative_path, .. }
            | Self::Copied { relative_path } => relative_path,
        }
    }
}

fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.path().strip_prefix(root)?.to_path_buf());
        }
    }
    Ok(files)
}

/// Unique scratch file next to `path`, keeping its extension so the tool
/// picks the same output format. Removed when dropped.
fn scratch_file(path: &Path) -> Result<TempPath> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let suffix = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let file = tempfile::Builder::new()
        .prefix(".transcode-")
        .suffix(&suffix)
        .tempfile_in(dir)
        .fs_context("creating scratch file", dir)?;
    Ok(file.into_temp_path())
}

fn invocation(
    action: MediaAction,
    policy: &TranscodePolicy,
    input: &Path,
    output: &Path,
) -> Option<ToolInvocation> {
    let inv = match action {
        MediaAction::ImageRequantize => ToolInvocation::new("magick")
            .arg(input)
            .args(["-strip", "-quality"])
            .arg(policy.jpeg_quality.to_string())
            .arg(output),
        MediaAction::AudioReencode(codec) => {
            let inv = ToolInvocation::new("ffmpeg")
                .args(["-y", "-i"])
                .arg(input)
                .args(["-map_metadata", "-1", "-vn", "-c:a"]);
            let inv = match codec {
                AudioCodec::Mp3 => inv.args(["libmp3lame", "-b:a", policy.mp3_bitrate.as_str()]),
                AudioCodec::Aac => inv.args(["aac", "-b:a", policy.aac_bitrate.as_str()]),
                AudioCodec::Vorbis => inv
                    .args(["libvorbis", "-q:a"])
                    .arg(policy.ogg_quality.to_string()),
            };
            inv.arg(output)
        }
        MediaAction::VideoRemux => ToolInvocation::new("ffmpeg")
            .args(["-y", "-i"])
            .arg(input)
            .args(["-map", "0", "-c", "copy", "-movflags", "+faststart"])
            .arg(output),
        MediaAction::CopyOnly => return None,
    };
    Some(inv)
}

async fn process_file<R: ToolRunner + ?Sized>(
    runner: &R,
    policy: &TranscodePolicy,
    path: PathBuf,
    relative_path: PathBuf,
    action: MediaAction,
) -> FileOutcome {
    let skipped = |relative_path: PathBuf, reason| FileOutcome::Skipped {
        relative_path,
        reason,
    };

    let before = fs::file_len(&path).await;

    if matches!(action, MediaAction::AudioReencode(_)) && before < policy.audio_min_bytes {
        log::debug!(
            "{} is below the audio threshold ({} < {} bytes)",
            relative_path.display(),
            before,
            policy.audio_min_bytes
        );
        return skipped(relative_path, SkipReason::BelowThreshold);
    }

    let tmp = match scratch_file(&path) {
        Ok(tmp) => tmp,
        Err(e) => {
            log::warn!("Cannot transcode {}: {}", relative_path.display(), e);
            return skipped(relative_path, SkipReason::ToolFailed);
        }
    };
    let Some(inv) = invocation(action, policy, &path, &tmp) else {
        return FileOutcome::Copied { relative_path };
    };

    let ran = match runner.run(&inv).await {
        Ok(output) if output.success() => true,
        Ok(output) => {
            log::warn!(
                "{} failed on {} (exit {:?}): {}",
                inv.program(),
                relative_path.display(),
                output.code,
                output.stderr_tail()
            );
            false
        }
        Err(e) => {
            log::warn!("{} could not run on {}: {}", inv.program(), relative_path.display(), e);
            false
        }
    };

    let after = if ran {
        Some(fs::file_len(&tmp).await).filter(|len| *len > 0)
    } else {
        None
    };

    let Some(after) = after else {
        discard(tmp);
        return skipped(relative_path, SkipReason::ToolFailed);
    };

    if after >= before {
        log::debug!(
            "Keeping {}: transcoded size {} is not below {}",
            relative_path.display(),
            after,
            before
        );
        discard(tmp);
        return skipped(relative_path, SkipReason::NotSmaller);
    }

    if let Err(e) = tmp.persist(&path) {
        log::warn!("Cannot replace {}: {}", path.display(), e.error);
        discard(e.path);
        return skipped(relative_path, SkipReason::ToolFailed);
    }

    log::debug!(
        "Optimized {}: {} -> {} bytes",
        relative_path.display(),
        before,
        after
    );
    FileOutcome::Replaced {
        relative_path,
        action,
        before,
        after,
    }
}

fn discard(tmp: TempPath) {
    let display = tmp.display().to_string();
    if let Err(e) = tmp.close() {
        log::warn!("Cannot remove {}: {}", display, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_files_are_unique_and_keep_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let staged = tmp.path().join("bg.png");
        std::fs::write(&staged, b"png").unwrap();
        std::fs::write(tmp.path().join("bg.transcode.png"), b"resource").unwrap();

        let first = scratch_file(&staged).unwrap();
        let second = scratch_file(&staged).unwrap();

        assert_ne!(first.to_path_buf(), second.to_path_buf());
        assert_eq!(first.extension().unwrap(), "png");
        assert_eq!(first.parent(), Some(tmp.path()));
        assert_eq!(
            std::fs::read(tmp.path().join("bg.transcode.png")).unwrap(),
            b"resource"
        );

        let path = first.to_path_buf();
        discard(first);
        assert!(!path.exists());
    }

    #[test]
    fn audio_invocations_strip_metadata() {
        let policy = TranscodePolicy::default();
        let inv = invocation(
            MediaAction::AudioReencode(AudioCodec::Vorbis),
            &policy,
            Path::new("in.ogg"),
            Path::new("out.ogg"),
        )
        .unwrap();
        assert_eq!(
            inv.display(),
            "ffmpeg -y -i in.ogg -map_metadata -1 -vn -c:a libvorbis -q:a 4 out.ogg"
        );
    }

    #[test]
    fn image_invocation_uses_quality() {
        let policy = TranscodePolicy {
            jpeg_quality: 70,
            ..Default::default()
        };
        let inv = invocation(
            MediaAction::ImageRequantize,
            &policy,
            Path::new("a.jpg"),
            Path::new("a.transcode.jpg"),
        )
        .unwrap();
        assert_eq!(inv.display(), "magick a.jpg -strip -quality 70 a.transcode.jpg");
        assert!(invocation(MediaAction::CopyOnly, &policy, Path::new("a"), Path::new("b")).is_none());
    }

    #[test]
    fn report_counts_by_outcome() {
        let mut report = TranscodeReport::default();
        report.record(FileOutcome::Replaced {
            relative_path: "a.png".into(),
            action: MediaAction::ImageRequantize,
            before: 100,
            after: 40,
        });
        report.record(FileOutcome::Replaced {
            relative_path: "v.mp4".into(),
            action: MediaAction::VideoRemux,
            before: 100,
            after: 90,
        });
        report.record(FileOutcome::Skipped {
            relative_path: "s.mp3".into(),
            reason: SkipReason::BelowThreshold,
        });
        report.record(FileOutcome::Copied {
            relative_path: "x.txt".into(),
        });

        assert_eq!(
            (report.optimized, report.remuxed, report.skipped, report.copied, report.bytes_saved),
            (1, 1, 1, 1, 70)
        );
    }
}

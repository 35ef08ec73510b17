//! Resource staging.

use super::StagedResource;
use crate::bundler::{
    error::{Error, ErrorExt, Result},
    settings::TranscodePolicy,
    utils::fs,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Copies `source_dir` into a freshly recreated `target_dir`.
///
/// # Process
/// 1. Verify `source_dir` is a directory
/// 2. Erase and recreate `target_dir` (prior content is never merged)
/// 3. Walk the source in sorted order, following symlinks to their content
/// 4. Plan staged names, applying `policy.extension_remap`
/// 5. Copy each file, creating parent directories
///
/// A remapped name that collides with a file already carrying the target
/// extension (`clip.mov` next to `clip.mp4`) keeps its source name, so no
/// file is ever dropped.
///
/// # Errors
/// [`Error::SourceMissing`] if `source_dir` is absent, I/O errors if it
/// cannot be read or the copy fails.
pub async fn stage(
    source_dir: &Path,
    target_dir: &Path,
    policy: &TranscodePolicy,
) -> Result<Vec<StagedResource>> {
    if !source_dir.is_dir() {
        return Err(Error::SourceMissing(source_dir.to_path_buf()));
    }

    fs::create_dir_all(target_dir, true).await?;

    let source = source_dir.to_path_buf();
    let target = target_dir.to_path_buf();
    let policy = policy.clone();

    let staged = tokio::task::spawn_blocking(move || stage_blocking(&source, &target, &policy))
        .await
        .map_err(|e| Error::GenericError(format!("Staging task panicked: {}", e)))??;

    let remapped = staged.iter().filter(|r| r.is_remapped()).count();
    log::info!(
        "Staged {} file(s) into {} ({} renamed by extension remap)",
        staged.len(),
        target_dir.display(),
        remapped
    );

    Ok(staged)
}

fn stage_blocking(
    source: &Path,
    target: &Path,
    policy: &TranscodePolicy,
) -> Result<Vec<StagedResource>> {
    let mut sources = Vec::new();
    for entry in WalkDir::new(source).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            sources.push(entry.path().strip_prefix(source)?.to_path_buf());
        }
    }

    let plan = plan_destinations(&sources, policy);

    let mut staged = Vec::with_capacity(plan.len());
    for (source_rel, staged_rel) in plan {
        let from = source.join(&source_rel);
        let to = target.join(&staged_rel);
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent).fs_context("creating staging directory", parent)?;
        }
        let size = std::fs::copy(&from, &to).fs_context("staging resource", &from)?;
        log::debug!("Staged {} -> {}", source_rel.display(), staged_rel.display());
        staged.push(StagedResource {
            relative_path: staged_rel,
            source_path: source_rel,
            original_size: size,
            staged_size: size,
            transcoded: false,
        });
    }

    Ok(staged)
}

/// Pairs every source path with its staged path.
///
/// Files whose name is unchanged claim their path first; remapped files then
/// take the new name only if it is still free. Names are compared ignoring
/// ASCII case, since NTFS and APFS treat `clip.mp4` and `clip.MP4` as one file.
fn plan_destinations(sources: &[PathBuf], policy: &TranscodePolicy) -> Vec<(PathBuf, PathBuf)> {
    let remapped: Vec<Option<PathBuf>> = sources
        .iter()
        .map(|rel| {
            let ext = rel.extension()?.to_str()?;
            let new_ext = policy.remapped_extension(ext)?;
            Some(rel.with_extension(new_ext))
        })
        .collect();

    let mut claimed: BTreeSet<PathBuf> = sources
        .iter()
        .zip(&remapped)
        .filter(|(_, new)| new.is_none())
        .map(|(rel, _)| fold_case(rel))
        .collect();

    sources
        .iter()
        .zip(remapped)
        .map(|(rel, new)| match new {
            None => (rel.clone(), rel.clone()),
            Some(new) if claimed.insert(fold_case(&new)) => (rel.clone(), new),
            Some(new) => {
                log::warn!(
                    "Not renaming {} to {}: a file with that name already exists; staging as-is",
                    rel.display(),
                    new.display()
                );
                claimed.insert(fold_case(rel));
                (rel.clone(), rel.clone())
            }
        })
        .collect()
}

fn fold_case(path: &Path) -> PathBuf {
    PathBuf::from(path.to_string_lossy().to_ascii_lowercase())
}

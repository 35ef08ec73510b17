//! Proactive removal of developer-only state from a bundle.

use super::ForbiddenArtifactSet;
use crate::bundler::error::{ErrorExt, Result};
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Deletes every forbidden file under `bundle_dir`.
///
/// Runs unconditionally before the audit, whether or not the packager copied
/// developer state into the bundle. Symlinks are not followed; a symlink with
/// a forbidden name is removed like a file. Returns the number of entries
/// removed; a missing `bundle_dir` removes nothing.
pub fn sanitize(bundle_dir: &Path, forbidden: &ForbiddenArtifactSet) -> Result<usize> {
    if !bundle_dir.exists() {
        return Ok(0);
    }

    let doomed: Vec<_> = WalkDir::new(bundle_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry during sanitize: {}", e);
                None
            }
        })
        .filter(|entry| !entry.file_type().is_dir() && forbidden.contains(entry.file_name()))
        .map(walkdir::DirEntry::into_path)
        .collect();

    let mut removed = 0;
    for path in doomed {
        match std::fs::remove_file(&path) {
            Ok(()) => {
                log::info!("Removed developer state: {}", path.display());
                removed += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).fs_context("removing developer state", &path),
        }
    }

    Ok(removed)
}

//! Leak audit over a finished bundle.

use super::{AuditResult, Canary, ForbiddenArtifactSet, Violation, ViolationReason};
use crate::bundler::error::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Audits `bundle_dir` for forbidden file names and, if configured, the canary.
///
/// Both passes always run; the filename pass reports every match, the content
/// pass stops at the first file containing the canary. Files larger than
/// [`Canary::scan_limit`] are not read and are logged as unscanned.
///
/// # Errors
///
/// Only if `bundle_dir` itself cannot be traversed. Unreadable individual
/// files are logged and skipped.
pub fn audit(
    bundle_dir: &Path,
    forbidden: &ForbiddenArtifactSet,
    canary: Option<&Canary>,
) -> Result<AuditResult> {
    let files = collect_files(bundle_dir)?;

    let mut result = AuditResult::default();

    for path in &files {
        if path
            .file_name()
            .is_some_and(|name| forbidden.contains(name))
        {
            log::error!("Forbidden file in bundle: {}", path.display());
            result.violations.push(Violation {
                path: path.clone(),
                reason: ViolationReason::ForbiddenFilename,
            });
        }
    }

    if let Some(canary) = canary {
        if let Some(path) = find_canary(&files, canary) {
            log::error!("Canary token found in: {}", path.display());
            result.violations.push(Violation {
                path,
                reason: ViolationReason::CanaryMatch,
            });
        }
    }

    Ok(result)
}

/// Regular files under `root` in deterministic order.
fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn find_canary(files: &[PathBuf], canary: &Canary) -> Option<PathBuf> {
    let mut unscanned = 0usize;
    for path in files {
        let len = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                log::warn!("Cannot stat {} for canary scan: {}", path.display(), e);
                continue;
            }
        };
        if len > canary.scan_limit() {
            log::warn!(
                "Not scanned for canary ({} bytes > {} byte limit): {}",
                len,
                canary.scan_limit(),
                path.display()
            );
            unscanned += 1;
            continue;
        }
        match std::fs::read(path) {
            Ok(bytes) if canary.found_in(&bytes) => return Some(path.clone()),
            Ok(_) => {}
            Err(e) => log::warn!("Cannot read {} for canary scan: {}", path.display(), e),
        }
    }
    if unscanned > 0 {
        log::info!("{} file(s) exceeded the canary scan limit", unscanned);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn both_passes_are_reported() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("settings.json"), b"{}").unwrap();
        fs::write(tmp.path().join("lib.so"), b"\x7fELF....SECRET123....").unwrap();
        let canary = Canary::new("SECRET123", 1024).unwrap();

        let result = audit(tmp.path(), &ForbiddenArtifactSet::canonical(), Some(&canary)).unwrap();

        let reasons: Vec<_> = result.violations.iter().map(|v| v.reason).collect();
        assert_eq!(
            reasons,
            vec![ViolationReason::ForbiddenFilename, ViolationReason::CanaryMatch]
        );
    }

    #[test]
    fn content_pass_stops_at_first_match() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.txt"), b"SECRET123").unwrap();
        fs::write(tmp.path().join("b.txt"), b"SECRET123").unwrap();
        let canary = Canary::new("SECRET123", 1024).unwrap();

        let result = audit(tmp.path(), &ForbiddenArtifactSet::canonical(), Some(&canary)).unwrap();

        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, tmp.path().join("a.txt"));
    }

    #[test]
    fn files_over_limit_are_not_scanned() {
        let tmp = tempfile::tempdir().unwrap();
        let mut big = vec![0u8; 64];
        big.extend_from_slice(b"SECRET123");
        fs::write(tmp.path().join("big.bin"), &big).unwrap();
        let canary = Canary::new("SECRET123", 32).unwrap();

        let result = audit(tmp.path(), &ForbiddenArtifactSet::canonical(), Some(&canary)).unwrap();

        assert!(result.is_clean());
    }
}

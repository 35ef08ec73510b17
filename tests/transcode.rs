mod common;

use common::{FakeRunner, MediaBehavior, blob, snapshot};
use kodegen_bundler_desktop::bundler::resources::SkipReason;
use kodegen_bundler_desktop::bundler::{FileOutcome, Platform, TranscodePolicy, resources};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn staging_tree(files: &[(&str, Vec<u8>)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (relative, bytes) in files {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }
    dir
}

fn mixed_media() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("images/bg.png", blob(4096)),
        ("images/photo.jpg", blob(8192)),
        ("sounds/theme.mp3", blob(600 * 1024)),
        ("sounds/ring.m4a", blob(700 * 1024)),
        ("sounds/start.ogg", blob(900 * 1024)),
        ("video/start1.mp4", blob(10_000)),
        ("data/strings.json", b"{}".to_vec()),
    ]
}

fn outcome_for<'a>(files: &'a [FileOutcome], path: &str) -> &'a FileOutcome {
    files
        .iter()
        .find(|o| o.relative_path() == Path::new(path))
        .unwrap_or_else(|| panic!("no outcome for {path}"))
}

fn no_temp_files(root: &Path) -> bool {
    snapshot(root)
        .keys()
        .all(|p| !p.to_string_lossy().contains(".transcode"))
}

#[tokio::test]
async fn shrinking_tools_replace_every_media_file() {
    let dir = staging_tree(&mixed_media());
    let before = snapshot(dir.path());
    let policy = TranscodePolicy::for_platform(Platform::Windows, false);

    let report = resources::transcode(Arc::new(FakeRunner::new()), dir.path(), &policy)
        .await
        .unwrap();

    assert_eq!(report.optimized, 5);
    assert_eq!(report.remuxed, 1);
    assert_eq!(report.copied, 1);
    assert_eq!(report.skipped, 0);

    let after = snapshot(dir.path());
    assert_eq!(before.keys().collect::<Vec<_>>(), after.keys().collect::<Vec<_>>());
    for (path, bytes) in &after {
        assert!(bytes.len() <= before[path].len(), "{} grew", path.display());
    }
    assert_eq!(after[&PathBuf::from("data/strings.json")], b"{}");

    let saved: u64 = before.values().map(|b| b.len() as u64).sum::<u64>()
        - after.values().map(|b| b.len() as u64).sum::<u64>();
    assert_eq!(report.bytes_saved, saved);
    assert!(no_temp_files(dir.path()));
}

#[tokio::test]
async fn larger_output_never_replaces_the_original() {
    let dir = staging_tree(&mixed_media());
    let before = snapshot(dir.path());
    let policy = TranscodePolicy::for_platform(Platform::Windows, false);

    let report = resources::transcode(
        Arc::new(FakeRunner::new().media(MediaBehavior::Grow)),
        dir.path(),
        &policy,
    )
    .await
    .unwrap();

    assert_eq!(before, snapshot(dir.path()));
    assert_eq!(report.optimized + report.remuxed, 0);
    assert_eq!(report.bytes_saved, 0);
    assert!(matches!(
        outcome_for(&report.files, "images/bg.png"),
        FileOutcome::Skipped {
            reason: SkipReason::NotSmaller,
            ..
        }
    ));
    assert!(no_temp_files(dir.path()));
}

#[tokio::test]
async fn failing_tools_leave_files_untouched() {
    let dir = staging_tree(&mixed_media());
    let before = snapshot(dir.path());
    let policy = TranscodePolicy::for_platform(Platform::Windows, false);

    let report = resources::transcode(
        Arc::new(FakeRunner::new().media(MediaBehavior::Fail)),
        dir.path(),
        &policy,
    )
    .await
    .unwrap();

    assert_eq!(before, snapshot(dir.path()));
    assert_eq!(report.skipped, 6);
    assert!(matches!(
        outcome_for(&report.files, "sounds/start.ogg"),
        FileOutcome::Skipped {
            reason: SkipReason::ToolFailed,
            ..
        }
    ));
    assert!(no_temp_files(dir.path()));
}

#[tokio::test]
async fn small_audio_is_left_byte_identical() {
    let audio = blob(400 * 1024);
    let dir = staging_tree(&[("sounds/short.mp3", audio.clone())]);
    let runner = Arc::new(FakeRunner::new());
    let policy = TranscodePolicy::default();

    let report = resources::transcode(Arc::clone(&runner), dir.path(), &policy)
        .await
        .unwrap();

    assert_eq!(fs::read(dir.path().join("sounds/short.mp3")).unwrap(), audio);
    assert_eq!(runner.calls_to("ffmpeg"), 0);
    assert!(matches!(
        outcome_for(&report.files, "sounds/short.mp3"),
        FileOutcome::Skipped {
            reason: SkipReason::BelowThreshold,
            ..
        }
    ));
}

#[tokio::test]
async fn missing_tool_skips_its_files() {
    let dir = staging_tree(&[
        ("images/bg.png", blob(4096)),
        ("sounds/theme.mp3", blob(600 * 1024)),
    ]);
    let png_before = fs::read(dir.path().join("images/bg.png")).unwrap();
    let runner = Arc::new(FakeRunner::new().without("magick"));

    let report = resources::transcode(Arc::clone(&runner), dir.path(), &TranscodePolicy::default())
        .await
        .unwrap();

    assert_eq!(fs::read(dir.path().join("images/bg.png")).unwrap(), png_before);
    assert!(matches!(
        outcome_for(&report.files, "images/bg.png"),
        FileOutcome::Skipped {
            reason: SkipReason::ToolMissing,
            ..
        }
    ));
    assert_eq!(report.optimized, 1);
    assert_eq!(runner.calls_to("magick"), 0);
}

#[tokio::test]
async fn disabled_compression_still_remuxes_video() {
    let dir = staging_tree(&[
        ("images/bg.png", blob(4096)),
        ("video/start1.mp4", blob(10_000)),
    ]);
    let runner = Arc::new(FakeRunner::new());
    let policy = TranscodePolicy {
        enabled: false,
        ..TranscodePolicy::for_platform(Platform::Windows, false)
    };

    let report = resources::transcode(Arc::clone(&runner), dir.path(), &policy)
        .await
        .unwrap();

    assert_eq!(report.optimized, 0);
    assert_eq!(report.remuxed, 1);
    assert_eq!(report.copied, 1);
    assert_eq!(runner.calls_to("magick"), 0);
    assert_eq!(fs::read(dir.path().join("images/bg.png")).unwrap(), blob(4096));
}

#[tokio::test]
async fn outcomes_are_sorted_by_path() {
    let dir = staging_tree(&mixed_media());
    let report = resources::transcode(
        Arc::new(FakeRunner::new()),
        dir.path(),
        &TranscodePolicy::default(),
    )
    .await
    .unwrap();

    let paths: Vec<&Path> = report.files.iter().map(FileOutcome::relative_path).collect();
    let mut sorted = paths.clone();
    sorted.sort();
    assert_eq!(paths, sorted);
    assert_eq!(paths.len(), mixed_media().len());
}

#[tokio::test]
async fn same_size_remux_keeps_staged_bytes() {
    let video = blob(10_000);
    let dir = staging_tree(&[("video/start1.mp4", video.clone())]);
    let policy = TranscodePolicy::for_platform(Platform::Windows, false);

    let report = resources::transcode(
        Arc::new(FakeRunner::new().media(MediaBehavior::Reverse)),
        dir.path(),
        &policy,
    )
    .await
    .unwrap();

    assert_eq!(fs::read(dir.path().join("video/start1.mp4")).unwrap(), video);
    assert_eq!(report.remuxed, 0);
    assert!(matches!(
        outcome_for(&report.files, "video/start1.mp4"),
        FileOutcome::Skipped {
            reason: SkipReason::NotSmaller,
            ..
        }
    ));
    assert!(no_temp_files(dir.path()));
}

#[tokio::test]
async fn resource_named_like_a_scratch_file_survives() {
    for behavior in [MediaBehavior::Fail, MediaBehavior::Shrink, MediaBehavior::Grow] {
        let dir = staging_tree(&[
            ("images/bg.png", blob(4096)),
            ("images/bg.transcode.png", blob(2048)),
        ]);

        resources::transcode(
            Arc::new(FakeRunner::new().media(behavior)),
            dir.path(),
            &TranscodePolicy::default(),
        )
        .await
        .unwrap();

        let after = snapshot(dir.path());
        assert_eq!(
            after.keys().cloned().collect::<Vec<_>>(),
            vec![
                PathBuf::from("images/bg.png"),
                PathBuf::from("images/bg.transcode.png"),
            ],
            "{behavior:?} lost or added a file"
        );
        if behavior != MediaBehavior::Shrink {
            assert_eq!(after[&PathBuf::from("images/bg.png")], blob(4096));
            assert_eq!(after[&PathBuf::from("images/bg.transcode.png")], blob(2048));
        }
    }
}

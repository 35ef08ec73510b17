//! Location of the application's per-user developer state.
//!
//! The pipeline never creates, reads or modifies these directories. It only
//! refuses to stage a resource tree that overlaps one, since staging would
//! copy credentials straight into the bundle.

use crate::bundler::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Runtime settings file (holds API credentials).
pub const SETTINGS_FILE: &str = "settings.json";

/// Append-only chat transcript.
pub const CHAT_HISTORY_FILE: &str = "chat_history.jsonl";

/// Current application-data directory name.
pub const APP_DATA_DIR_NAME: &str = "FleetSnowfluff";

/// Directory names used by earlier releases, still migrated by the app.
const LEGACY_DIR_NAMES: &[&str] = &["Aemeath", "Fleet Snowfluff", "fleet_snowfluff"];

/// Per-user directories where the app keeps developer state.
#[derive(Debug, Clone, Default)]
pub struct DeveloperState {
    dirs: Vec<PathBuf>,
}

impl DeveloperState {
    /// Locates the state directories for the current user on this host.
    ///
    /// macOS: `~/Library/Application Support/<name>`, Windows: `%APPDATA%\<name>`,
    /// elsewhere `~/.config/<name lowercased>`.
    pub fn discover() -> Self {
        let base = if cfg!(target_os = "macos") || cfg!(windows) {
            dirs::data_dir()
        } else {
            dirs::config_dir()
        };
        let Some(base) = base else {
            log::debug!("No per-user data directory on this host");
            return Self::default();
        };

        let lowercase = !(cfg!(target_os = "macos") || cfg!(windows));
        let dirs = std::iter::once(APP_DATA_DIR_NAME)
            .chain(LEGACY_DIR_NAMES.iter().copied())
            .map(|name| {
                if lowercase {
                    base.join(name.to_lowercase())
                } else {
                    base.join(name)
                }
            })
            .collect();
        Self::with_dirs(dirs)
    }

    /// Uses an explicit set of directories.
    pub fn with_dirs(mut dirs: Vec<PathBuf>) -> Self {
        dirs.sort();
        dirs.dedup();
        Self { dirs }
    }

    /// Candidate directories, sorted.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Developer-state files that currently exist.
    pub fn present_files(&self) -> Vec<PathBuf> {
        self.dirs
            .iter()
            .flat_map(|dir| [dir.join(SETTINGS_FILE), dir.join(CHAT_HISTORY_FILE)])
            .filter(|path| path.is_file())
            .collect()
    }

    /// Fails if `resources_dir` lies inside a state directory or contains one.
    pub fn ensure_disjoint(&self, resources_dir: &Path) -> Result<()> {
        for dir in &self.dirs {
            if resources_dir.starts_with(dir) || dir.starts_with(resources_dir) {
                return Err(Error::GenericError(format!(
                    "resource directory {} overlaps developer state directory {}; \
                     staging it would ship runtime credentials",
                    resources_dir.display(),
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

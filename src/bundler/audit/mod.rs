//! Developer-state sanitization and release leak auditing.
//!
//! The desktop app persists its settings (including API credentials) and an
//! append-only chat log in a per-user application-data directory. Neither may
//! ever reach a release. The forbidden file names are checked twice: the
//! [`sanitize`] pass deletes them, the [`audit`] pass verifies they are gone
//! and optionally searches for an operator-injected canary token.

mod developer_state;
mod sanitize;
mod scan;

pub use developer_state::{APP_DATA_DIR_NAME, CHAT_HISTORY_FILE, DeveloperState, SETTINGS_FILE};
pub use sanitize::sanitize;
pub use scan::audit;

use serde::Serialize;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fmt;
use std::path::PathBuf;

/// File names that must never appear inside a release bundle.
///
/// Matching is exact and case-sensitive on the file name component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForbiddenArtifactSet {
    names: BTreeSet<String>,
}

impl ForbiddenArtifactSet {
    /// The developer-state files written by the application at runtime.
    pub fn canonical() -> Self {
        Self::from_names([SETTINGS_FILE, CHAT_HISTORY_FILE])
    }

    /// Builds a set from arbitrary names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `file_name` is forbidden.
    pub fn contains(&self, file_name: &OsStr) -> bool {
        file_name
            .to_str()
            .is_some_and(|name| self.names.contains(name))
    }

    /// Names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Operator-supplied marker searched for in bundle file contents.
#[derive(Clone, PartialEq, Eq)]
pub struct Canary {
    token: Vec<u8>,
    scan_limit: u64,
}

impl Canary {
    /// Creates a canary; `None` if `token` is empty.
    ///
    /// Files larger than `scan_limit` bytes are not searched.
    pub fn new(token: &str, scan_limit: u64) -> Option<Self> {
        if token.is_empty() {
            return None;
        }
        Some(Self {
            token: token.as_bytes().to_vec(),
            scan_limit,
        })
    }

    /// Raw token bytes.
    pub fn token(&self) -> &[u8] {
        &self.token
    }

    /// Largest file size searched, in bytes.
    pub fn scan_limit(&self) -> u64 {
        self.scan_limit
    }

    /// Whether `haystack` contains the token.
    pub fn found_in(&self, haystack: &[u8]) -> bool {
        haystack
            .windows(self.token.len())
            .any(|window| window == self.token.as_slice())
    }
}

// Never print the token itself.
impl fmt::Debug for Canary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canary")
            .field("token", &format_args!("<{} bytes>", self.token.len()))
            .field("scan_limit", &self.scan_limit)
            .finish()
    }
}

/// Why a bundle file failed the audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationReason {
    /// A developer-state file name is present.
    ForbiddenFilename,
    /// The canary token occurs in the file's bytes.
    CanaryMatch,
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ForbiddenFilename => "forbidden-filename",
            Self::CanaryMatch => "canary-match",
        })
    }
}

/// One audit finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Offending file.
    pub path: PathBuf,
    /// Why it was flagged.
    pub reason: ViolationReason,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.reason, self.path.display())
    }
}

/// Outcome of the leak audit.
///
/// Empty means the release may proceed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditResult {
    /// Findings in discovery order: filename pass first, then content pass.
    pub violations: Vec<Violation>,
}

impl AuditResult {
    /// Whether no violation was found.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_match_is_exact_and_case_sensitive() {
        let set = ForbiddenArtifactSet::canonical();
        assert!(set.contains(OsStr::new("settings.json")));
        assert!(set.contains(OsStr::new("chat_history.jsonl")));
        assert!(!set.contains(OsStr::new("Settings.json")));
        assert!(!set.contains(OsStr::new("settings.json.bak")));
    }

    #[test]
    fn canary_search_is_raw_bytes() {
        let canary = Canary::new("SECRET123", 1024).unwrap();
        assert!(canary.found_in(b"\x00\xffprefixSECRET123\x00"));
        assert!(!canary.found_in(b"SECRET12"));
        assert!(!canary.found_in(b""));
    }

    #[test]
    fn canary_debug_hides_token() {
        let canary = Canary::new("SECRET123", 1024).unwrap();
        let debug = format!("{canary:?}");
        assert!(!debug.contains("SECRET123"));
        assert!(debug.contains("<9 bytes>"));
    }

    #[test]
    fn violation_display_names_reason() {
        let v = Violation {
            path: PathBuf::from("App.app/Contents/settings.json"),
            reason: ViolationReason::ForbiddenFilename,
        };
        assert_eq!(v.to_string(), "[forbidden-filename] App.app/Contents/settings.json");
    }
}

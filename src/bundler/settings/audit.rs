//! Leak-audit configuration.

use crate::bundler::audit::{Canary, ForbiddenArtifactSet};

/// Default upper bound for files searched by the canary content pass (8 MiB).
pub const DEFAULT_SCAN_LIMIT: u64 = 8 * 1024 * 1024;

/// Leak-audit settings.
///
/// The forbidden set is always the canonical developer-state set; the canary
/// is optional and carries its own scan limit.
#[derive(Debug, Clone)]
pub struct AuditSettings {
    /// File names that must never appear in a bundle.
    pub forbidden: ForbiddenArtifactSet,

    /// Operator-supplied canary token.
    ///
    /// Default: None (content pass disabled)
    pub canary: Option<Canary>,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            forbidden: ForbiddenArtifactSet::canonical(),
            canary: None,
        }
    }
}

impl AuditSettings {
    /// Settings with the canonical forbidden set and an optional canary.
    ///
    /// An empty or absent token disables the content pass.
    pub fn with_canary(token: Option<&str>, scan_limit: u64) -> Self {
        Self {
            forbidden: ForbiddenArtifactSet::canonical(),
            canary: token.and_then(|t| Canary::new(t, scan_limit)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_canary_disables_content_pass() {
        assert!(AuditSettings::with_canary(Some(""), DEFAULT_SCAN_LIMIT).canary.is_none());
        assert!(AuditSettings::with_canary(None, DEFAULT_SCAN_LIMIT).canary.is_none());
    }

    #[test]
    fn canary_keeps_configured_limit() {
        let settings = AuditSettings::with_canary(Some("SECRET123"), 1024);
        let canary = settings.canary.expect("canary configured");
        assert_eq!(canary.scan_limit(), 1024);
        assert_eq!(canary.token(), b"SECRET123");
    }
}

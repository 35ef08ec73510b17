//! Pipeline stage notifications.

use crate::bundler::settings::ReleaseContext;
use std::fmt;

/// Stages of a release run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Tool and developer-state checks.
    Preflight,
    /// Resource tree copied into the staging directory.
    StageResources,
    /// Media optimization of the staged tree.
    Transcode,
    /// Icon conversion for the packager.
    PrepareIcon,
    /// Application bundle produced by the packager.
    AssembleBundle,
    /// Developer state removed from the bundle.
    Sanitize,
    /// Leak audit over the bundle.
    Audit,
    /// Installer or disk image assembly.
    Package,
    /// Artifact moved into the output directory.
    Publish,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 9] = [
        Stage::Preflight,
        Stage::StageResources,
        Stage::Transcode,
        Stage::PrepareIcon,
        Stage::AssembleBundle,
        Stage::Sanitize,
        Stage::Audit,
        Stage::Package,
        Stage::Publish,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Preflight => "Preflight checks",
            Self::StageResources => "Staging resources",
            Self::Transcode => "Optimizing media",
            Self::PrepareIcon => "Preparing icon",
            Self::AssembleBundle => "Assembling application bundle",
            Self::Sanitize => "Sanitizing bundle",
            Self::Audit => "Auditing bundle",
            Self::Package => "Assembling package",
            Self::Publish => "Publishing artifact",
        }
    }

    /// 1-based position in [`Stage::ALL`].
    pub fn number(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).map_or(0, |i| i + 1)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Receives stage boundaries while a [`Pipeline`](super::Pipeline) runs.
///
/// Both methods default to doing nothing.
pub trait StageObserver: Send + Sync {
    /// Called before `stage` starts.
    fn stage_started(&self, _stage: Stage, _ctx: &ReleaseContext) {}

    /// Called after `stage` completed successfully.
    fn stage_finished(&self, _stage: Stage, _ctx: &ReleaseContext) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StageObserver for NoopObserver {}

//! Configuration structures for a release run.
//!
//! This module provides the immutable [`ReleaseContext`] every pipeline stage
//! reads, the media [`TranscodePolicy`], audit and packaging settings, and the
//! [`ReleaseContextBuilder`] used to construct them.

mod audit;
mod builder;
mod core;
mod media;
mod package;
mod platform;

// Re-export all public types
pub use audit::{AuditSettings, DEFAULT_SCAN_LIMIT};
pub use builder::{DEFAULT_EXCLUDED_MODULES, DEFAULT_PACKAGER, ReleaseContextBuilder};
pub use core::ReleaseContext;
pub use media::{
    AudioCodec, DEFAULT_AUDIO_MIN_BYTES, DEFAULT_JPEG_QUALITY, JPEG_QUALITY_RANGE, MediaAction,
    TranscodePolicy, clamp_jpeg_quality,
};
pub use package::{DmgFormat, NsisCompression, PackageSettings};
pub use platform::Platform;

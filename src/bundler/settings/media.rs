//! Media transcoding policy.

use super::Platform;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::Path;

/// Accepted JPEG quality range; configured values are clamped into it.
pub const JPEG_QUALITY_RANGE: RangeInclusive<i64> = 40..=95;

/// Default JPEG quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 82;

/// Audio files smaller than this are never re-encoded (512 KiB).
pub const DEFAULT_AUDIO_MIN_BYTES: u64 = 512 * 1024;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Clamp a configured JPEG quality into [`JPEG_QUALITY_RANGE`].
pub fn clamp_jpeg_quality(quality: i64) -> u8 {
    quality.clamp(*JPEG_QUALITY_RANGE.start(), *JPEG_QUALITY_RANGE.end()) as u8
}

/// Audio codec used when re-encoding an audio class file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCodec {
    /// MPEG-1 Layer III via libmp3lame.
    Mp3,
    /// AAC in an MPEG-4 audio container.
    Aac,
    /// Vorbis in an Ogg container.
    Vorbis,
}

/// Action the transcoder takes for a staged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaAction {
    /// Requantize the image at the configured quality.
    ImageRequantize,
    /// Re-encode audio with the given codec, stripping metadata.
    AudioReencode(AudioCodec),
    /// Rewrap video streams into the staged container without re-encoding.
    VideoRemux,
    /// Leave the staged bytes as they are.
    CopyOnly,
}

impl MediaAction {
    /// External program that performs this action, if any.
    pub fn tool(self) -> Option<&'static str> {
        match self {
            Self::ImageRequantize => Some("magick"),
            Self::AudioReencode(_) | Self::VideoRemux => Some("ffmpeg"),
            Self::CopyOnly => None,
        }
    }
}

/// Media transcoding configuration.
///
/// Maps staged file extensions to a [`MediaAction`]. Replacement rules
/// (only-if-smaller, never drop) are enforced by the transcoder, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodePolicy {
    /// Re-encode images and audio.
    ///
    /// Default: true
    pub enabled: bool,

    /// JPEG/WebP quality handed to the image requantizer.
    ///
    /// Default: 82
    pub jpeg_quality: u8,

    /// MP3 target bitrate (ffmpeg syntax).
    ///
    /// Default: "128k"
    pub mp3_bitrate: String,

    /// AAC target bitrate (ffmpeg syntax).
    ///
    /// Default: "128k"
    pub aac_bitrate: String,

    /// Vorbis VBR quality, 0..=10.
    ///
    /// Default: 4
    pub ogg_quality: u8,

    /// Audio files below this size are skipped.
    ///
    /// Default: 512 KiB
    pub audio_min_bytes: u64,

    /// Remux video staged under a remapped container extension.
    ///
    /// Default: true on platforms with a video remap
    pub video_remux: bool,

    /// Lower-case source extension to staged extension.
    pub extension_remap: BTreeMap<String, String>,
}

impl Default for TranscodePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            mp3_bitrate: "128k".to_string(),
            aac_bitrate: "128k".to_string(),
            ogg_quality: 4,
            audio_min_bytes: DEFAULT_AUDIO_MIN_BYTES,
            video_remux: false,
            extension_remap: BTreeMap::new(),
        }
    }
}

impl TranscodePolicy {
    /// Default policy for `platform`.
    ///
    /// `skip_video_convert` disables both the container remap and the remux,
    /// so videos are staged under their original names.
    pub fn for_platform(platform: Platform, skip_video_convert: bool) -> Self {
        let mut policy = Self::default();
        if !skip_video_convert {
            policy.extension_remap = platform
                .video_remap()
                .iter()
                .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
                .collect();
            policy.video_remux = !policy.extension_remap.is_empty();
        }
        policy
    }

    /// Staged extension for a source file extension, if it is remapped.
    pub fn remapped_extension(&self, extension: &str) -> Option<&str> {
        self.extension_remap
            .get(&extension.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Action for a staged file, decided by its extension alone.
    pub fn action_for(&self, path: &Path) -> MediaAction {
        let Some(ext) = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
        else {
            return MediaAction::CopyOnly;
        };

        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            return MediaAction::ImageRequantize;
        }

        match ext.as_str() {
            "mp3" => return MediaAction::AudioReencode(AudioCodec::Mp3),
            "m4a" | "aac" => return MediaAction::AudioReencode(AudioCodec::Aac),
            "ogg" => return MediaAction::AudioReencode(AudioCodec::Vorbis),
            _ => {}
        }

        if self.video_remux && self.extension_remap.values().any(|target| *target == ext) {
            return MediaAction::VideoRemux;
        }

        MediaAction::CopyOnly
    }
}

//! Target platform selection.

use std::fmt;

/// Release target platform.
///
/// Selects the package format (DMG or NSIS installer), the packager's
/// `--add-data` separator, the icon container and the media extension remap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// macOS `.app` bundle shipped in a `.dmg`.
    MacOs,
    /// Windows onedir bundle shipped in an NSIS `-setup.exe`.
    Windows,
}

impl Platform {
    /// Lower-case name used in artifact file names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MacOs => "macos",
            Self::Windows => "windows",
        }
    }

    /// Separator between source and destination in packager `--add-data` values.
    pub fn data_separator(self) -> char {
        match self {
            Self::MacOs => ':',
            Self::Windows => ';',
        }
    }

    /// Icon container extension expected by the packager on this platform.
    pub fn icon_extension(self) -> &'static str {
        match self {
            Self::MacOs => "icns",
            Self::Windows => "ico",
        }
    }

    /// Source-to-staged extension remaps applied while staging.
    ///
    /// Windows media playback cannot rely on QuickTime containers, so `.mov`
    /// files are staged as `.mp4` and later remuxed. macOS plays both natively.
    pub fn video_remap(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::MacOs => &[],
            Self::Windows => &[("mov", "mp4")],
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

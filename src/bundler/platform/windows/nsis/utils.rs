//! NSIS utility functions.
//!
//! Helper functions for compression settings, version formatting, the
//! installer's upgrade identity and script file encoding.

use crate::bundler::{
    error::{ErrorExt, Result},
    settings::NsisCompression,
};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Map compression setting to NSIS compressor name.
///
/// `None` for [`NsisCompression::None`], which disables compression entirely.
pub fn map_compression(compression: NsisCompression) -> Option<&'static str> {
    match compression {
        NsisCompression::None => None,
        NsisCompression::Zlib => Some("zlib"),
        NsisCompression::Bzip2 => Some("bzip2"),
        NsisCompression::Lzma => Some("lzma"),
    }
}

/// Format version string for NSIS VIProductVersion.
///
/// NSIS requires exactly 4 numeric parts (major.minor.patch.build).
/// Pre-release and build suffixes are dropped and each part keeps only its
/// leading digits:
/// - "1" -> "1.0.0.0"
/// - "1.2.3" -> "1.2.3.0"
/// - "1.4.0-beta.2" -> "1.4.0.0"
/// - "1.2.3.4.5" -> "1.2.3.4" (truncates to first 4)
pub fn format_version_for_nsis(version: &str) -> String {
    let core = version
        .split(['-', '+'])
        .next()
        .unwrap_or_default();

    let mut parts: Vec<String> = core
        .split('.')
        .take(4)
        .map(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            if digits.is_empty() {
                "0".to_string()
            } else {
                digits
            }
        })
        .collect();
    parts.resize(4, "0".to_string());
    parts.join(".")
}

/// Stable upgrade GUID for a bundle identifier.
///
/// Derived with UUID v5 so every release of the same app writes to the same
/// uninstall registry key, and reinstalling replaces the previous install.
pub fn upgrade_guid(identifier: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, identifier.as_bytes())
        .hyphenated()
        .to_string()
        .to_uppercase()
}

/// Write file with UTF-8 BOM (required by NSIS).
///
/// NSIS requires installer scripts to be encoded with UTF-8 BOM (byte order mark).
/// This function writes the BOM (EF BB BF) followed by the content.
pub async fn write_utf8_bom(path: &Path, content: &str) -> Result<()> {
    let mut file = tokio::fs::File::create(path)
        .await
        .fs_context("creating NSI script file", path)?;

    // Write UTF-8 BOM: EF BB BF
    file.write_all(&[0xEF, 0xBB, 0xBF])
        .await
        .fs_context("writing UTF-8 BOM", path)?;
    file.write_all(content.as_bytes())
        .await
        .fs_context("writing NSI content", path)?;
    file.flush().await.fs_context("flushing NSI file", path)?;

    Ok(())
}

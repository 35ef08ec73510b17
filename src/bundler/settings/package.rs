//! Package format settings (DMG and NSIS).

/// macOS disk image format passed to `hdiutil create -format`.
///
/// # Configuration
///
/// ```text
/// BUNDLE_DMG_FORMAT=ULFO
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DmgFormat {
    /// zlib-compressed read-only image.
    #[default]
    #[value(name = "UDZO")]
    Udzo,
    /// bzip2-compressed read-only image.
    #[value(name = "UDBZ")]
    Udbz,
    /// LZFSE-compressed read-only image (macOS 10.11+).
    #[value(name = "ULFO")]
    Ulfo,
    /// LZMA-compressed read-only image (macOS 10.15+).
    #[value(name = "ULMO")]
    Ulmo,
}

impl DmgFormat {
    /// Format identifier understood by hdiutil.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Udzo => "UDZO",
            Self::Udbz => "UDBZ",
            Self::Ulfo => "ULFO",
            Self::Ulmo => "ULMO",
        }
    }
}

/// Compression algorithm for NSIS installers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum NsisCompression {
    /// No compression.
    None,
    /// Zlib compression.
    Zlib,
    /// Bzip2 compression.
    Bzip2,
    /// LZMA compression (best ratio).
    #[default]
    Lzma,
}

/// Package assembly configuration.
///
/// Carries the platform package options; the platform itself is chosen on
/// the [`ReleaseContext`](super::ReleaseContext).
#[derive(Debug, Clone, Default)]
pub struct PackageSettings {
    /// Bundle identifier in reverse domain notation.
    ///
    /// Example: "ai.kodegen.fleetsnowfluff"
    ///
    /// Default: None (derived from the product name where needed)
    pub identifier: Option<String>,

    /// Publisher shown in the Windows uninstall entry.
    ///
    /// Default: None ("Unknown Publisher")
    pub publisher: Option<String>,

    /// Disk image format.
    pub dmg_format: DmgFormat,

    /// Installer compression.
    pub nsis_compression: NsisCompression,
}

impl PackageSettings {
    /// Bundle identifier, falling back to one derived from `product_name`.
    pub fn identifier_or(&self, product_name: &str) -> String {
        match &self.identifier {
            Some(id) => id.clone(),
            None => {
                let slug: String = product_name
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_ascii_lowercase();
                format!("ai.kodegen.{slug}")
            }
        }
    }
}

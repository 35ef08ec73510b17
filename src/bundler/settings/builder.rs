//! Builder for constructing ReleaseContext.

use super::{AuditSettings, PackageSettings, Platform, ReleaseContext, TranscodePolicy};
use std::path::{Path, PathBuf};

/// Application packager invoked when none is configured.
pub const DEFAULT_PACKAGER: &str = "pyinstaller";

/// Modules excluded from the bundle to reduce its footprint.
///
/// The application only uses Qt Widgets, Gui and Multimedia; the heavy web,
/// 3D and device modules are never imported at runtime.
pub const DEFAULT_EXCLUDED_MODULES: &[&str] = &[
    "tkinter",
    "unittest",
    "pydoc_data",
    "PySide6.QtWebEngineCore",
    "PySide6.QtWebEngineWidgets",
    "PySide6.QtWebEngineQuick",
    "PySide6.Qt3DCore",
    "PySide6.Qt3DRender",
    "PySide6.QtQuick3D",
    "PySide6.QtCharts",
    "PySide6.QtDataVisualization",
    "PySide6.QtBluetooth",
    "PySide6.QtPositioning",
    "PySide6.QtSensors",
    "PySide6.QtSerialPort",
];

/// Builder for constructing [`ReleaseContext`].
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_desktop::bundler::{Platform, ReleaseContextBuilder};
///
/// # fn example() -> kodegen_bundler_desktop::bundler::Result<()> {
/// let ctx = ReleaseContextBuilder::new()
///     .platform(Platform::MacOs)
///     .version("1.2.0")
///     .product_name("Fleet Snowfluff")
///     .resources_dir("resources")
///     .entry_point("main.py")
///     .staging_dir("build/staging_resources")
///     .build_dir("build/bundle")
///     .output_dir("dist")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ReleaseContextBuilder {
    platform: Option<Platform>,
    version: Option<String>,
    product_name: Option<String>,
    resources_dir: Option<PathBuf>,
    staging_dir: Option<PathBuf>,
    build_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    entry_point: Option<PathBuf>,
    icon: Option<PathBuf>,
    packager: Option<String>,
    exclude_modules: Option<Vec<String>>,
    transcode: Option<TranscodePolicy>,
    audit: AuditSettings,
    package: PackageSettings,
}

impl ReleaseContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the target platform.
    ///
    /// # Required
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Sets the resolved version string.
    ///
    /// # Required
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the application display name.
    ///
    /// # Required
    pub fn product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    /// Sets the source resource tree.
    ///
    /// # Required
    pub fn resources_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.resources_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the staging directory.
    ///
    /// # Required
    pub fn staging_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.staging_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the build-intermediate directory.
    ///
    /// # Required
    pub fn build_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.build_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the final output directory.
    ///
    /// # Required
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the compiled entry point.
    ///
    /// # Required
    pub fn entry_point<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.entry_point = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the source icon.
    ///
    /// Default: None
    pub fn icon(mut self, icon: Option<PathBuf>) -> Self {
        self.icon = icon;
        self
    }

    /// Sets the packager program.
    ///
    /// Default: [`DEFAULT_PACKAGER`]
    pub fn packager(mut self, packager: impl Into<String>) -> Self {
        self.packager = Some(packager.into());
        self
    }

    /// Sets the module exclusion list.
    ///
    /// Default: [`DEFAULT_EXCLUDED_MODULES`]
    pub fn exclude_modules(mut self, modules: Vec<String>) -> Self {
        self.exclude_modules = Some(modules);
        self
    }

    /// Sets the media transcoding policy.
    ///
    /// Default: [`TranscodePolicy::for_platform`] with video conversion on
    pub fn transcode(mut self, policy: TranscodePolicy) -> Self {
        self.transcode = Some(policy);
        self
    }

    /// Sets the leak-audit settings.
    ///
    /// Default: canonical forbidden set, no canary
    pub fn audit(mut self, audit: AuditSettings) -> Self {
        self.audit = audit;
        self
    }

    /// Sets the package format settings.
    pub fn package(mut self, package: PackageSettings) -> Self {
        self.package = package;
        self
    }

    /// Builds the context.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing or the version or
    /// product name is empty.
    pub fn build(self) -> crate::bundler::Result<ReleaseContext> {
        use crate::bundler::error::Context;

        let platform = self.platform.context("platform is required")?;
        let version = self.version.context("version is required")?;
        let product_name = self.product_name.context("product_name is required")?;
        if version.trim().is_empty() {
            crate::bail!("version must not be empty");
        }
        if product_name.trim().is_empty() {
            crate::bail!("product_name must not be empty");
        }

        let transcode = self
            .transcode
            .unwrap_or_else(|| TranscodePolicy::for_platform(platform, false));
        let exclude_modules = self.exclude_modules.unwrap_or_else(|| {
            DEFAULT_EXCLUDED_MODULES
                .iter()
                .map(|m| (*m).to_string())
                .collect()
        });

        Ok(ReleaseContext::new(
            platform,
            version,
            product_name,
            self.resources_dir.context("resources_dir is required")?,
            self.staging_dir.context("staging_dir is required")?,
            self.build_dir.context("build_dir is required")?,
            self.output_dir.context("output_dir is required")?,
            self.entry_point.context("entry_point is required")?,
            self.icon,
            self.packager
                .unwrap_or_else(|| DEFAULT_PACKAGER.to_string()),
            exclude_modules,
            transcode,
            self.audit,
            self.package,
        ))
    }
}

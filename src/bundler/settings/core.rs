//! Core ReleaseContext struct and implementations.

use super::{AuditSettings, PackageSettings, Platform, TranscodePolicy};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("static regex is valid"));

/// Immutable configuration for one release run.
///
/// Constructed once via [`ReleaseContextBuilder`](super::ReleaseContextBuilder)
/// and passed by reference to every stage. There are no setters; nothing in
/// the pipeline reads ambient process state after construction.
///
/// # Directory layout
///
/// ```text
/// <build_dir>/
///   dist/       packager output (.app or onedir)
///   work/       packager scratch space
///   icon/       converted platform icon
///   package/    disk image / installer before it is published
/// <staging_dir>/  staged (and transcoded) resources
/// <output_dir>/   exactly one published artifact
/// ```
#[derive(Clone, Debug)]
pub struct ReleaseContext {
    platform: Platform,
    version: String,
    product_name: String,
    resources_dir: PathBuf,
    staging_dir: PathBuf,
    build_dir: PathBuf,
    output_dir: PathBuf,
    entry_point: PathBuf,
    icon: Option<PathBuf>,
    packager: String,
    exclude_modules: Vec<String>,
    transcode: TranscodePolicy,
    audit: AuditSettings,
    package: PackageSettings,
}

impl ReleaseContext {
    /// Returns the target platform.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Returns the resolved version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the application display name.
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    /// Returns the source resource tree (read-only).
    pub fn resources_dir(&self) -> &Path {
        &self.resources_dir
    }

    /// Returns the staging directory.
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Returns the build-intermediate directory.
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Returns the final output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns the compiled entry point handed to the packager.
    pub fn entry_point(&self) -> &Path {
        &self.entry_point
    }

    /// Returns the source icon, if one is configured.
    pub fn icon(&self) -> Option<&Path> {
        self.icon.as_deref()
    }

    /// Returns the application packager program.
    pub fn packager(&self) -> &str {
        &self.packager
    }

    /// Returns modules excluded from the bundle.
    pub fn exclude_modules(&self) -> &[String] {
        &self.exclude_modules
    }

    /// Returns the media transcoding policy.
    pub fn transcode(&self) -> &TranscodePolicy {
        &self.transcode
    }

    /// Returns the leak-audit settings.
    pub fn audit(&self) -> &AuditSettings {
        &self.audit
    }

    /// Returns the package format settings.
    pub fn package(&self) -> &PackageSettings {
        &self.package
    }

    /// Packager distribution directory.
    pub fn dist_dir(&self) -> PathBuf {
        self.build_dir.join("dist")
    }

    /// Packager scratch directory.
    pub fn work_dir(&self) -> PathBuf {
        self.build_dir.join("work")
    }

    /// Directory where the package assembler writes before publishing.
    pub fn package_dir(&self) -> PathBuf {
        self.build_dir.join("package")
    }

    /// Directory the converted platform icon is written to.
    pub fn icon_dir(&self) -> PathBuf {
        self.build_dir.join("icon")
    }

    /// Root of the packaged application: the `.app` on macOS, the onedir
    /// folder on Windows. This is what gets sanitized and audited.
    pub fn bundle_dir(&self) -> PathBuf {
        match self.platform {
            Platform::MacOs => self.dist_dir().join(format!("{}.app", self.product_name)),
            Platform::Windows => self.dist_dir().join(&self.product_name),
        }
    }

    /// Path that must exist once the packager has succeeded.
    pub fn bundle_marker(&self) -> PathBuf {
        match self.platform {
            Platform::MacOs => self.bundle_dir(),
            Platform::Windows => self
                .bundle_dir()
                .join(format!("{}.exe", self.product_name)),
        }
    }

    /// File name of the published artifact.
    ///
    /// Format: `{name}-{version}-{platform}.dmg` or `{name}-{version}-{platform}-setup.exe`,
    /// with characters outside `[A-Za-z0-9._-]` replaced by `_`.
    pub fn artifact_name(&self) -> String {
        let stem = format!(
            "{}-{}-{}",
            self.product_name,
            self.version,
            self.platform.as_str()
        );
        let stem = UNSAFE_FILENAME_CHARS.replace_all(&stem, "_");
        match self.platform {
            Platform::MacOs => format!("{stem}.dmg"),
            Platform::Windows => format!("{stem}-setup.exe"),
        }
    }

    /// Final location of the published artifact.
    pub fn artifact_path(&self) -> PathBuf {
        self.output_dir.join(self.artifact_name())
    }

    /// Creates a new ReleaseContext (used by ReleaseContextBuilder).
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        platform: Platform,
        version: String,
        product_name: String,
        resources_dir: PathBuf,
        staging_dir: PathBuf,
        build_dir: PathBuf,
        output_dir: PathBuf,
        entry_point: PathBuf,
        icon: Option<PathBuf>,
        packager: String,
        exclude_modules: Vec<String>,
        transcode: TranscodePolicy,
        audit: AuditSettings,
        package: PackageSettings,
    ) -> Self {
        Self {
            platform,
            version,
            product_name,
            resources_dir,
            staging_dir,
            build_dir,
            output_dir,
            entry_point,
            icon,
            packager,
            exclude_modules,
            transcode,
            audit,
            package,
        }
    }
}

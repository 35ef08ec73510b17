//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap. Media and audit
//! options can also be supplied through `BUNDLE_*` environment variables;
//! this is the only place the environment is read.

use crate::bundler::{
    AuditSettings, DmgFormat, NsisCompression, PackageSettings, Platform, ReleaseContext,
    ReleaseContextBuilder, Stage, StageObserver, TranscodePolicy,
    settings::{
        DEFAULT_AUDIO_MIN_BYTES, DEFAULT_EXCLUDED_MODULES, DEFAULT_JPEG_QUALITY, DEFAULT_PACKAGER,
        DEFAULT_SCAN_LIMIT, clamp_jpeg_quality,
    },
};
use crate::error::{BundlerError, CliError, Result};
use clap::{Parser, Subcommand};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Name of the icon picked up from the resource directory when `--icon` is absent.
const DEFAULT_ICON_NAME: &str = "icon.webp";

/// Release packager for media-bundled desktop applications
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_bundler_desktop",
    version,
    about = "Release packager for media-bundled desktop applications",
    long_about = "Stages the resource tree, optimizes media, builds the application bundle, \
removes developer state, audits the bundle and produces a .dmg or NSIS installer.

Usage:
  kodegen_bundler_desktop macos 1.4.0
  kodegen_bundler_desktop windows --skip-video-convert
  BUNDLE_CANARY=SECRET123 kodegen_bundler_desktop macos --report build/release.json

Exit code 0 = exactly one audited artifact in the output directory.
Exit code 2 = bundle built but failed the audit; nothing shipped."
)]
pub struct Args {
    /// Target platform
    #[command(subcommand)]
    pub command: Command,

    /// Print per-file details (remapped names, media left unchanged)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Target platform.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a macOS .app and .dmg
    Macos(PlatformArgs),
    /// Build a Windows onedir bundle and NSIS installer
    Windows(PlatformArgs),
}

/// Options shared by both platforms.
#[derive(clap::Args, Debug, Clone)]
pub struct PlatformArgs {
    /// Release version (default: read from the metadata file)
    #[arg(value_name = "VERSION")]
    pub version: Option<String>,

    /// Keep videos in their original container (no rename, no remux)
    #[arg(long)]
    pub skip_video_convert: bool,

    /// Source resource directory
    #[arg(long, value_name = "DIR", default_value = "resources")]
    pub resources: PathBuf,

    /// Application entry point handed to the packager
    #[arg(long, value_name = "FILE", default_value = "main.py")]
    pub entry: PathBuf,

    /// Project metadata file the version is read from
    #[arg(long, value_name = "FILE", default_value = "pyproject.toml")]
    pub metadata: PathBuf,

    /// Scratch copy of the resources (erased on every run)
    #[arg(long, value_name = "DIR", default_value = "build/staging_resources")]
    pub staging_dir: PathBuf,

    /// Packager work area (erased on every run)
    #[arg(long, value_name = "DIR", default_value = "build/bundle")]
    pub build_dir: PathBuf,

    /// Directory that receives the final artifact
    #[arg(long, value_name = "DIR", default_value = "dist")]
    pub output_dir: PathBuf,

    /// Product name
    #[arg(long, default_value = "Fleet Snowfluff")]
    pub name: String,

    /// Application icon (default: <resources>/icon.webp when present)
    #[arg(long, value_name = "FILE")]
    pub icon: Option<PathBuf>,

    /// Bundle identifier (default: derived from the product name)
    #[arg(long)]
    pub identifier: Option<String>,

    /// Publisher shown by the Windows installer
    #[arg(long)]
    pub publisher: Option<String>,

    /// Packager program
    #[arg(long, default_value = DEFAULT_PACKAGER)]
    pub packager: String,

    /// Extra module to exclude from the bundle (repeatable, added to the defaults)
    #[arg(long = "exclude-module", value_name = "MODULE")]
    pub exclude_modules: Vec<String>,

    /// Write a JSON release report to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Re-encode images and audio (on/off)
    #[arg(
        long,
        env = "BUNDLE_COMPRESS",
        default_value = "on",
        value_parser = parse_toggle,
        action = clap::ArgAction::Set
    )]
    pub compress: bool,

    /// JPEG/WebP quality, clamped to 40..=95
    #[arg(
        long,
        env = "BUNDLE_JPEG_QUALITY",
        default_value_t = DEFAULT_JPEG_QUALITY as i64,
        allow_negative_numbers = true
    )]
    pub jpeg_quality: i64,

    /// MP3 target bitrate
    #[arg(long, env = "BUNDLE_MP3_BITRATE", default_value = "128k")]
    pub mp3_bitrate: String,

    /// AAC target bitrate
    #[arg(long, env = "BUNDLE_AAC_BITRATE", default_value = "128k")]
    pub aac_bitrate: String,

    /// Vorbis quality (0-10)
    #[arg(
        long,
        env = "BUNDLE_OGG_QUALITY",
        default_value_t = 4,
        value_parser = clap::value_parser!(u8).range(0..=10)
    )]
    pub ogg_quality: u8,

    /// Audio files below this many bytes are not re-encoded
    #[arg(long, env = "BUNDLE_AUDIO_MIN_BYTES", default_value_t = DEFAULT_AUDIO_MIN_BYTES)]
    pub audio_min_bytes: u64,

    /// Token that must not appear in any bundled file (empty disables)
    #[arg(long, env = "BUNDLE_CANARY", hide_env_values = true)]
    pub canary: Option<String>,

    /// Files larger than this many bytes are not searched for the canary
    #[arg(long, env = "BUNDLE_CANARY_SCAN_LIMIT", default_value_t = DEFAULT_SCAN_LIMIT)]
    pub canary_scan_limit: u64,

    /// Disk image format
    #[arg(
        long,
        env = "BUNDLE_DMG_FORMAT",
        value_enum,
        ignore_case = true,
        default_value_t = DmgFormat::default()
    )]
    pub dmg_format: DmgFormat,

    /// Installer compression
    #[arg(
        long,
        env = "BUNDLE_NSIS_COMPRESSION",
        value_enum,
        ignore_case = true,
        default_value_t = NsisCompression::default()
    )]
    pub nsis_compression: NsisCompression,
}

/// Parses an on/off style switch.
pub fn parse_toggle(value: &str) -> std::result::Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        other => Err(format!("expected on/off, true/false or 1/0, got '{other}'")),
    }
}

impl Args {
    /// Parse command line arguments
    ///
    /// Errors (including `--help` and `--version` requests) are returned
    /// instead of exiting, so usage errors can use exit code 1.
    pub fn parse_args() -> std::result::Result<Self, clap::Error> {
        Self::try_parse()
    }

    /// Target platform and its options.
    pub fn target(&self) -> (Platform, &PlatformArgs) {
        match &self.command {
            Command::Macos(args) => (Platform::MacOs, args),
            Command::Windows(args) => (Platform::Windows, args),
        }
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        let (_, args) = self.target();

        if args.name.trim().is_empty() {
            return Err("Product name cannot be empty".to_string());
        }
        if args.packager.trim().is_empty() {
            return Err("Packager cannot be empty".to_string());
        }
        if let Some(report) = &args.report {
            let report = absolute(report).map_err(|e| e.to_string())?;
            let output = absolute(&args.output_dir).map_err(|e| e.to_string())?;
            if report.starts_with(&output) {
                return Err(format!(
                    "Report path {} must be outside the output directory {}",
                    report.display(),
                    output.display()
                ));
            }
        }

        Ok(())
    }
}

impl PlatformArgs {
    /// Icon to use: `--icon`, else `<resources>/icon.webp` if it exists.
    pub fn icon_path(&self) -> Option<PathBuf> {
        self.icon.clone().or_else(|| {
            let candidate = self.resources.join(DEFAULT_ICON_NAME);
            candidate.is_file().then_some(candidate)
        })
    }

    /// Media policy for `platform` from these options.
    pub fn transcode_policy(&self, platform: Platform) -> TranscodePolicy {
        TranscodePolicy {
            enabled: self.compress,
            jpeg_quality: clamp_jpeg_quality(self.jpeg_quality),
            mp3_bitrate: self.mp3_bitrate.clone(),
            aac_bitrate: self.aac_bitrate.clone(),
            ogg_quality: self.ogg_quality,
            audio_min_bytes: self.audio_min_bytes,
            ..TranscodePolicy::for_platform(platform, self.skip_video_convert)
        }
    }

    /// Builds the release context with every path made absolute.
    pub fn release_context(&self, platform: Platform, version: String) -> Result<ReleaseContext> {
        let mut exclude_modules: Vec<String> = DEFAULT_EXCLUDED_MODULES
            .iter()
            .map(|m| (*m).to_string())
            .collect();
        for module in &self.exclude_modules {
            if !exclude_modules.contains(module) {
                exclude_modules.push(module.clone());
            }
        }

        let icon = self.icon_path().map(|p| absolute(&p)).transpose()?;

        let ctx = ReleaseContextBuilder::new()
            .platform(platform)
            .version(version)
            .product_name(self.name.trim())
            .resources_dir(absolute(&self.resources)?)
            .staging_dir(absolute(&self.staging_dir)?)
            .build_dir(absolute(&self.build_dir)?)
            .output_dir(absolute(&self.output_dir)?)
            .entry_point(absolute(&self.entry)?)
            .icon(icon)
            .packager(self.packager.trim())
            .exclude_modules(exclude_modules)
            .transcode(self.transcode_policy(platform))
            .audit(AuditSettings::with_canary(
                self.canary.as_deref(),
                self.canary_scan_limit,
            ))
            .package(PackageSettings {
                identifier: self.identifier.clone(),
                publisher: self.publisher.clone(),
                dmg_format: self.dmg_format,
                nsis_compression: self.nsis_compression,
            })
            .build()?;

        Ok(ctx)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    path.absolutize()
        .map(|p| p.into_owned())
        .map_err(|e| {
            BundlerError::Cli(CliError::InvalidArguments {
                reason: format!("cannot resolve {}: {}", path.display(), e),
            })
        })
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        let output = super::OutputManager::new(args.verbose, args.quiet);

        Self { output }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print success message if not in quiet mode
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.output.success(message)
    }

    /// Print warning message if not in quiet mode
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.output.warn(message)
    }

    /// Print error message (always shown)
    pub fn error(&self, message: &str) -> std::io::Result<()> {
        self.output.error(message)
    }

    /// Print progress message
    pub fn progress(&self, message: &str) -> std::io::Result<()> {
        self.output.progress(message)
    }

    /// Print section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        self.output.section(title)
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.output.indent(message)
    }
}

impl StageObserver for RuntimeConfig {
    fn stage_started(&self, stage: Stage, _ctx: &ReleaseContext) {
        let _ = self.progress(&format!(
            "[{}/{}] {}",
            stage.number(),
            Stage::ALL.len(),
            stage
        ));
    }
}

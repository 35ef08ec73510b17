//! Release version discovery from project metadata (pyproject.toml or Cargo.toml)

use crate::error::{BundlerError, CliError, Result};
use std::path::Path;

/// Version used when neither the caller nor the metadata supplies one.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// TOML locations searched for a version, in order.
///
/// PEP 621 `[project]`, Poetry's `[tool.poetry]`, then Cargo's `[package]`.
const VERSION_KEYS: &[&[&str]] = &[
    &["project", "version"],
    &["tool", "poetry", "version"],
    &["package", "version"],
];

/// Resolves the release version.
///
/// A non-blank `cli_version` is used verbatim (trimmed). Otherwise the
/// version is read from `metadata_path`; any failure there falls back to
/// [`DEFAULT_VERSION`] with a warning. Never fails.
pub fn resolve_version(cli_version: Option<&str>, metadata_path: &Path) -> String {
    if let Some(version) = cli_version.map(str::trim).filter(|v| !v.is_empty()) {
        log::debug!("Using version from command line: {}", version);
        check_semver(version);
        return version.to_string();
    }

    match load_version(metadata_path) {
        Ok(version) => {
            log::info!("Version {} from {}", version, metadata_path.display());
            check_semver(&version);
            version
        }
        Err(e) => {
            log::warn!("{}; using default version {}", e, DEFAULT_VERSION);
            DEFAULT_VERSION.to_string()
        }
    }
}

/// Reads the first non-empty version string from a TOML metadata file.
pub fn load_version(metadata_path: &Path) -> Result<String> {
    let manifest = std::fs::read_to_string(metadata_path).map_err(|e| {
        BundlerError::Cli(CliError::ExecutionFailed {
            command: "read_metadata".to_string(),
            reason: format!("Failed to read {}: {}", metadata_path.display(), e),
        })
    })?;

    let toml_value: toml::Value = toml::from_str(&manifest).map_err(|e| {
        BundlerError::Cli(CliError::ExecutionFailed {
            command: "parse_metadata".to_string(),
            reason: format!("Failed to parse {}: {}", metadata_path.display(), e),
        })
    })?;

    VERSION_KEYS
        .iter()
        .find_map(|keys| {
            keys.iter()
                .try_fold(&toml_value, |value, key| value.get(key))
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        })
        .ok_or_else(|| {
            BundlerError::Cli(CliError::InvalidArguments {
                reason: format!("No version field in {}", metadata_path.display()),
            })
        })
}

fn check_semver(version: &str) {
    if let Err(e) = semver::Version::parse(version) {
        log::debug!("Version {} is not semver ({}); using it as given", version, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn cli_version_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pyproject.toml");
        fs::write(&path, "[project]\nversion = \"0.9.0\"\n").unwrap();

        assert_eq!(resolve_version(Some(" 2.1.0 "), &path), "2.1.0");
        assert_eq!(resolve_version(Some("nightly"), &path), "nightly");
    }

    #[test]
    fn blank_cli_version_reads_metadata() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pyproject.toml");
        fs::write(&path, "[project]\nname = \"fleet\"\nversion = \"1.4.0\"\n").unwrap();

        assert_eq!(resolve_version(Some("   "), &path), "1.4.0");
        assert_eq!(resolve_version(None, &path), "1.4.0");
    }

    #[test]
    fn poetry_and_cargo_layouts_are_read() {
        let tmp = tempfile::tempdir().unwrap();
        let poetry = tmp.path().join("poetry.toml");
        fs::write(&poetry, "[tool.poetry]\nversion = \"0.3.1\"\n").unwrap();
        let cargo = tmp.path().join("Cargo.toml");
        fs::write(&cargo, "[package]\nname = \"x\"\nversion = \"5.0.0\"\n").unwrap();

        assert_eq!(resolve_version(None, &poetry), "0.3.1");
        assert_eq!(resolve_version(None, &cargo), "5.0.0");
    }

    #[test]
    fn project_version_takes_precedence() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pyproject.toml");
        fs::write(
            &path,
            "[project]\nversion = \"1.0.1\"\n[tool.poetry]\nversion = \"9.9.9\"\n",
        )
        .unwrap();
        assert_eq!(resolve_version(None, &path), "1.0.1");
    }

    #[test]
    fn failures_fall_back_to_default() {
        let tmp = tempfile::tempdir().unwrap();

        assert_eq!(resolve_version(None, &tmp.path().join("missing.toml")), DEFAULT_VERSION);

        let invalid = tmp.path().join("invalid.toml");
        fs::write(&invalid, "[project\nversion = ").unwrap();
        assert_eq!(resolve_version(None, &invalid), DEFAULT_VERSION);

        let no_field = tmp.path().join("nofield.toml");
        fs::write(&no_field, "[project]\nname = \"x\"\n").unwrap();
        assert_eq!(resolve_version(None, &no_field), DEFAULT_VERSION);

        let empty = tmp.path().join("empty.toml");
        fs::write(&empty, "[project]\nversion = \"\"\n").unwrap();
        assert_eq!(resolve_version(None, &empty), DEFAULT_VERSION);

        let not_string = tmp.path().join("number.toml");
        fs::write(&not_string, "[project]\nversion = 3\n").unwrap();
        assert_eq!(resolve_version(None, &not_string), DEFAULT_VERSION);
    }
}

//! Version stamping of the packaged `.app`'s `Info.plist`.

use crate::bundler::error::{Error, Result};
use std::path::Path;

/// Sets the version and display name keys in `<bundle>/Contents/Info.plist`.
///
/// The packager writes a generic plist; Finder and the About panel read
/// `CFBundleShortVersionString` and `CFBundleVersion`, so both carry the
/// release version.
///
/// # Errors
/// [`Error::MissingOutput`] if the plist is absent, [`Error::Plist`] if it
/// cannot be parsed or written.
pub fn stamp(bundle_dir: &Path, version: &str, display_name: &str) -> Result<()> {
    let path = bundle_dir.join("Contents").join("Info.plist");
    if !path.is_file() {
        return Err(Error::MissingOutput {
            stage: "bundle",
            path,
        });
    }

    let mut value = plist::Value::from_file(&path)?;
    let dict = value.as_dictionary_mut().ok_or_else(|| {
        Error::GenericError(format!("{} is not a dictionary", path.display()))
    })?;

    dict.insert(
        "CFBundleShortVersionString".to_string(),
        plist::Value::String(version.to_string()),
    );
    dict.insert(
        "CFBundleVersion".to_string(),
        plist::Value::String(version.to_string()),
    );
    dict.insert(
        "CFBundleDisplayName".to_string(),
        plist::Value::String(display_name.to_string()),
    );

    value.to_file_xml(&path)?;
    log::debug!("Stamped {} with version {}", path.display(), version);
    Ok(())
}

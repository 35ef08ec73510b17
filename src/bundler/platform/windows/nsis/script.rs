//! NSIS installer script generation.
//!
//! Generates NSI installer scripts from templates using Handlebars,
//! with all necessary metadata, paths, and configuration settings.

use super::{template::NSI_TEMPLATE, utils};
use crate::bundler::{
    error::{Error, Result},
    settings::ReleaseContext,
};
use handlebars::Handlebars;
use serde_json::json;
use std::path::{Path, PathBuf};

const DEFAULT_PUBLISHER: &str = "Unknown Publisher";

/// Render the NSI script for `ctx` without writing it.
pub fn render_nsi_script(ctx: &ReleaseContext, icon: Option<&Path>) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    let identifier = ctx.package().identifier_or(ctx.product_name());
    let data = json!({
        "product_name": ctx.product_name(),
        "version": ctx.version(),
        "version_nsis": utils::format_version_for_nsis(ctx.version()),
        "publisher": ctx
            .package()
            .publisher
            .as_deref()
            .unwrap_or(DEFAULT_PUBLISHER),
        "exe_name": format!("{}.exe", ctx.product_name()),
        "upgrade_guid": utils::upgrade_guid(&identifier),
        "compression": utils::map_compression(ctx.package().nsis_compression),
        "source_dir": ctx.bundle_dir().display().to_string(),
        "default_output": ctx.package_dir().join(ctx.artifact_name()).display().to_string(),
        "installer_icon": icon.map(|p| p.display().to_string()),
    });

    handlebars
        .register_template_string("installer.nsi", NSI_TEMPLATE)
        .map_err(|e| Error::GenericError(format!("failed to register NSI template: {}", e)))?;

    handlebars
        .render("installer.nsi", &data)
        .map_err(|e| Error::GenericError(format!("failed to render NSI template: {}", e)))
}

/// Generate the NSI installer script into `output_dir`.
///
/// Writes output with UTF-8 BOM required by NSIS.
///
/// # Returns
/// Path to the generated installer.nsi file
pub async fn generate_nsi_script(
    ctx: &ReleaseContext,
    icon: Option<&Path>,
    output_dir: &Path,
) -> Result<PathBuf> {
    let nsi_content = render_nsi_script(ctx, icon)?;

    let nsi_path = output_dir.join("installer.nsi");
    utils::write_utf8_bom(&nsi_path, &nsi_content).await?;

    Ok(nsi_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::{
        NsisCompression, PackageSettings, Platform, ReleaseContextBuilder,
    };

    fn ctx(compression: NsisCompression) -> ReleaseContext {
        ReleaseContextBuilder::new()
            .platform(Platform::Windows)
            .version("1.4.0-rc.1")
            .product_name("Fleet Snowfluff")
            .resources_dir("C:/p/resources")
            .staging_dir("C:/p/build/staging_resources")
            .build_dir("C:/p/build/bundle")
            .output_dir("C:/p/dist")
            .entry_point("C:/p/main.py")
            .package(PackageSettings {
                nsis_compression: compression,
                publisher: Some("Snowfluff Lab".into()),
                ..Default::default()
            })
            .build()
            .unwrap()
    }

    #[test]
    fn script_carries_release_metadata() {
        let script = render_nsi_script(&ctx(NsisCompression::Lzma), None).unwrap();

        assert!(script.contains("SetCompressor /SOLID lzma"));
        assert!(script.contains("!define PRODUCT_VERSION \"1.4.0-rc.1\""));
        assert!(script.contains("VIProductVersion \"1.4.0.0\""));
        assert!(script.contains("!define PUBLISHER \"Snowfluff Lab\""));
        assert!(script.contains("!define MAIN_EXE \"Fleet Snowfluff.exe\""));
        assert!(script.contains("Fleet_Snowfluff-1.4.0-rc.1-windows-setup.exe"));
        assert!(!script.contains("MUI_ICON"));
    }

    #[test]
    fn uncompressed_installer_and_icon() {
        let script = render_nsi_script(
            &ctx(NsisCompression::None),
            Some(Path::new("C:/p/build/bundle/icon/icon.ico")),
        )
        .unwrap();

        assert!(script.contains("SetCompress off"));
        assert!(!script.contains("SetCompressor"));
        assert!(script.contains("!define MUI_ICON \"C:/p/build/bundle/icon/icon.ico\""));
    }
}

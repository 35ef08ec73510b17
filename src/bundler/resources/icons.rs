//! Application icon conversion.
//!
//! The packager expects `.icns` on macOS and `.ico` on Windows. Any raster
//! format `image` can decode (the project ships a WebP) is resampled to the
//! standard sizes and written in the platform's container.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    settings::Platform,
    utils::fs,
};
use image::{DynamicImage, imageops::FilterType};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

const ICNS_SIZES: &[u32] = &[16, 32, 64, 128, 256, 512];
const ICO_SIZES: &[u32] = &[16, 24, 32, 48, 64, 128, 256];

/// Produces a packager-ready icon for `platform` inside `out_dir`.
///
/// A source already in the right container is copied unchanged.
///
/// # Errors
/// If the source cannot be decoded or the container cannot be written.
pub async fn prepare_icon(source: &Path, platform: Platform, out_dir: &Path) -> Result<PathBuf> {
    if !source.is_file() {
        return Err(Error::SourceMissing(source.to_path_buf()));
    }

    fs::create_dir_all(out_dir, false).await?;
    let ext = platform.icon_extension();
    let dest = out_dir.join(format!("icon.{}", ext));

    let already = source
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext));
    if already {
        fs::copy_file(source, &dest).await?;
        log::debug!("Using icon as-is: {}", source.display());
        return Ok(dest);
    }

    let src = source.to_path_buf();
    let out = dest.clone();
    tokio::task::spawn_blocking(move || {
        let img = image::open(&src)?;
        match platform {
            Platform::MacOs => write_icns(&img, &out),
            Platform::Windows => write_ico(&img, &out),
        }
    })
    .await
    .map_err(|e| Error::GenericError(format!("Icon task panicked: {}", e)))??;

    log::info!("Converted icon {} -> {}", source.display(), dest.display());
    Ok(dest)
}

fn resized(img: &DynamicImage, size: u32) -> image::RgbaImage {
    img.resize_exact(size, size, FilterType::Lanczos3).to_rgba8()
}

fn write_icns(img: &DynamicImage, out: &Path) -> Result<()> {
    let mut family = icns::IconFamily::new();
    for &size in ICNS_SIZES {
        let rgba = resized(img, size);
        let icon = icns::Image::from_data(icns::PixelFormat::RGBA, size, size, rgba.into_raw())
            .fs_context("encoding icns image", out)?;
        family.add_icon(&icon).fs_context("adding icns image", out)?;
    }
    let file = std::fs::File::create(out).fs_context("creating icon", out)?;
    family
        .write(BufWriter::new(file))
        .fs_context("writing icns", out)
}

fn write_ico(img: &DynamicImage, out: &Path) -> Result<()> {
    let mut dir = ico::IconDir::new(ico::ResourceType::Icon);
    for &size in ICO_SIZES {
        let rgba = resized(img, size);
        let image = ico::IconImage::from_rgba_data(size, size, rgba.into_raw());
        let entry = ico::IconDirEntry::encode(&image).fs_context("encoding ico image", out)?;
        dir.add_entry(entry);
    }
    let file = std::fs::File::create(out).fs_context("creating icon", out)?;
    dir.write(BufWriter::new(file)).fs_context("writing ico", out)
}

//! Image file I/O through the `image` crate.
//!
//! Decoded images are normalised to 8-bit gray, RGB or RGBA. Nothing is
//! converted implicitly beyond that: an RGB file stays RGB and has to be
//! upgraded explicitly before alpha embedding.

use crate::carrier::PixelImage;
use crate::error::{Error, Result};
use image::io::Reader;
use image::{ColorType, DynamicImage, ImageFormat};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File-level facts about an image, read without decoding the pixels.
#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub path: PathBuf,
    pub size_bytes: u64,
    /// Container format sniffed from the file header, e.g. `PNG`.
    pub format: Option<String>,
}

/// Load an image file as a [`PixelImage`].
pub fn load_image(path: &Path) -> Result<PixelImage> {
    if !path.is_file() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("image not found: {}", path.display()),
        )));
    }
    let decoded = image::open(path)?;
    log::debug!(
        "Loaded {} ({}x{}, {:?})",
        path.display(),
        decoded.width(),
        decoded.height(),
        decoded.color()
    );
    from_dynamic(decoded)
}

/// Convert a decoded image, keeping alpha only when the source has it.
pub fn from_dynamic(decoded: DynamicImage) -> Result<PixelImage> {
    let color = decoded.color();
    let (width, height) = (decoded.width() as usize, decoded.height() as usize);

    if color.has_alpha() {
        PixelImage::from_raw(width, height, 4, decoded.into_rgba8().into_raw())
    } else if color.has_color() {
        PixelImage::from_raw(width, height, 3, decoded.into_rgb8().into_raw())
    } else {
        PixelImage::from_raw(width, height, 1, decoded.into_luma8().into_raw())
    }
}

/// Write a [`PixelImage`]; the format follows the file extension.
///
/// Lossy formats destroy LSB payloads, so saving to one only logs a warning
/// and leaves the choice to the caller.
pub fn save_image(image: &PixelImage, path: &Path) -> Result<()> {
    let color = match image.channels() {
        1 => ColorType::L8,
        3 => ColorType::Rgb8,
        4 => ColorType::Rgba8,
        n => {
            return Err(Error::InvalidDimensions(format!(
                "cannot save {}-channel image",
                n
            )))
        }
    };

    if let Ok(format) = ImageFormat::from_path(path) {
        if is_lossy(format) {
            log::warn!(
                "{} uses a lossy format; embedded data will not survive",
                path.display()
            );
        }
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    image::save_buffer(
        path,
        image.as_raw(),
        image.width() as u32,
        image.height() as u32,
        color,
    )?;
    log::debug!("Saved {} ({})", path.display(), image.shape());
    Ok(())
}

fn is_lossy(format: ImageFormat) -> bool {
    matches!(format, ImageFormat::Jpeg | ImageFormat::WebP | ImageFormat::Avif)
}

/// Size and sniffed format of an image file.
pub fn file_info(path: &Path) -> Result<FileInfo> {
    let size_bytes = std::fs::metadata(path)?.len();
    let format = Reader::open(path)?
        .with_guessed_format()?
        .format()
        .map(|f| format!("{:?}", f).to_uppercase());
    Ok(FileInfo {
        path: path.to_path_buf(),
        size_bytes,
        format,
    })
}

/// Whether `path` has an extension the `image` crate can decode.
pub fn is_supported(path: &Path) -> bool {
    ImageFormat::from_path(path)
        .map(|f| f.can_read())
        .unwrap_or(false)
}

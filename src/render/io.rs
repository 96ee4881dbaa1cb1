//! Raster file I/O: decoding base images, PNG encoding and atomic writes.

use image::{DynamicImage, ImageEncoder, ImageReader, RgbaImage};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::error::LabelError;

/// Natural size and format of an image file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
    /// Canonical file extension of the detected format (e.g. "png", "jpg")
    pub format: Option<String>,
}

/// Decode an image file, detecting the format from its contents.
pub fn load_image(path: &Path) -> Result<DynamicImage, LabelError> {
    ImageReader::open(path)
        .map_err(|e| LabelError::image_load(path, e))?
        .with_guessed_format()
        .map_err(|e| LabelError::image_load(path, e))?
        .decode()
        .map_err(|e| LabelError::image_load(path, e))
}

/// Read an image's dimensions from its header without decoding pixels.
pub fn probe_dimensions(path: &Path) -> Result<ImageDimensions, LabelError> {
    let reader = ImageReader::open(path)
        .map_err(|e| LabelError::image_load(path, e))?
        .with_guessed_format()
        .map_err(|e| LabelError::image_load(path, e))?;

    let format = reader
        .format()
        .and_then(|f| f.extensions_str().first())
        .map(|ext| ext.to_string());

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| LabelError::image_load(path, e))?;

    Ok(ImageDimensions {
        width,
        height,
        format,
    })
}

/// Encode an RGBA image as 8-bit RGBA PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, LabelError> {
    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e: image::ImageError| LabelError::Encode(e.to_string()))?;

    Ok(png_bytes)
}

/// Write `bytes` to `path`, creating parent directories.
///
/// The data goes to a temporary file in the destination directory which is
/// then renamed over `path`, so readers never observe a partial file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), LabelError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| LabelError::write(path, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| LabelError::write(path, e))?;
    tmp.write_all(bytes).map_err(|e| LabelError::write(path, e))?;
    tmp.flush().map_err(|e| LabelError::write(path, e))?;
    tmp.persist(path).map_err(|e| LabelError::write(path, e.error))?;

    Ok(())
}

//! Uploaded screenshot handling.
//!
//! Only PNG and JPEG are accepted. Everything downstream (OCR, annotation)
//! works on the RGB8 image this module produces.

use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("unsupported image format (only PNG and JPEG are accepted)")]
    UnsupportedFormat,
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// A decoded upload, normalised to RGB.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub format: ImageFormat,
    pub image: RgbImage,
}

impl Screenshot {
    pub fn from_path(path: &Path) -> Result<Self, UploadError> {
        let bytes = std::fs::read(path).map_err(|source| UploadError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    /// Decode PNG or JPEG bytes. The format is sniffed from the content,
    /// not taken from a file name.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, UploadError> {
        let format = image::guess_format(bytes).map_err(|_| UploadError::UnsupportedFormat)?;
        if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
            return Err(UploadError::UnsupportedFormat);
        }
        let start = std::time::Instant::now();
        let image = image::load_from_memory_with_format(bytes, format)?.to_rgb8();
        log::info!(
            "[UPLOAD] Decoded {:?} {}x{} in {}ms",
            format,
            image.width(),
            image.height(),
            start.elapsed().as_millis()
        );
        Ok(Self { format, image })
    }
}

/// Encode an RGB image as PNG in memory.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut png_bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)?;
    Ok(png_bytes)
}

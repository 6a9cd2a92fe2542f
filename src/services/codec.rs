//! Conversion between image files and [`Bitmap`]s.

use std::io::Cursor;
use std::path::Path;

use image::error::{ParameterError, ParameterErrorKind};
use image::{DynamicImage, ImageError, ImageFormat, RgbaImage};
use resampler::Bitmap;

use crate::error::{DecodeError, EncodeError};

/// Output format, chosen from the file extension on save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormatHint {
    Png,
    Jpeg,
    Bmp,
    Gif,
}

impl ImageFormatHint {
    /// Format for `path`. Unknown or missing extensions save as PNG.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("jpg" | "jpeg") => ImageFormatHint::Jpeg,
            Some("bmp") => ImageFormatHint::Bmp,
            Some("gif") => ImageFormatHint::Gif,
            _ => ImageFormatHint::Png,
        }
    }

    /// JPEG drops the alpha channel
    pub fn supports_alpha(self) -> bool {
        !matches!(self, ImageFormatHint::Jpeg)
    }

    fn image_format(self) -> ImageFormat {
        match self {
            ImageFormatHint::Png => ImageFormat::Png,
            ImageFormatHint::Jpeg => ImageFormat::Jpeg,
            ImageFormatHint::Bmp => ImageFormat::Bmp,
            ImageFormatHint::Gif => ImageFormat::Gif,
        }
    }
}

/// Decode any supported format into RGBA8
pub fn decode(bytes: &[u8]) -> Result<Bitmap, DecodeError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Bitmap::new(width, height, rgba.into_raw())?)
}

pub fn decode_file(path: &Path) -> Result<Bitmap, DecodeError> {
    let bytes = std::fs::read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bitmap = decode(&bytes)?;
    tracing::debug!(
        path = %path.display(),
        width = bitmap.width(),
        height = bitmap.height(),
        "Decoded image"
    );
    Ok(bitmap)
}

/// Encode a bitmap into an in-memory file of the given format
pub fn encode(bitmap: &Bitmap, format: ImageFormatHint) -> Result<Vec<u8>, EncodeError> {
    let rgba = RgbaImage::from_raw(bitmap.width(), bitmap.height(), bitmap.pixels().to_vec())
        .ok_or_else(|| {
            ImageError::Parameter(ParameterError::from_kind(
                ParameterErrorKind::DimensionMismatch,
            ))
        })?;

    let image = if format.supports_alpha() {
        DynamicImage::ImageRgba8(rgba)
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).to_rgb8())
    };

    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format.image_format())?;
    Ok(out.into_inner())
}

/// Write `bitmap` to `path` in the format its extension names
pub fn save_file(bitmap: &Bitmap, path: &Path) -> Result<ImageFormatHint, EncodeError> {
    let format = ImageFormatHint::from_path(path);
    let bytes = encode(bitmap, format)?;
    std::fs::write(path, &bytes).map_err(|source| EncodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(
        path = %path.display(),
        format = ?format,
        bytes = bytes.len(),
        "Saved image"
    );
    Ok(format)
}

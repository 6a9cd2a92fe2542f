use resampler::{resample, target_dimensions, Bitmap, FilterKind};

use crate::models::FitFilter;

/// Pixels ready to be drawn inside the viewport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FittedImage {
    pub width: u32,
    pub height: u32,
    /// RGBA8, row-major
    pub data: Vec<u8>,
}

impl FittedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Fits the displayed bitmap into the viewport, preserving aspect ratio.
///
/// Fitting is display-only and always uses a fast filter; the bitmap that
/// gets saved is never touched.
#[derive(Debug, Clone, Copy)]
pub struct ViewportPresenter {
    filter: FilterKind,
}

impl ViewportPresenter {
    pub fn new(filter: FitFilter) -> Self {
        Self {
            filter: filter.into(),
        }
    }

    /// Largest size with the image's aspect ratio that fits the frame.
    /// Images are scaled up as well as down.
    pub fn fitted_dimensions(width: u32, height: u32, frame_w: u32, frame_h: u32) -> (u32, u32) {
        let ratio = f64::min(
            frame_w.max(1) as f64 / width.max(1) as f64,
            frame_h.max(1) as f64 / height.max(1) as f64,
        );
        let (w, h) = target_dimensions(width, height, ratio);
        (w.min(frame_w.max(1)), h.min(frame_h.max(1)))
    }

    pub fn fit(&self, bitmap: &Bitmap, frame_w: u32, frame_h: u32) -> FittedImage {
        let (width, height) =
            Self::fitted_dimensions(bitmap.width(), bitmap.height(), frame_w, frame_h);

        let data = if (width, height) == bitmap.dimensions() {
            bitmap.pixels().to_vec()
        } else {
            resample(bitmap, width, height, self.filter).into_pixels()
        };

        FittedImage {
            width,
            height,
            data,
        }
    }
}

//! Resampling of [`Bitmap`]s to new dimensions.
//!
//! Nearest neighbour is a direct index mapping. The other filters run as two
//! separable passes (horizontal into an `f32` buffer, then vertical into
//! bytes) with weights precomputed once per axis. Kernel taps that fall
//! outside the source are clamped to the nearest edge pixel.
//!
//! All loops run in a fixed order on the calling thread, so the same inputs
//! always produce byte-identical output.

use std::convert::Infallible;
use std::ops::ControlFlow;

use crate::bitmap::{Bitmap, CHANNELS};
use crate::filter::FilterKind;

/// Progress of a running resample, in work rows.
///
/// Separable filters count every row of both passes
/// (`source height + target height`); nearest counts target rows only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowProgress {
    /// Rows finished so far
    pub done: u32,
    /// Total rows for this resample
    pub total: u32,
}

impl RowProgress {
    /// Completion as an integer percentage (0..=100).
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.done as u64 * 100) / self.total as u64).min(100) as u8
    }
}

/// Output dimensions for scaling `width x height` by `scale`.
///
/// Each axis is `max(1, round(len * scale))`, so the result is never empty.
///
/// ```
/// use resampler::target_dimensions;
///
/// assert_eq!(target_dimensions(100, 100, 1.25), (125, 125));
/// assert_eq!(target_dimensions(1, 1, 0.05), (1, 1));
/// ```
pub fn target_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    (scaled_len(width, scale), scaled_len(height, scale))
}

fn scaled_len(len: u32, scale: f64) -> u32 {
    // f64::max maps NaN to the other operand
    (len as f64 * scale).round().max(1.0).min(u32::MAX as f64) as u32
}

/// Resample `source` to exactly `width x height` pixels.
///
/// Zero target dimensions are raised to 1.
pub fn resample(source: &Bitmap, width: u32, height: u32, filter: FilterKind) -> Bitmap {
    match resample_with(source, width, height, filter, |_| {
        ControlFlow::<Infallible>::Continue(())
    }) {
        Ok(bitmap) => bitmap,
        Err(never) => match never {},
    }
}

/// Resample `source` by a uniform `scale` factor.
pub fn resample_scaled(source: &Bitmap, scale: f64, filter: FilterKind) -> Bitmap {
    let (width, height) = target_dimensions(source.width(), source.height(), scale);
    resample(source, width, height, filter)
}

/// Resample with a per-row checkpoint.
///
/// `on_row` is called after every finished row. Returning
/// [`ControlFlow::Break`] stops the work and the break value is returned as
/// `Err`; no partial bitmap is produced.
pub fn resample_with<B, F>(
    source: &Bitmap,
    width: u32,
    height: u32,
    filter: FilterKind,
    mut on_row: F,
) -> Result<Bitmap, B>
where
    F: FnMut(RowProgress) -> ControlFlow<B>,
{
    let width = width.max(1);
    let height = height.max(1);

    match filter {
        FilterKind::Nearest => nearest(source, width, height, &mut on_row),
        _ => separable(source, width, height, filter, &mut on_row),
    }
}

fn nearest<B, F>(source: &Bitmap, width: u32, height: u32, on_row: &mut F) -> Result<Bitmap, B>
where
    F: FnMut(RowProgress) -> ControlFlow<B>,
{
    let (src_w, src_h) = source.dimensions();
    let src = source.pixels();
    let row_bytes = src_w as usize * CHANNELS;

    let xs: Vec<usize> = (0..width)
        .map(|x| nearest_index(x, src_w, width) * CHANNELS)
        .collect();

    let mut out = Vec::with_capacity(width as usize * height as usize * CHANNELS);
    for y in 0..height {
        let row = &src[nearest_index(y, src_h, height) * row_bytes..][..row_bytes];
        for &sx in &xs {
            out.extend_from_slice(&row[sx..sx + CHANNELS]);
        }
        if let ControlFlow::Break(b) = on_row(RowProgress {
            done: y + 1,
            total: height,
        }) {
            return Err(b);
        }
    }

    Ok(Bitmap::from_parts(width, height, out))
}

/// `floor(dst * src_len / dst_len)` clamped to the last source index.
#[inline]
fn nearest_index(dst: u32, src_len: u32, dst_len: u32) -> usize {
    let i = (dst as u64 * src_len as u64) / dst_len as u64;
    i.min(src_len as u64 - 1) as usize
}

/// Precomputed contributions for one axis: `taps` entries per output sample.
struct AxisWeights {
    taps: usize,
    indices: Vec<usize>,
    weights: Vec<f32>,
}

impl AxisWeights {
    fn new(src_len: u32, dst_len: u32, filter: FilterKind) -> Self {
        let radius = filter.radius() as i64;
        let taps = filter.taps();
        let scale = dst_len as f64 / src_len as f64;
        let last = src_len as i64 - 1;

        let mut indices = Vec::with_capacity(dst_len as usize * taps);
        let mut weights = Vec::with_capacity(dst_len as usize * taps);

        for dst in 0..dst_len {
            let center = (dst as f64 + 0.5) / scale - 0.5;
            let first = center.floor() as i64 - radius + 1;
            let start = weights.len();
            let mut sum = 0.0f32;

            for k in 0..taps as i64 {
                let i = first + k;
                let w = filter.kernel((center - i as f64) as f32);
                indices.push(i.clamp(0, last) as usize);
                weights.push(w);
                sum += w;
            }

            if sum.abs() > f32::EPSILON {
                for w in &mut weights[start..] {
                    *w /= sum;
                }
            }
        }

        Self {
            taps,
            indices,
            weights,
        }
    }

    #[inline]
    fn contributions(&self, dst: usize) -> impl Iterator<Item = (usize, f32)> + '_ {
        let range = dst * self.taps..(dst + 1) * self.taps;
        self.indices[range.clone()]
            .iter()
            .copied()
            .zip(self.weights[range].iter().copied())
    }
}

fn separable<B, F>(
    source: &Bitmap,
    width: u32,
    height: u32,
    filter: FilterKind,
    on_row: &mut F,
) -> Result<Bitmap, B>
where
    F: FnMut(RowProgress) -> ControlFlow<B>,
{
    let (src_w, src_h) = source.dimensions();
    let src = source.pixels();
    let total = src_h + height;

    let horizontal = AxisWeights::new(src_w, width, filter);
    let vertical = AxisWeights::new(src_h, height, filter);

    let dst_w = width as usize;
    let src_row_bytes = src_w as usize * CHANNELS;
    let mid_row_len = dst_w * CHANNELS;

    // Pass 1: source rows -> intermediate rows of target width
    let mut mid = vec![0.0f32; src_h as usize * mid_row_len];
    for y in 0..src_h as usize {
        let src_row = &src[y * src_row_bytes..][..src_row_bytes];
        let mid_row = &mut mid[y * mid_row_len..][..mid_row_len];
        for x in 0..dst_w {
            let mut acc = [0.0f32; CHANNELS];
            for (sx, w) in horizontal.contributions(x) {
                let p = &src_row[sx * CHANNELS..sx * CHANNELS + CHANNELS];
                for (a, &v) in acc.iter_mut().zip(p) {
                    *a += v as f32 * w;
                }
            }
            mid_row[x * CHANNELS..x * CHANNELS + CHANNELS].copy_from_slice(&acc);
        }
        if let ControlFlow::Break(b) = on_row(RowProgress {
            done: y as u32 + 1,
            total,
        }) {
            return Err(b);
        }
    }

    // Pass 2: intermediate columns -> output rows
    let mut out = vec![0u8; dst_w * height as usize * CHANNELS];
    for y in 0..height as usize {
        let out_row = &mut out[y * mid_row_len..][..mid_row_len];
        let mut acc = vec![0.0f32; mid_row_len];
        for (sy, w) in vertical.contributions(y) {
            let mid_row = &mid[sy * mid_row_len..][..mid_row_len];
            for (a, &m) in acc.iter_mut().zip(mid_row) {
                *a += m * w;
            }
        }
        for (o, a) in out_row.iter_mut().zip(&acc) {
            *o = a.round().clamp(0.0, 255.0) as u8;
        }
        if let ControlFlow::Break(b) = on_row(RowProgress {
            done: src_h + y as u32 + 1,
            total,
        }) {
            return Err(b);
        }
    }

    Ok(Bitmap::from_parts(width, height, out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> Bitmap {
        Bitmap::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                [255, 255, 255, 255]
            } else {
                [0, 0, 0, 255]
            }
        })
        .unwrap()
    }

    #[test]
    fn test_target_dimensions_rounds() {
        assert_eq!(target_dimensions(100, 100, 1.25), (125, 125));
        assert_eq!(target_dimensions(100, 50, 0.05), (5, 3));
        assert_eq!(target_dimensions(3, 3, 0.5), (2, 2));
    }

    #[test]
    fn test_target_dimensions_never_zero() {
        assert_eq!(target_dimensions(1, 1, 0.05), (1, 1));
        assert_eq!(target_dimensions(5, 9, 0.0), (1, 1));
        assert_eq!(target_dimensions(5, 9, f64::NAN), (1, 1));
    }

    #[test]
    fn test_nearest_upscale_duplicates_pixels() {
        let source = Bitmap::from_fn(2, 1, |x, _| [x as u8 * 100, 0, 0, 255]).unwrap();
        let out = resample(&source, 4, 1, FilterKind::Nearest);
        let reds: Vec<u8> = (0..4).map(|x| out.pixel(x, 0)[0]).collect();
        assert_eq!(reds, vec![0, 0, 100, 100]);
    }

    #[test]
    fn test_nearest_downscale_uses_floor() {
        let source = Bitmap::from_fn(4, 1, |x, _| [x as u8, 0, 0, 255]).unwrap();
        let out = resample(&source, 2, 1, FilterKind::Nearest);
        assert_eq!(out.pixel(0, 0)[0], 0);
        assert_eq!(out.pixel(1, 0)[0], 2);
    }

    #[test]
    fn test_zero_target_is_raised_to_one() {
        let source = checker(4, 4);
        let out = resample(&source, 0, 0, FilterKind::Bilinear);
        assert_eq!(out.dimensions(), (1, 1));
    }

    #[test]
    fn test_bilinear_midpoint_between_two_pixels() {
        // Upscaling 2 -> 4: output x=1 samples source position 0.25
        let source = Bitmap::from_fn(2, 1, |x, _| [x as u8 * 200, 0, 0, 255]).unwrap();
        let out = resample(&source, 4, 1, FilterKind::Bilinear);
        assert_eq!(out.pixel(0, 0)[0], 0); // clamped edge at -0.25
        assert_eq!(out.pixel(1, 0)[0], 50);
        assert_eq!(out.pixel(2, 0)[0], 150);
        assert_eq!(out.pixel(3, 0)[0], 200);
    }

    #[test]
    fn test_alpha_is_resampled_like_color() {
        let source = Bitmap::from_fn(2, 1, |x, _| {
            if x == 0 {
                [255, 0, 0, 0]
            } else {
                [0, 0, 255, 255]
            }
        })
        .unwrap();
        let out = resample(&source, 4, 1, FilterKind::Bilinear);
        // No premultiplication: red bleeds through even where alpha is low
        assert_eq!(out.pixel(1, 0), [191, 0, 64, 64]);
    }

    #[test]
    fn test_resample_with_breaks_early() {
        let source = checker(16, 16);
        let mut seen = 0;
        let result = resample_with(&source, 32, 32, FilterKind::Bicubic, |progress| {
            seen += 1;
            if progress.done == 4 {
                ControlFlow::Break("stop")
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(result.unwrap_err(), "stop");
        assert_eq!(seen, 4);
    }

    #[test]
    fn test_resample_with_reports_every_row() {
        let source = checker(10, 6);
        let mut last = None;
        let mut calls = 0;
        let out = resample_with(&source, 5, 3, FilterKind::Lanczos, |progress| {
            calls += 1;
            last = Some(progress);
            ControlFlow::<()>::Continue(())
        })
        .unwrap();
        assert_eq!(out.dimensions(), (5, 3));
        assert_eq!(calls, 6 + 3);
        assert_eq!(last.unwrap().percent(), 100);
    }

    #[test]
    fn test_row_progress_percent() {
        assert_eq!(RowProgress { done: 1, total: 4 }.percent(), 25);
        assert_eq!(RowProgress { done: 0, total: 0 }.percent(), 100);
    }

    #[test]
    fn test_source_is_not_mutated() {
        let source = checker(7, 5);
        let copy = source.clone();
        for filter in FilterKind::ALL {
            let _ = resample_scaled(&source, 2.35, filter);
        }
        assert_eq!(source, copy);
    }
}

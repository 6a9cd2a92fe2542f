//! resampler: deterministic RGBA8 image resampling
//!
//! This crate owns the pixel math of the viewer: an immutable [`Bitmap`]
//! type and a pure [`resample`] function that maps a bitmap to new
//! dimensions with one of four [`FilterKind`]s.
//!
//! # Quick Start
//!
//! ```
//! use resampler::{resample_scaled, Bitmap, FilterKind};
//!
//! let source = Bitmap::filled(100, 100, [40, 80, 120, 255]).unwrap();
//! let scaled = resample_scaled(&source, 1.25, FilterKind::Bicubic);
//!
//! assert_eq!(scaled.dimensions(), (125, 125));
//! ```
//!
//! # Filters
//!
//! | Filter | Kernel | Taps per axis |
//! |--------|--------|---------------|
//! | [`FilterKind::Nearest`] | point sample at `floor(x / scale)` | 1 |
//! | [`FilterKind::Bilinear`] | triangle | 2 |
//! | [`FilterKind::Bicubic`] | Keys cubic convolution, `a = -0.5` | 4 |
//! | [`FilterKind::Lanczos`] | windowed sinc, `a = 3` | 6 |
//!
//! Separable filters place each output sample at source position
//! `(dst + 0.5) / scale - 0.5` and clamp taps to the image edge, so borders
//! are replicated rather than wrapped. The tap count does not grow when
//! downscaling; strong reductions alias the same way a fixed-support
//! convolution would.
//!
//! # Alpha
//!
//! Alpha is resampled as a fourth independent channel. Colors are not
//! premultiplied, so fully transparent pixels still contribute their RGB to
//! neighbours. This shows as colored fringes along hard transparent edges
//! and is a known limitation.
//!
//! # Cancellation
//!
//! [`resample_with`] takes a per-row callback that can stop the work early.
//! Callers running the resample on a worker thread use it as a cancellation
//! checkpoint.

pub mod bitmap;
pub mod error;
pub mod filter;
pub mod resample;


pub use bitmap::{Bitmap, CHANNELS};
pub use error::{BitmapError, ParseFilterError};
pub use filter::FilterKind;
pub use resample::{resample, resample_scaled, resample_with, target_dimensions, RowProgress};

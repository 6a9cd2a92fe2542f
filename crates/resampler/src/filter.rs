//! Resampling filters and their kernel functions.

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseFilterError;

/// Resampling filter selectable by the user.
///
/// Every filter except [`FilterKind::Nearest`] is applied separably with a
/// fixed number of taps per axis (see [`FilterKind::taps`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterKind {
    /// Point sampling, no interpolation
    Nearest,
    /// Triangle kernel, 2 taps
    Bilinear,
    /// Keys cubic convolution with `a = -0.5`, 4 taps (default)
    #[default]
    Bicubic,
    /// Sinc windowed by sinc with `a = 3`, 6 taps
    Lanczos,
}

/// Free parameter of the cubic convolution kernel.
pub const CUBIC_A: f32 = -0.5;

/// Lobe count of the Lanczos window.
pub const LANCZOS_A: f32 = 3.0;

impl FilterKind {
    /// All filters in menu order.
    pub const ALL: [FilterKind; 4] = [
        FilterKind::Nearest,
        FilterKind::Bilinear,
        FilterKind::Bicubic,
        FilterKind::Lanczos,
    ];

    /// Lowercase name used in config files and the console.
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Nearest => "nearest",
            FilterKind::Bilinear => "bilinear",
            FilterKind::Bicubic => "bicubic",
            FilterKind::Lanczos => "lanczos",
        }
    }

    /// Kernel radius in source pixels. Zero for nearest neighbour.
    pub fn radius(self) -> usize {
        match self {
            FilterKind::Nearest => 0,
            FilterKind::Bilinear => 1,
            FilterKind::Bicubic => 2,
            FilterKind::Lanczos => 3,
        }
    }

    /// Number of source samples combined per output sample on each axis.
    pub fn taps(self) -> usize {
        match self {
            FilterKind::Nearest => 1,
            other => other.radius() * 2,
        }
    }

    /// Evaluate the kernel at distance `x` (in source pixels).
    ///
    /// Nearest has no kernel; it is treated as a box of width 1.
    #[inline]
    pub fn kernel(self, x: f32) -> f32 {
        match self {
            FilterKind::Nearest => {
                if x.abs() < 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            FilterKind::Bilinear => triangle(x),
            FilterKind::Bicubic => cubic(x),
            FilterKind::Lanczos => lanczos(x),
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        FilterKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseFilterError::new(trimmed))
    }
}

#[inline]
fn triangle(x: f32) -> f32 {
    let x = x.abs();
    if x < 1.0 {
        1.0 - x
    } else {
        0.0
    }
}

/// Keys cubic convolution kernel. Support is [-2, 2].
#[inline]
fn cubic(x: f32) -> f32 {
    let a = CUBIC_A;
    let x = x.abs();
    if x < 1.0 {
        ((a + 2.0) * x - (a + 3.0)) * x * x + 1.0
    } else if x < 2.0 {
        ((a * x - 5.0 * a) * x + 8.0 * a) * x - 4.0 * a
    } else {
        0.0
    }
}

#[inline]
fn lanczos(x: f32) -> f32 {
    if x.abs() < 1e-8 {
        1.0
    } else if x.abs() >= LANCZOS_A {
        0.0
    } else {
        let pi_x = PI * x;
        let pi_x_a = pi_x / LANCZOS_A;
        (pi_x.sin() / pi_x) * (pi_x_a.sin() / pi_x_a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Lanczos".parse::<FilterKind>().unwrap(), FilterKind::Lanczos);
        assert_eq!(" BICUBIC ".parse::<FilterKind>().unwrap(), FilterKind::Bicubic);
        assert_eq!("nearest".parse::<FilterKind>().unwrap(), FilterKind::Nearest);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "mitchell".parse::<FilterKind>().unwrap_err();
        assert_eq!(err.name(), "mitchell");
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for kind in FilterKind::ALL {
            assert_eq!(kind.to_string().parse::<FilterKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_default_is_bicubic() {
        assert_eq!(FilterKind::default(), FilterKind::Bicubic);
    }

    #[test]
    fn test_tap_counts() {
        assert_eq!(FilterKind::Nearest.taps(), 1);
        assert_eq!(FilterKind::Bilinear.taps(), 2);
        assert_eq!(FilterKind::Bicubic.taps(), 4);
        assert_eq!(FilterKind::Lanczos.taps(), 6);
    }

    #[test]
    fn test_kernels_interpolate_at_integers() {
        for kind in [FilterKind::Bilinear, FilterKind::Bicubic, FilterKind::Lanczos] {
            assert!((kind.kernel(0.0) - 1.0).abs() < 1e-6, "{kind} at 0");
            for k in 1..=3 {
                let v = kind.kernel(k as f32);
                assert!(v.abs() < 1e-6, "{kind} at {k} was {v}");
            }
        }
    }

    #[test]
    fn test_cubic_has_negative_lobe() {
        assert!(cubic(1.5) < 0.0);
        assert_eq!(cubic(2.0), 0.0);
    }

    #[test]
    fn test_lanczos_is_symmetric() {
        for x in [0.25f32, 0.5, 1.3, 2.7] {
            assert!((lanczos(x) - lanczos(-x)).abs() < 1e-7);
        }
    }
}

use std::fmt;

/// Smallest allowed scale factor (5%).
pub const MIN_SCALE: f64 = 0.05;

/// Largest allowed scale factor (300%).
pub const MAX_SCALE: f64 = 3.0;

/// Granularity of user scale steps (5%).
pub const SCALE_GRID: f64 = 0.05;

/// Tolerance used when comparing against the bounds.
const BOUND_EPSILON: f64 = 1e-9;

/// Uniform scale factor, always within `[MIN_SCALE, MAX_SCALE]`.
///
/// The type only clamps; the step size is the controller's business.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    /// 100%
    pub const ONE: Self = Self(1.0);

    /// Create a scale factor, clamping into range. NaN becomes 1.0.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ONE;
        }
        Self(value.clamp(MIN_SCALE, MAX_SCALE))
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Add `delta`, round to hundredths and clamp.
    ///
    /// Rounding keeps repeated `±0.05` steps on the grid instead of
    /// accumulating binary floating point error.
    pub fn step(self, delta: f64) -> Self {
        Self::new(((self.0 + delta) * 100.0).round() / 100.0)
    }

    pub fn is_min(self) -> bool {
        self.0 <= MIN_SCALE + BOUND_EPSILON
    }

    pub fn is_max(self) -> bool {
        self.0 >= MAX_SCALE - BOUND_EPSILON
    }

    /// True when the scaled image is larger than the original.
    pub fn is_upscale(self) -> bool {
        self.0 > 1.0 + BOUND_EPSILON
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}x", self.0)
    }
}

//! Test fixtures: bitmaps and configurations.

use resampler::Bitmap;
use scaler::models::AppConfig;

/// Horizontal and vertical gradient, opaque
pub fn gradient(width: u32, height: u32) -> Bitmap {
    Bitmap::from_fn(width, height, |x, y| {
        [
            (x * 255 / (width - 1).max(1)) as u8,
            (y * 255 / (height - 1).max(1)) as u8,
            128,
            255,
        ]
    })
    .expect("valid fixture dimensions")
}

pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Bitmap {
    Bitmap::filled(width, height, rgba).expect("valid fixture dimensions")
}

/// Defaults, but with instant progress ticks
pub fn fast_config() -> AppConfig {
    AppConfig {
        tick_delay_ms: 0,
        progress_ticks: 3,
        ..AppConfig::default()
    }
}

/// Ticks slow enough that a test can act while a task is still running
pub fn slow_config() -> AppConfig {
    AppConfig {
        tick_delay_ms: 40,
        progress_ticks: 10,
        ..AppConfig::default()
    }
}

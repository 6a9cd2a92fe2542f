use std::path::PathBuf;

use resampler::BitmapError;
use thiserror::Error;

/// Failure to turn a file or byte buffer into a bitmap.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported or corrupt image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid bitmap: {0}")]
    Bitmap(#[from] BitmapError),
}

/// Failure to export the displayed bitmap.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Nothing to save")]
    NothingToSave,

    #[error("A resize is still in progress")]
    ResizeInProgress,

    #[error("Cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Encode error: {0}")]
    Image(#[from] image::ImageError),
}

/// Failure of a background resize. Cancellation is not a failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskFailure {
    #[error("Resampling panicked: {0}")]
    Panicked(String),

    #[error("Output {width}x{height} exceeds the limit of {max} pixels")]
    OutputTooLarge { width: u32, height: u32, max: u64 },

    #[error("Resize worker failed: {0}")]
    Join(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid scale_step {0}: must be a positive multiple of 0.05")]
    InvalidScaleStep(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_error_nothing_to_save() {
        assert_eq!(EncodeError::NothingToSave.to_string(), "Nothing to save");
    }

    #[test]
    fn test_encode_error_resize_in_progress() {
        assert_eq!(
            EncodeError::ResizeInProgress.to_string(),
            "A resize is still in progress"
        );
    }

    #[test]
    fn test_decode_error_io_names_path() {
        let error = DecodeError::Io {
            path: PathBuf::from("/tmp/missing.png"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(error.to_string(), "Cannot read /tmp/missing.png: not found");
    }

    #[test]
    fn test_decode_error_from_bitmap_error() {
        let error: DecodeError = BitmapError::ZeroDimension {
            width: 0,
            height: 0,
        }
        .into();
        match error {
            DecodeError::Bitmap(_) => {}
            _ => panic!("Expected Bitmap variant"),
        }
    }

    #[test]
    fn test_task_failure_output_too_large() {
        let error = TaskFailure::OutputTooLarge {
            width: 30000,
            height: 30000,
            max: 100_000_000,
        };
        assert_eq!(
            error.to_string(),
            "Output 30000x30000 exceeds the limit of 100000000 pixels"
        );
    }

    #[test]
    fn test_config_error_invalid_scale_step() {
        assert_eq!(
            ConfigError::InvalidScaleStep(0.03).to_string(),
            "Invalid scale_step 0.03: must be a positive multiple of 0.05"
        );
    }

    #[test]
    fn test_task_failure_panicked() {
        let error = TaskFailure::Panicked("boom".to_string());
        assert_eq!(error.to_string(), "Resampling panicked: boom");
    }
}

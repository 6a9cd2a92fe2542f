//! Events the controller emits towards the user interface.

use std::fmt;

use resampler::FilterKind;

use super::ScaleFactor;
use crate::services::presenter::FittedImage;

/// Which user operation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Load,
    Save,
    Resize,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Load => "load",
            ErrorKind::Save => "save",
            ErrorKind::Resize => "resize",
        };
        f.write_str(name)
    }
}

/// Enabled state of the four user controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub load: bool,
    pub scale_up: bool,
    pub scale_down: bool,
    pub save: bool,
}

/// Size readout shown next to the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageInfo {
    pub scale: ScaleFactor,
    pub filter: FilterKind,
    /// Size of the loaded image
    pub original: (u32, u32),
    /// Size of the displayed (resampled) image
    pub scaled: (u32, u32),
    /// Size after fitting into the viewport
    pub in_frame: (u32, u32),
}

impl ImageInfo {
    /// The filter notice is only relevant when enlarging.
    pub fn upscaled(&self) -> bool {
        self.scale.is_upscale()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// Progress of the latest request, 0..=100
    Progress(u8),
    /// The displayed image, fitted to the viewport
    ImageReady(FittedImage),
    Info(ImageInfo),
    Error { kind: ErrorKind, message: String },
    ControlsEnabled(Controls),
}

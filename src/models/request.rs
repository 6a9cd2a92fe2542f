use std::fmt;
use std::sync::Arc;

use resampler::{target_dimensions, Bitmap, FilterKind};

use super::ScaleFactor;

/// Freshness token for a resize request. Strictly increasing per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The id after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything a background resize needs, captured at submission time.
#[derive(Debug, Clone)]
pub struct ResizeRequest {
    pub id: RequestId,
    /// Shared read-only with the controller
    pub source: Arc<Bitmap>,
    pub scale: ScaleFactor,
    pub filter: FilterKind,
}

impl ResizeRequest {
    /// Output size of this request.
    pub fn target_dimensions(&self) -> (u32, u32) {
        target_dimensions(self.source.width(), self.source.height(), self.scale.value())
    }
}

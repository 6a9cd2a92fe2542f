pub mod config;
pub mod events;
pub mod request;
pub mod scale;

pub use config::{AppConfig, FitFilter, ViewportConfig};
pub use events::{Controls, ErrorKind, ImageInfo, ViewEvent};
pub use request::{RequestId, ResizeRequest};
pub use scale::{ScaleFactor, MAX_SCALE, MIN_SCALE, SCALE_GRID};

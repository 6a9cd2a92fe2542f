pub mod codec;
pub mod controller;
pub mod executor;
pub mod presenter;
pub mod resize_task;

pub use codec::ImageFormatHint;
pub use controller::{ControllerState, ScaleController};
pub use executor::{ResizeExecutor, ResizeScheduler};
pub use presenter::{FittedImage, ViewportPresenter};
pub use resize_task::{ResizeTask, TaskEvent, TaskEventKind, TaskHandle, TaskSettings, TaskState};

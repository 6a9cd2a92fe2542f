//! Assertion helpers for tests.

use pretty_assertions::assert_eq;
use scaler::models::{ErrorKind, ViewEvent};
use scaler::services::{ControllerState, ResizeScheduler, ScaleController};

/// Assert the displayed bitmap has the given size
pub fn assert_displayed<S: ResizeScheduler>(controller: &ScaleController<S>, expected: (u32, u32)) {
    let displayed = controller
        .displayed()
        .unwrap_or_else(|| panic!("Expected a displayed image of {:?}, got none", expected));
    assert_eq!(displayed.dimensions(), expected, "Displayed image size");
}

pub fn assert_state<S: ResizeScheduler>(controller: &ScaleController<S>, expected: ControllerState) {
    assert_eq!(controller.state(), expected, "Controller state");
}

/// Assert an error event of `kind` was emitted
pub fn assert_error_event(events: &[ViewEvent], kind: ErrorKind) {
    assert!(
        events
            .iter()
            .any(|e| matches!(e, ViewEvent::Error { kind: k, .. } if *k == kind)),
        "Expected {} error event, got {:?}",
        kind,
        events
    );
}

/// Progress values in order of emission
pub fn progress_values(events: &[ViewEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            ViewEvent::Progress(p) => Some(*p),
            _ => None,
        })
        .collect()
}

/// Sizes of every ImageReady event
pub fn image_ready_sizes(events: &[ViewEvent]) -> Vec<(u32, u32)> {
    events
        .iter()
        .filter_map(|e| match e {
            ViewEvent::ImageReady(image) => Some(image.dimensions()),
            _ => None,
        })
        .collect()
}

use std::path::Path;
use std::sync::Arc;

use resampler::{Bitmap, FilterKind};

use super::codec;
use super::executor::{ResizeExecutor, ResizeScheduler};
use super::presenter::ViewportPresenter;
use super::resize_task::{TaskEvent, TaskEventKind};
use crate::error::{DecodeError, EncodeError};
use crate::models::{
    AppConfig, Controls, ErrorKind, ImageInfo, RequestId, ResizeRequest, ScaleFactor, ViewEvent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// No image loaded
    Idle,
    /// Image loaded, no resize outstanding
    Ready,
    /// A resize for `latest_request` is outstanding
    Resizing,
}

/// Settings a resize was requested with
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rendition {
    id: RequestId,
    scale: ScaleFactor,
    filter: FilterKind,
}

/// An installed result and the settings that produced it
struct Displayed {
    bitmap: Arc<Bitmap>,
    rendition: Rendition,
}

/// Owns the viewer state: the loaded image, the desired scale and filter,
/// and the displayed result.
///
/// Every user action that changes the desired output bumps the request id
/// and supersedes the running task. A finished task is installed only if
/// its id still equals the latest one, so late results from superseded
/// requests can never overwrite a newer image.
///
/// All methods take `&mut self` and are meant to be called from a single
/// task. Events for the user interface accumulate in an outbox drained with
/// [`ScaleController::take_events`].
pub struct ScaleController<S: ResizeScheduler = ResizeExecutor> {
    scheduler: S,
    presenter: ViewportPresenter,
    default_filter: FilterKind,
    scale_step: f64,

    original: Option<Arc<Bitmap>>,
    scale: ScaleFactor,
    filter: FilterKind,
    latest_request: RequestId,
    outstanding: Option<Rendition>,
    displayed: Option<Displayed>,
    viewport: (u32, u32),

    events: Vec<ViewEvent>,
    last_controls: Option<Controls>,
}

impl ScaleController<ResizeExecutor> {
    /// Controller backed by a [`ResizeExecutor`] built from `config`
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config, ResizeExecutor::new(config.task_settings()))
    }
}

impl<S: ResizeScheduler> ScaleController<S> {
    pub fn new(config: &AppConfig, scheduler: S) -> Self {
        let mut controller = Self {
            scheduler,
            presenter: ViewportPresenter::new(config.fit_filter),
            default_filter: config.default_filter,
            scale_step: config.scale_step,
            original: None,
            scale: ScaleFactor::ONE,
            filter: config.default_filter,
            latest_request: RequestId::default(),
            outstanding: None,
            displayed: None,
            viewport: (config.viewport.width, config.viewport.height),
            events: Vec::new(),
            last_controls: None,
        };
        controller.emit_controls();
        controller
    }

    pub fn state(&self) -> ControllerState {
        if self.original.is_none() {
            ControllerState::Idle
        } else if self.outstanding.is_some() {
            ControllerState::Resizing
        } else {
            ControllerState::Ready
        }
    }

    pub fn scale(&self) -> ScaleFactor {
        self.scale
    }

    pub fn filter(&self) -> FilterKind {
        self.filter
    }

    pub fn original(&self) -> Option<&Arc<Bitmap>> {
        self.original.as_ref()
    }

    /// The last installed result, the one `save` writes
    pub fn displayed(&self) -> Option<&Arc<Bitmap>> {
        self.displayed.as_ref().map(|d| &d.bitmap)
    }

    pub fn latest_request(&self) -> RequestId {
        self.latest_request
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Replace the image and start over at 1.0 with the default filter.
    /// Allowed in any state; an outstanding resize is superseded.
    pub fn load(&mut self, bitmap: impl Into<Arc<Bitmap>>) {
        let bitmap = bitmap.into();
        tracing::info!(
            width = bitmap.width(),
            height = bitmap.height(),
            "Image loaded"
        );

        self.original = Some(bitmap);
        self.scale = ScaleFactor::ONE;
        self.filter = self.default_filter;
        self.displayed = None;
        self.submit();
    }

    /// Decode `path` and load it. On failure the current image stays.
    pub fn load_path(&mut self, path: &Path) -> Result<(), DecodeError> {
        match codec::decode_file(path) {
            Ok(bitmap) => {
                self.load(bitmap);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load image");
                self.emit_error(ErrorKind::Load, &e);
                Err(e)
            }
        }
    }

    /// Change the scale by `delta`. Returns false when nothing changed.
    pub fn set_scale(&mut self, delta: f64) -> bool {
        if self.original.is_none() {
            return false;
        }
        let scale = self.scale.step(delta);
        if scale == self.scale {
            return false;
        }
        self.scale = scale;
        self.submit();
        true
    }

    pub fn scale_up(&mut self) -> bool {
        self.set_scale(self.scale_step)
    }

    pub fn scale_down(&mut self) -> bool {
        self.set_scale(-self.scale_step)
    }

    /// Change the filter. Returns false when nothing changed.
    pub fn set_filter(&mut self, filter: FilterKind) -> bool {
        if self.original.is_none() || filter == self.filter {
            return false;
        }
        self.filter = filter;
        self.submit();
        true
    }

    /// Write the displayed result to `path`, format chosen by extension
    pub fn save(&mut self, path: &Path) -> Result<(), EncodeError> {
        let result = match (&self.displayed, self.state()) {
            (None, _) => Err(EncodeError::NothingToSave),
            (Some(_), ControllerState::Resizing) => Err(EncodeError::ResizeInProgress),
            (Some(displayed), _) => codec::save_file(&displayed.bitmap, path).map(|_| ()),
        };

        if let Err(e) = &result {
            tracing::warn!(path = %path.display(), error = %e, "Failed to save image");
            self.emit_error(ErrorKind::Save, e);
        }
        result
    }

    /// Store a new frame size and re-fit the displayed image
    pub fn resize_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        if self.displayed.is_some() {
            self.emit_image();
        }
    }

    pub fn handle_task_event(&mut self, event: TaskEvent) {
        let TaskEvent { id, kind } = event;
        match kind {
            TaskEventKind::Progress(percent) => {
                if id == self.latest_request {
                    self.events.push(ViewEvent::Progress(percent));
                }
            }
            TaskEventKind::Completed(bitmap) => {
                if id != self.latest_request {
                    tracing::debug!(request_id = %id, latest = %self.latest_request, "Discarding stale result");
                    return;
                }
                let Some(rendition) = self.outstanding.filter(|r| r.id == id) else {
                    tracing::debug!(request_id = %id, "Discarding result that is no longer outstanding");
                    return;
                };
                self.outstanding = None;
                self.displayed = Some(Displayed { bitmap, rendition });
                self.emit_image();
                self.emit_controls();
            }
            TaskEventKind::Failed(failure) => {
                if self.outstanding.map(|r| r.id) != Some(id) {
                    tracing::debug!(request_id = %id, error = %failure, "Ignoring failure of superseded request");
                    return;
                }
                tracing::warn!(request_id = %id, error = %failure, "Resize failed");
                self.outstanding = None;
                self.emit_error(ErrorKind::Resize, &failure);
                self.emit_controls();
            }
            TaskEventKind::Cancelled => {
                if self.outstanding.map(|r| r.id) != Some(id) {
                    tracing::debug!(request_id = %id, "Superseded request cancelled");
                    return;
                }
                self.outstanding = None;
                self.emit_controls();
            }
        }
    }

    /// Next event from the scheduler. Cancel safe.
    pub async fn next_task_event(&mut self) -> Option<TaskEvent> {
        self.scheduler.next_event().await
    }

    /// Wait for one task event and apply it. Returns false if the scheduler
    /// has no more events.
    pub async fn pump(&mut self) -> bool {
        match self.next_task_event().await {
            Some(event) => {
                self.handle_task_event(event);
                true
            }
            None => false,
        }
    }

    /// Apply task events until no resize is outstanding
    pub async fn settle(&mut self) {
        while self.outstanding.is_some() {
            if !self.pump().await {
                break;
            }
        }
    }

    /// Drain the events emitted since the last call
    pub fn take_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }

    /// Which user actions are currently allowed
    pub fn controls(&self) -> Controls {
        let loaded = self.original.is_some();
        let busy = self.outstanding.is_some();
        Controls {
            load: true,
            scale_up: loaded && !busy && !self.scale.is_max(),
            scale_down: loaded && !busy && !self.scale.is_min(),
            save: self.displayed.is_some() && !busy,
        }
    }

    /// Size readout for the displayed image.
    ///
    /// Scale and filter are those the displayed image was produced with,
    /// not the pending request's.
    pub fn info(&self) -> Option<ImageInfo> {
        let original = self.original.as_ref()?;
        let Displayed { bitmap, rendition } = self.displayed.as_ref()?;
        let (fw, fh) = self.viewport;
        Some(ImageInfo {
            scale: rendition.scale,
            filter: rendition.filter,
            original: original.dimensions(),
            scaled: bitmap.dimensions(),
            in_frame: ViewportPresenter::fitted_dimensions(
                bitmap.width(),
                bitmap.height(),
                fw,
                fh,
            ),
        })
    }

    fn submit(&mut self) {
        let Some(source) = self.original.clone() else {
            return;
        };
        self.latest_request = self.latest_request.next();
        let request = ResizeRequest {
            id: self.latest_request,
            source,
            scale: self.scale,
            filter: self.filter,
        };
        tracing::debug!(
            request_id = %request.id,
            scale = %request.scale,
            filter = %request.filter,
            "Requesting resize"
        );
        self.outstanding = Some(Rendition {
            id: request.id,
            scale: request.scale,
            filter: request.filter,
        });
        self.scheduler.submit(request);
        self.emit_controls();
    }

    fn emit_image(&mut self) {
        let Some(displayed) = self.displayed.as_ref() else {
            return;
        };
        let (fw, fh) = self.viewport;
        let fitted = self.presenter.fit(&displayed.bitmap, fw, fh);
        self.events.push(ViewEvent::ImageReady(fitted));
        if let Some(info) = self.info() {
            self.events.push(ViewEvent::Info(info));
        }
    }

    fn emit_error(&mut self, kind: ErrorKind, error: &dyn std::error::Error) {
        self.events.push(ViewEvent::Error {
            kind,
            message: error.to_string(),
        });
    }

    fn emit_controls(&mut self) {
        let controls = self.controls();
        if self.last_controls != Some(controls) {
            self.last_controls = Some(controls);
            self.events.push(ViewEvent::ControlsEnabled(controls));
        }
    }
}

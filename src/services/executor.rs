use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Semaphore};

use super::resize_task::{ResizeTask, TaskEvent, TaskHandle, TaskSettings};
use crate::models::ResizeRequest;

/// Seam between the controller and whatever runs its resize requests
#[async_trait]
pub trait ResizeScheduler: Send {
    /// Start a resize, cancelling whatever was running before
    fn submit(&mut self, request: ResizeRequest);

    /// Request cancellation of the current task, if any
    fn cancel(&mut self);

    /// Next event from any task this scheduler has started.
    ///
    /// Returns `None` when no further events can arrive.
    async fn next_event(&mut self) -> Option<TaskEvent>;
}

/// Single-slot executor: at most one resize computes at a time and a new
/// submission cancels the one before it.
///
/// A superseded task may still be winding down when its successor is
/// spawned. The successor waits on the shared slot, so the two never compute
/// concurrently.
pub struct ResizeExecutor {
    settings: TaskSettings,
    gate: Arc<Semaphore>,
    current: Option<TaskHandle>,
    events_tx: mpsc::UnboundedSender<TaskEvent>,
    events_rx: mpsc::UnboundedReceiver<TaskEvent>,
}

impl ResizeExecutor {
    pub fn new(settings: TaskSettings) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            settings,
            gate: Arc::new(Semaphore::new(1)),
            current: None,
            events_tx,
            events_rx,
        }
    }

    /// Handle of the most recently submitted task that has not finished
    pub fn current(&self) -> Option<&TaskHandle> {
        self.current.as_ref()
    }
}

#[async_trait]
impl ResizeScheduler for ResizeExecutor {
    fn submit(&mut self, request: ResizeRequest) {
        self.cancel();
        tracing::debug!(request_id = %request.id, scale = %request.scale, "Submitting resize");
        let handle = ResizeTask::spawn(
            request,
            self.settings.clone(),
            self.gate.clone(),
            self.events_tx.clone(),
        );
        self.current = Some(handle);
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.current.take() {
            if !handle.state().is_terminal() {
                tracing::debug!(request_id = %handle.id(), "Cancelling resize");
            }
            handle.cancel();
        }
    }

    async fn next_event(&mut self) -> Option<TaskEvent> {
        // events_tx lives in self, so recv only yields None after close
        let event = self.events_rx.recv().await?;
        if event.is_terminal() && self.current.as_ref().map(TaskHandle::id) == Some(event.id) {
            self.current = None;
        }
        Some(event)
    }
}

impl Drop for ResizeExecutor {
    fn drop(&mut self) {
        self.cancel();
    }
}

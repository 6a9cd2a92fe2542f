//! A single cancellable background resize.
//!
//! A task waits for the executor's slot (Pending), then emits a fixed number
//! of progress ticks whose delay grows with the requested scale, and finally
//! runs the resampler once on the blocking pool (Running). Cancellation is
//! cooperative and checked:
//!
//! - while waiting for the slot
//! - between progress ticks
//! - before the final compute
//! - after every row of the compute
//! - after the compute returns
//!
//! Every task emits exactly one terminal [`TaskEvent`]. A cancelled task
//! never emits [`TaskEventKind::Completed`].

use std::any::Any;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::{Duration, Instant};

use resampler::{resample_with, Bitmap};
use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::TaskFailure;
use crate::models::{RequestId, ResizeRequest, ScaleFactor};

/// Lifecycle of a resize task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Waiting for the executor slot
    Pending,
    /// Ticking or computing
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Cancelled | TaskState::Failed
        )
    }
}

#[derive(Debug, Clone)]
pub enum TaskEventKind {
    /// Percentage after a progress tick
    Progress(u8),
    Completed(Arc<Bitmap>),
    Failed(TaskFailure),
    Cancelled,
}

/// Message from a task to whoever consumes the executor's event channel
#[derive(Debug, Clone)]
pub struct TaskEvent {
    pub id: RequestId,
    pub kind: TaskEventKind,
}

impl TaskEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self.kind, TaskEventKind::Progress(_))
    }
}

/// Tuning shared by all tasks of an executor
#[derive(Debug, Clone)]
pub struct TaskSettings {
    /// Number of progress ticks before the compute
    pub ticks: u32,
    /// Delay per tick at scale 1.0
    pub tick_delay: Duration,
    /// Largest output (in pixels) a task may allocate
    pub max_output_pixels: u64,
}

impl TaskSettings {
    /// Per-tick delay for `scale`; larger outputs wait proportionally longer.
    pub fn tick_delay_for(&self, scale: ScaleFactor) -> Duration {
        self.tick_delay.mul_f64(scale.value())
    }
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            ticks: 10,
            tick_delay: Duration::from_millis(30),
            max_output_pixels: 100_000_000,
        }
    }
}

/// Owner-side view of a spawned task
pub struct TaskHandle {
    id: RequestId,
    cancel: CancellationToken,
    state: watch::Receiver<TaskState>,
    join: JoinHandle<()>,
}

impl TaskHandle {
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Request cancellation. Takes effect at the task's next checkpoint.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn state(&self) -> TaskState {
        *self.state.borrow()
    }

    /// Wait for the task to finish and return its final state
    pub async fn wait(self) -> TaskState {
        if let Err(e) = self.join.await {
            tracing::warn!(request_id = %self.id, error = %e, "Resize task did not finish cleanly");
        }
        let state = *self.state.borrow();
        state
    }
}

enum Outcome {
    Completed(Arc<Bitmap>),
    Cancelled,
    Failed(TaskFailure),
}

pub struct ResizeTask {
    request: ResizeRequest,
    settings: TaskSettings,
    cancel: CancellationToken,
    state: watch::Sender<TaskState>,
    events: mpsc::UnboundedSender<TaskEvent>,
}

impl ResizeTask {
    /// Spawn a task on the current tokio runtime.
    ///
    /// `gate` is the executor's slot: the task stays Pending until it holds
    /// a permit, and releases it when it finishes.
    pub fn spawn(
        request: ResizeRequest,
        settings: TaskSettings,
        gate: Arc<Semaphore>,
        events: mpsc::UnboundedSender<TaskEvent>,
    ) -> TaskHandle {
        let id = request.id;
        let cancel = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(TaskState::Pending);

        let task = Self {
            request,
            settings,
            cancel: cancel.clone(),
            state: state_tx,
            events,
        };
        let join = tokio::spawn(task.run(gate));

        TaskHandle {
            id,
            cancel,
            state: state_rx,
            join,
        }
    }

    async fn run(self, gate: Arc<Semaphore>) {
        let outcome = self.execute(gate).await;

        let (state, kind) = match outcome {
            Outcome::Completed(bitmap) => (TaskState::Completed, TaskEventKind::Completed(bitmap)),
            Outcome::Cancelled => (TaskState::Cancelled, TaskEventKind::Cancelled),
            Outcome::Failed(failure) => (TaskState::Failed, TaskEventKind::Failed(failure)),
        };
        self.state.send_replace(state);
        self.emit(kind);
    }

    async fn execute(&self, gate: Arc<Semaphore>) -> Outcome {
        let id = self.request.id;

        let _permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::debug!(request_id = %id, "Cancelled before start");
                return Outcome::Cancelled;
            }
            permit = gate.acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => return Outcome::Failed(TaskFailure::Join("executor closed".to_string())),
            },
        };

        self.state.send_replace(TaskState::Running);
        let started = Instant::now();
        let (width, height) = self.request.target_dimensions();
        tracing::debug!(
            request_id = %id,
            scale = %self.request.scale,
            filter = %self.request.filter,
            width,
            height,
            "Resize started"
        );

        let delay = self.settings.tick_delay_for(self.request.scale);
        let ticks = self.settings.ticks;
        for tick in 1..=ticks {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::debug!(request_id = %id, tick, "Cancelled between ticks");
                    return Outcome::Cancelled;
                }
                _ = tokio::time::sleep(delay) => {}
            }
            self.emit(TaskEventKind::Progress((tick * 100 / ticks) as u8));
        }

        if self.cancel.is_cancelled() {
            tracing::debug!(request_id = %id, "Cancelled before compute");
            return Outcome::Cancelled;
        }

        let pixels = width as u64 * height as u64;
        if pixels > self.settings.max_output_pixels {
            return Outcome::Failed(TaskFailure::OutputTooLarge {
                width,
                height,
                max: self.settings.max_output_pixels,
            });
        }

        let source = self.request.source.clone();
        let filter = self.request.filter;
        let token = self.cancel.clone();
        let computed = tokio::task::spawn_blocking(move || {
            resample_with(&source, width, height, filter, |_| {
                if token.is_cancelled() {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
        })
        .await;

        match computed {
            Ok(Ok(bitmap)) if !self.cancel.is_cancelled() => {
                tracing::info!(
                    request_id = %id,
                    width,
                    height,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Resize completed"
                );
                Outcome::Completed(Arc::new(bitmap))
            }
            Ok(_) => {
                tracing::debug!(request_id = %id, "Cancelled during compute");
                Outcome::Cancelled
            }
            Err(e) if e.is_panic() => {
                let message = panic_message(e.into_panic());
                tracing::error!(request_id = %id, %message, "Resampling panicked");
                Outcome::Failed(TaskFailure::Panicked(message))
            }
            Err(e) => Outcome::Failed(TaskFailure::Join(e.to_string())),
        }
    }

    fn emit(&self, kind: TaskEventKind) {
        // The receiver is gone only when the executor was dropped
        let _ = self.events.send(TaskEvent {
            id: self.request.id,
            kind,
        });
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

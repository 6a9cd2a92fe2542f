//! Scheduler whose task events are produced by the test.
//!
//! Submissions are recorded; the test decides when, in which order, and with
//! what outcome each request finishes. This makes out-of-order completion
//! deterministic.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use resampler::resample;
use scaler::error::TaskFailure;
use scaler::models::{RequestId, ResizeRequest};
use scaler::services::{ResizeScheduler, TaskEvent, TaskEventKind};
use tokio::sync::mpsc;

#[derive(Default)]
struct Log {
    submitted: Vec<ResizeRequest>,
    cancels: usize,
}

pub struct ScriptedScheduler {
    log: Arc<Mutex<Log>>,
    rx: mpsc::UnboundedReceiver<TaskEvent>,
}

/// Test-side handle to a [`ScriptedScheduler`]
#[derive(Clone)]
pub struct Script {
    log: Arc<Mutex<Log>>,
    tx: mpsc::UnboundedSender<TaskEvent>,
}

impl ScriptedScheduler {
    pub fn new() -> (Self, Script) {
        let (tx, rx) = mpsc::unbounded_channel();
        let log = Arc::new(Mutex::new(Log::default()));
        (
            Self {
                log: log.clone(),
                rx,
            },
            Script { log, tx },
        )
    }
}

#[async_trait]
impl ResizeScheduler for ScriptedScheduler {
    fn submit(&mut self, request: ResizeRequest) {
        self.log.lock().unwrap().submitted.push(request);
    }

    fn cancel(&mut self) {
        self.log.lock().unwrap().cancels += 1;
    }

    async fn next_event(&mut self) -> Option<TaskEvent> {
        self.rx.recv().await
    }
}

impl Script {
    /// The request submitted with `id`
    pub fn request(&self, id: u64) -> ResizeRequest {
        self.log
            .lock()
            .unwrap()
            .submitted
            .iter()
            .find(|r| r.id == RequestId::new(id))
            .cloned()
            .unwrap_or_else(|| panic!("No request #{} was submitted", id))
    }

    pub fn submitted(&self) -> usize {
        self.log.lock().unwrap().submitted.len()
    }

    pub fn cancels(&self) -> usize {
        self.log.lock().unwrap().cancels
    }

    pub fn progress(&self, id: u64, percent: u8) {
        self.send(id, TaskEventKind::Progress(percent));
    }

    /// Finish request `id` with a real resample of its source
    pub fn complete(&self, id: u64) {
        let request = self.request(id);
        let (w, h) = request.target_dimensions();
        let bitmap = resample(&request.source, w, h, request.filter);
        self.send(id, TaskEventKind::Completed(Arc::new(bitmap)));
    }

    pub fn fail(&self, id: u64, failure: TaskFailure) {
        self.send(id, TaskEventKind::Failed(failure));
    }

    pub fn cancelled(&self, id: u64) {
        self.send(id, TaskEventKind::Cancelled);
    }

    fn send(&self, id: u64, kind: TaskEventKind) {
        self.tx
            .send(TaskEvent {
                id: RequestId::new(id),
                kind,
            })
            .expect("scheduler dropped");
    }
}

use std::any::Any;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, mpsc};

use crate::foundation::core::Dimensions;
use crate::foundation::error::{StackError, StackResult};

/// Output of a successful encode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Encoded {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// Bounding box of the composited raster. `Some` only for dynamic canvases, whose size the
    /// caller cannot know in advance.
    pub dimensions: Option<Dimensions>,
}

/// Lifecycle of a scheduled encode: `Scheduled -> Running -> {Succeeded, Failed}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Queued, not yet picked up by a worker.
    Scheduled,
    /// A worker is running the job.
    Running,
    /// The job produced bytes.
    Succeeded,
    /// The job returned an error or panicked.
    Failed,
}

impl TaskState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => TaskState::Scheduled,
            1 => TaskState::Running,
            2 => TaskState::Succeeded,
            _ => TaskState::Failed,
        }
    }

    /// `true` once the job has finished, whether or not its callback has run yet.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }
}

/// Queue-unique task id, increasing in scheduling order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

/// Caller-side view of a scheduled task.
#[derive(Clone, Debug)]
pub struct TaskHandle {
    id: TaskId,
    state: Arc<AtomicU8>,
}

impl TaskHandle {
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Current lifecycle state, as last published by the worker.
    pub fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::Acquire))
    }
}

type EncodeJob = Box<dyn FnOnce() -> StackResult<Encoded> + Send + 'static>;
type EncodeCallback = Box<dyn FnOnce(StackResult<Encoded>) + 'static>;

/// One unit of background encode work.
///
/// The job owns everything it reads (a snapshot of the canvas), so the canvas itself may be
/// mutated or dropped while the task is in flight.
pub(crate) struct EncodeTask {
    id: TaskId,
    job: EncodeJob,
    state: Arc<AtomicU8>,
}

impl EncodeTask {
    fn set_state(&self, s: TaskState) {
        self.state.store(s as u8, Ordering::Release);
    }

    /// Run the job on the current thread. A panic inside the job becomes an encode error so the
    /// callback still fires exactly once.
    fn run(self) -> Finished {
        self.set_state(TaskState::Running);
        tracing::debug!(task = self.id.0, "encode task running");

        let EncodeTask { id, job, state } = self;
        let result = catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|payload| {
            let msg = panic_message(payload.as_ref());
            tracing::warn!(task = id.0, %msg, "encode task panicked");
            Err(StackError::encode(format!("encode task panicked: {msg}")))
        });

        let end = if result.is_ok() {
            TaskState::Succeeded
        } else {
            TaskState::Failed
        };
        state.store(end as u8, Ordering::Release);
        tracing::debug!(task = id.0, state = ?end, "encode task finished");
        Finished { id, result }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

struct Finished {
    id: TaskId,
    result: StackResult<Encoded>,
}

/// Options controlling [`EncodeQueue`] worker behaviour.
#[derive(Clone, Debug, Default)]
pub struct EncodeQueueOpts {
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

/// Worker pool for background encodes plus the completion channel back to the caller.
///
/// Jobs run on a dedicated rayon pool. Callbacks stay on the caller's side and are only invoked
/// from [`EncodeQueue::poll`] or [`EncodeQueue::run_until_idle`], i.e. on the thread that owns the
/// queue. They therefore need not be `Send`.
///
/// Dropping a queue with outstanding tasks blocks until they finish and delivers their callbacks.
pub struct EncodeQueue {
    pool: rayon::ThreadPool,
    tx: mpsc::Sender<Finished>,
    rx: mpsc::Receiver<Finished>,
    callbacks: HashMap<TaskId, EncodeCallback>,
    next_id: u64,
}

impl EncodeQueue {
    /// Build the worker pool. `threads: Some(0)` is rejected.
    pub fn new(opts: EncodeQueueOpts) -> StackResult<Self> {
        let pool = build_thread_pool(opts.threads)?;
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            pool,
            tx,
            rx,
            callbacks: HashMap::new(),
            next_id: 0,
        })
    }

    /// Queue `job` on the worker pool. `callback` receives its result on a later
    /// [`poll`](Self::poll) or [`run_until_idle`](Self::run_until_idle).
    pub fn schedule<F, C>(&mut self, job: F, callback: C) -> TaskHandle
    where
        F: FnOnce() -> StackResult<Encoded> + Send + 'static,
        C: FnOnce(StackResult<Encoded>) + 'static,
    {
        let id = TaskId(self.next_id);
        self.next_id += 1;

        let state = Arc::new(AtomicU8::new(TaskState::Scheduled as u8));
        let task = EncodeTask {
            id,
            job: Box::new(job),
            state: state.clone(),
        };
        self.callbacks.insert(id, Box::new(callback));

        let tx = self.tx.clone();
        self.pool.spawn(move || {
            // The receiver lives as long as the queue, and the queue drains before dropping.
            let _ = tx.send(task.run());
        });
        tracing::debug!(task = id.0, "encode task scheduled");

        TaskHandle { id, state }
    }

    /// Number of tasks whose callback has not run yet.
    pub fn pending(&self) -> usize {
        self.callbacks.len()
    }

    /// Deliver every already-finished task without blocking. Returns how many callbacks ran.
    pub fn poll(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(done) = self.rx.try_recv() {
            self.deliver(done);
            delivered += 1;
        }
        delivered
    }

    /// Block until every scheduled task has finished and its callback has run.
    pub fn run_until_idle(&mut self) -> StackResult<usize> {
        let mut delivered = 0;
        while !self.callbacks.is_empty() {
            let done = self
                .rx
                .recv()
                .map_err(|_| StackError::encode("encode workers disconnected unexpectedly"))?;
            self.deliver(done);
            delivered += 1;
        }
        Ok(delivered)
    }

    fn deliver(&mut self, done: Finished) {
        match self.callbacks.remove(&done.id) {
            Some(cb) => cb(done.result),
            None => tracing::warn!(task = done.id.0, "completion for unknown encode task"),
        }
    }
}

impl Drop for EncodeQueue {
    fn drop(&mut self) {
        if !self.callbacks.is_empty() {
            tracing::debug!(
                pending = self.callbacks.len(),
                "draining encode queue on drop"
            );
            let _ = self.run_until_idle();
        }
    }
}

fn build_thread_pool(threads: Option<usize>) -> StackResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(StackError::invalid_argument(
            "encode queue 'threads' must be >= 1 when set",
        ));
    }
    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("pngstack-encode-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| StackError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/task.rs"]
mod tests;

//! Background work for tabs
//!
//! A tab that needs data it cannot read quickly (scanning a directory,
//! probing a service) submits a `BackgroundTask`. The work runs off the
//! dialog thread; its success or failure continuation runs later on the
//! dialog thread, when the dialog pumps `dispatch_completed()`.
//!
//! Cancellation is the only control. The `TaskHandle` returned by `run` is
//! owned by the tab that started the work: cancelling it, or dropping it
//! together with the tab, discards the result and its continuations never
//! run. There are no timeouts.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

/// Identifier of one submitted task, unique per runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The work reported a failure
    Failed(String),
    /// The work panicked
    Panicked(String),
    /// No worker thread could be started
    Spawn(String),
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::Failed(msg) => write!(f, "{}", msg),
            TaskError::Panicked(msg) => write!(f, "background task panicked: {}", msg),
            TaskError::Spawn(msg) => write!(f, "could not start background task: {}", msg),
        }
    }
}

impl std::error::Error for TaskError {}

/// Cancellation flag visible to the work. Long-running work should check
/// it and return early; its result is discarded either way.
#[derive(Debug, Clone)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Owner's side of a submitted task. Dropping it cancels the task.
#[derive(Debug)]
pub struct TaskHandle {
    id: TaskId,
    cancelled: Arc<AtomicBool>,
}

impl TaskHandle {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            log::debug!("Cancelled {}", self.id);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// What a job's work produced, before the typed continuation sees it.
pub type JobOutput = Result<Box<dyn Any + Send>, TaskError>;

type Work = Box<dyn FnOnce(&CancellationToken) -> JobOutput + Send>;
type Finish = Box<dyn FnOnce(JobOutput)>;

/// A type-erased task as seen by runners.
///
/// A runner splits it with `into_parts`: the `JobWork` may move to any
/// thread, the `JobFinish` stays on the dialog thread and is handed to
/// `PendingTasks::register`.
pub struct Job {
    work: JobWork,
    finish: JobFinish,
}

impl Job {
    pub fn into_parts(self) -> (JobWork, JobFinish) {
        (self.work, self.finish)
    }
}

/// The work half of a job.
pub struct JobWork(Work);

impl JobWork {
    /// Run the work on the current thread. A panic becomes
    /// `TaskError::Panicked`.
    pub fn run(self, token: &CancellationToken) -> JobOutput {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.0)(token))) {
            Ok(output) => output,
            Err(payload) => {
                let msg = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(TaskError::Panicked(msg))
            }
        }
    }
}

/// The continuation half of a job.
pub struct JobFinish(Finish);

impl JobFinish {
    pub fn finish(self, output: JobOutput) {
        (self.0)(output)
    }
}

/// Executes jobs and delivers their results on the dialog thread.
pub trait BackgroundTaskRunner {
    /// Start a job. Its continuation runs during a later `dispatch_completed`.
    fn submit(&self, job: Job) -> TaskHandle;

    /// Run continuations of finished, non-cancelled jobs. Returns how many
    /// ran.
    fn dispatch_completed(&self) -> usize;

    /// Jobs submitted whose results have not been dispatched or discarded.
    fn pending(&self) -> usize;
}

/// Typed builder for a job: work plus success/failure continuations.
///
/// ```
/// use prefsuite_core::{BackgroundTask, BackgroundTaskRunner, InlineTaskRunner};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let runner = InlineTaskRunner::new();
/// let found = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&found);
/// let _handle = BackgroundTask::new(|_token| Ok(vec!["apa.csl".to_string()]))
///     .on_success(move |styles| *sink.borrow_mut() = styles)
///     .run(&runner);
/// runner.dispatch_completed();
/// assert_eq!(found.borrow().len(), 1);
/// ```
pub struct BackgroundTask<T> {
    work: Box<dyn FnOnce(&CancellationToken) -> Result<T, TaskError> + Send>,
    on_success: Option<Box<dyn FnOnce(T)>>,
    on_failure: Option<Box<dyn FnOnce(TaskError)>>,
}

impl<T: Send + 'static> BackgroundTask<T> {
    pub fn new<W>(work: W) -> Self
    where
        W: FnOnce(&CancellationToken) -> Result<T, TaskError> + Send + 'static,
    {
        Self {
            work: Box::new(work),
            on_success: None,
            on_failure: None,
        }
    }

    pub fn on_success(mut self, f: impl FnOnce(T) + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_failure(mut self, f: impl FnOnce(TaskError) + 'static) -> Self {
        self.on_failure = Some(Box::new(f));
        self
    }

    /// Submit to `runner`. Keep the handle for as long as the result matters.
    pub fn run(self, runner: &dyn BackgroundTaskRunner) -> TaskHandle {
        runner.submit(self.into_job())
    }

    fn into_job(self) -> Job {
        let work = self.work;
        let on_success = self.on_success;
        let on_failure = self.on_failure;

        Job {
            work: JobWork(Box::new(move |token: &CancellationToken| {
                work(token).map(|value| Box::new(value) as Box<dyn Any + Send>)
            })),
            finish: JobFinish(Box::new(move |output: JobOutput| match output {
                Ok(value) => match value.downcast::<T>() {
                    Ok(value) => {
                        if let Some(f) = on_success {
                            f(*value);
                        }
                    }
                    Err(_) => log::error!("Background task produced an unexpected result type"),
                },
                Err(e) => {
                    log::warn!("Background task failed: {}", e);
                    if let Some(f) = on_failure {
                        f(e);
                    }
                }
            })),
        }
    }
}

// ============================================================================
// Bookkeeping shared by runners
// ============================================================================

struct Pending {
    cancelled: Arc<AtomicBool>,
    finish: JobFinish,
}

/// Dialog-thread bookkeeping for a runner: hands out ids, handles and
/// tokens, and runs continuations of jobs that were not cancelled.
#[derive(Default)]
pub struct PendingTasks {
    next_id: Cell<u64>,
    tasks: RefCell<HashMap<TaskId, Pending>>,
}

impl PendingTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a submitted job. The token goes with the work, the handle back
    /// to the submitter.
    pub fn register(&self, finish: JobFinish) -> (TaskHandle, CancellationToken) {
        let id = TaskId(self.next_id.get() + 1);
        self.next_id.set(id.0);

        let cancelled = Arc::new(AtomicBool::new(false));
        self.tasks.borrow_mut().insert(
            id,
            Pending { cancelled: Arc::clone(&cancelled), finish },
        );

        let token = CancellationToken(Arc::clone(&cancelled));
        (TaskHandle { id, cancelled }, token)
    }

    /// Run the continuation for `id` unless it was cancelled. True when it
    /// ran.
    pub fn deliver(&self, id: TaskId, output: JobOutput) -> bool {
        // Released before the continuation runs: it may submit new tasks.
        let pending = self.tasks.borrow_mut().remove(&id);
        match pending {
            Some(p) if !p.cancelled.load(Ordering::Acquire) => {
                p.finish.finish(output);
                true
            }
            Some(_) => {
                log::debug!("Discarded result of cancelled {}", id);
                false
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Thread runner
// ============================================================================

/// Runs each job on its own named thread; results come back over a channel.
pub struct ThreadTaskRunner {
    pending: PendingTasks,
    tx: mpsc::Sender<(TaskId, JobOutput)>,
    rx: mpsc::Receiver<(TaskId, JobOutput)>,
}

impl ThreadTaskRunner {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            pending: PendingTasks::default(),
            tx,
            rx,
        }
    }
}

impl Default for ThreadTaskRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundTaskRunner for ThreadTaskRunner {
    fn submit(&self, job: Job) -> TaskHandle {
        let (work, finish) = job.into_parts();
        let (handle, token) = self.pending.register(finish);
        let id = handle.id();
        let tx = self.tx.clone();

        let spawned = std::thread::Builder::new()
            .name(format!("prefs-{}", id))
            .spawn(move || {
                let output = if token.is_cancelled() {
                    Err(TaskError::Failed("cancelled before start".to_string()))
                } else {
                    work.run(&token)
                };
                // Receiver gone means the dialog is closed; nothing to report to.
                let _ = tx.send((id, output));
            });

        match spawned {
            Ok(_) => log::debug!("Started {}", id),
            Err(e) => {
                log::error!("Failed to spawn thread for {}: {}", id, e);
                let _ = self.tx.send((id, Err(TaskError::Spawn(e.to_string()))));
            }
        }

        handle
    }

    fn dispatch_completed(&self) -> usize {
        let mut delivered = 0;
        while let Ok((id, output)) = self.rx.try_recv() {
            if self.pending.deliver(id, output) {
                delivered += 1;
            }
        }
        delivered
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }
}

// ============================================================================
// Inline runner
// ============================================================================

/// Runs work synchronously at submission and queues the result for the next
/// dispatch. Deterministic; meant for tests and single-threaded embedding.
#[derive(Default)]
pub struct InlineTaskRunner {
    pending: PendingTasks,
    completed: RefCell<VecDeque<(TaskId, JobOutput)>>,
}

impl InlineTaskRunner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BackgroundTaskRunner for InlineTaskRunner {
    fn submit(&self, job: Job) -> TaskHandle {
        let (work, finish) = job.into_parts();
        let (handle, token) = self.pending.register(finish);
        let output = work.run(&token);
        self.completed.borrow_mut().push_back((handle.id(), output));
        handle
    }

    fn dispatch_completed(&self) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.completed.borrow_mut().pop_front();
            let Some((id, output)) = next else { break };
            if self.pending.deliver(id, output) {
                delivered += 1;
            }
        }
        delivered
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    fn collect<T: 'static>() -> (Rc<RefCell<Vec<T>>>, Rc<RefCell<Vec<T>>>) {
        let sink = Rc::new(RefCell::new(Vec::new()));
        (Rc::clone(&sink), sink)
    }

    #[test]
    fn test_inline_success_waits_for_dispatch() {
        let runner = InlineTaskRunner::new();
        let (results, sink) = collect::<i32>();

        let _handle = BackgroundTask::new(|_| Ok(21 * 2))
            .on_success(move |v| sink.borrow_mut().push(v))
            .run(&runner);

        assert!(results.borrow().is_empty(), "continuations only run on dispatch");
        assert_eq!(runner.pending(), 1);
        assert_eq!(runner.dispatch_completed(), 1);
        assert_eq!(*results.borrow(), vec![42]);
        assert_eq!(runner.pending(), 0);
    }

    #[test]
    fn test_inline_failure_and_panic() {
        let runner = InlineTaskRunner::new();
        let (errors, sink) = collect::<TaskError>();
        let panic_sink = Rc::clone(&sink);

        let _a = BackgroundTask::<()>::new(|_| Err(TaskError::Failed("offline".into())))
            .on_failure(move |e| sink.borrow_mut().push(e))
            .run(&runner);
        let _b = BackgroundTask::<()>::new(|_| panic!("boom"))
            .on_failure(move |e| panic_sink.borrow_mut().push(e))
            .run(&runner);

        runner.dispatch_completed();
        let errors = errors.borrow();
        assert_eq!(errors[0], TaskError::Failed("offline".into()));
        assert_eq!(errors[1], TaskError::Panicked("boom".into()));
    }

    #[test]
    fn test_dropped_handle_discards_result() {
        let runner = InlineTaskRunner::new();
        let (results, sink) = collect::<&'static str>();

        let handle = BackgroundTask::new(|_| Ok("late"))
            .on_success(move |v| sink.borrow_mut().push(v))
            .run(&runner);
        drop(handle);

        assert_eq!(runner.dispatch_completed(), 0);
        assert!(results.borrow().is_empty());
        assert_eq!(runner.pending(), 0);
    }

    #[test]
    fn test_continuation_may_submit_more_work() {
        let runner = Rc::new(InlineTaskRunner::new());
        let (results, sink) = collect::<u32>();
        let handles: Rc<RefCell<Vec<TaskHandle>>> = Rc::new(RefCell::new(Vec::new()));

        let inner_runner = Rc::clone(&runner);
        let inner_handles = Rc::clone(&handles);
        let first = BackgroundTask::new(|_| Ok(1u32))
            .on_success(move |v| {
                sink.borrow_mut().push(v);
                let sink = Rc::clone(&sink);
                let handle = BackgroundTask::new(|_| Ok(2u32))
                    .on_success(move |v| sink.borrow_mut().push(v))
                    .run(inner_runner.as_ref());
                inner_handles.borrow_mut().push(handle);
            })
            .run(runner.as_ref());
        handles.borrow_mut().push(first);

        while runner.dispatch_completed() > 0 {}
        assert_eq!(*results.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_thread_runner_delivers_on_pump() {
        let runner = ThreadTaskRunner::new();
        let (results, sink) = collect::<String>();

        let _handle =
            BackgroundTask::new(|_| Ok(std::thread::current().name().map(str::to_string)))
                .on_success(move |name: Option<String>| {
                    sink.borrow_mut().push(name.unwrap_or_default())
                })
                .run(&runner);

        let deadline = Instant::now() + Duration::from_secs(5);
        while results.borrow().is_empty() && Instant::now() < deadline {
            runner.dispatch_completed();
            std::thread::sleep(Duration::from_millis(5));
        }

        let results = results.borrow();
        assert_eq!(results.len(), 1);
        assert!(results[0].starts_with("prefs-task-"));
    }

    #[test]
    fn test_thread_runner_cancel_while_running() {
        let runner = ThreadTaskRunner::new();
        let (results, sink) = collect::<bool>();

        let handle = BackgroundTask::new(|token: &CancellationToken| {
            let deadline = Instant::now() + Duration::from_secs(5);
            while !token.is_cancelled() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(1));
            }
            Ok(token.is_cancelled())
        })
        .on_success(move |v| sink.borrow_mut().push(v))
        .run(&runner);

        handle.cancel();

        let deadline = Instant::now() + Duration::from_secs(5);
        while runner.pending() > 0 && Instant::now() < deadline {
            runner.dispatch_completed();
            std::thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(runner.pending(), 0);
        assert!(results.borrow().is_empty());
    }
}

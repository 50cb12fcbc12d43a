//! A runner written outside the crate, the way an application shell would
//! plug in its own executor.

use std::cell::RefCell;
use std::rc::Rc;

use prefsuite_core::{
    BackgroundTask, BackgroundTaskRunner, CancellationToken, Job, JobWork, PendingTasks,
    TaskError, TaskHandle, TaskId,
};

/// Holds submitted work until the next dispatch, then runs it there.
#[derive(Default)]
struct DeferredRunner {
    pending: PendingTasks,
    queued: RefCell<Vec<(TaskId, JobWork, CancellationToken)>>,
}

impl BackgroundTaskRunner for DeferredRunner {
    fn submit(&self, job: Job) -> TaskHandle {
        let (work, finish) = job.into_parts();
        let (handle, token) = self.pending.register(finish);
        self.queued.borrow_mut().push((handle.id(), work, token));
        handle
    }

    fn dispatch_completed(&self) -> usize {
        let queued: Vec<_> = self.queued.borrow_mut().drain(..).collect();
        let mut delivered = 0;
        for (id, work, token) in queued {
            let output = if token.is_cancelled() {
                Err(TaskError::Failed("cancelled".to_string()))
            } else {
                work.run(&token)
            };
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

#[test]
fn work_runs_only_when_dispatched() {
    let runner = DeferredRunner::default();
    let ran = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&ran);

    let _handle = BackgroundTask::new(|_| Ok("styles".to_string()))
        .on_success(move |v| sink.borrow_mut().push(v))
        .run(&runner);

    assert_eq!(runner.pending(), 1);
    assert!(ran.borrow().is_empty());

    assert_eq!(runner.dispatch_completed(), 1);
    assert_eq!(*ran.borrow(), vec!["styles"]);
    assert_eq!(runner.pending(), 0);
}

#[test]
fn cancelled_job_skips_work_and_continuation() {
    let runner = DeferredRunner::default();
    let ran = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&ran);

    let handle = BackgroundTask::new(|_| -> Result<(), TaskError> { panic!("must not run") })
        .on_success(move |_| *sink.borrow_mut() += 1)
        .run(&runner);
    handle.cancel();

    assert_eq!(runner.dispatch_completed(), 0);
    assert_eq!(*ran.borrow(), 0);
    assert!(runner.pending.is_empty());
}

#[test]
fn panicking_work_reaches_failure_continuation() {
    let runner = DeferredRunner::default();
    let errors = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&errors);

    let _handle = BackgroundTask::<u32>::new(|_| panic!("scan crashed"))
        .on_failure(move |e| sink.borrow_mut().push(e))
        .run(&runner);

    assert_eq!(runner.dispatch_completed(), 1);
    assert_eq!(*errors.borrow(), vec![TaskError::Panicked("scan crashed".to_string())]);
}

use std::fmt;
use std::panic;

use futures::sync::oneshot;
use log::trace;

use crate::handle::JobHandle;

/// An owned, single-shot unit of work.
///
/// The job body is type-erased so heterogeneous closures can share a queue.
/// The producer half of the result channel is captured inside the closure;
/// dropping an unexecuted `Task` therefore drops the producer, which
/// completes the matching [`JobHandle`] with an abandoned error.
///
/// [`JobHandle`]: struct.JobHandle.html
pub(crate) struct Task {
    run: Box<dyn FnOnce() + Send + 'static>,
}

impl Task {
    /// Wrap a job body, pairing it with the handle that observes its
    /// outcome.
    pub(crate) fn new<F, T>(f: F) -> (Task, JobHandle<T>)
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();

        let run = Box::new(move || {
            let result = panic::catch_unwind(panic::AssertUnwindSafe(f));

            if tx.send(result).is_err() {
                // The handle was dropped; the outcome is discarded.
                trace!("job result discarded; handle dropped");
            }
        });

        (Task { run }, JobHandle::new(rx))
    }

    /// Run the body to completion.
    ///
    /// A panicking body is captured into the result channel; it never
    /// propagates to the worker executing the task.
    pub(crate) fn run(self) {
        (self.run)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("Task")
            .field("run", &"Box<dyn FnOnce()>")
            .finish()
    }
}

use std::fmt;
use std::thread;

use futures::sync::oneshot;
use futures::{Async, Future, Poll};

use crate::error::JobError;

/// A future for the value produced by a submitted job.
///
/// The handle is the consumer half of a one-shot channel whose producer is
/// owned by the queued task. It resolves exactly once: with the job's return
/// value, with the captured panic if the body panicked, or with an abandoned
/// error if the task was dropped before running (for example because the
/// pool shut down first).
///
/// `JobHandle` implements [`Future`], so it composes with combinators; for
/// plain blocking callers, [`get`] waits for the outcome directly. Dropping
/// the handle without reading it is allowed and discards the result.
///
/// [`Future`]: https://docs.rs/futures/0.1/futures/future/trait.Future.html
/// [`get`]: #method.get
pub struct JobHandle<T> {
    rx: oneshot::Receiver<thread::Result<T>>,
}

impl<T> JobHandle<T> {
    pub(crate) fn new(rx: oneshot::Receiver<thread::Result<T>>) -> JobHandle<T> {
        JobHandle { rx }
    }

    /// Block the calling thread until the job completes, then return its
    /// outcome.
    ///
    /// # Examples
    ///
    /// ```
    /// use taskpool::TaskPool;
    ///
    /// let mut pool = TaskPool::new(2);
    /// pool.init().unwrap();
    ///
    /// let handle = pool.submit(|| "done").unwrap();
    /// assert_eq!(handle.get().unwrap(), "done");
    /// ```
    pub fn get(self) -> Result<T, JobError> {
        self.wait()
    }
}

impl<T> Future for JobHandle<T> {
    type Item = T;
    type Error = JobError;

    fn poll(&mut self) -> Poll<T, JobError> {
        match self.rx.poll() {
            Ok(Async::Ready(Ok(value))) => Ok(Async::Ready(value)),
            Ok(Async::Ready(Err(payload))) => Err(JobError::panicked(payload)),
            Ok(Async::NotReady) => Ok(Async::NotReady),
            Err(oneshot::Canceled) => Err(JobError::abandoned()),
        }
    }
}

impl<T> fmt::Debug for JobHandle<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("JobHandle")
            .field("rx", &"oneshot::Receiver")
            .finish()
    }
}

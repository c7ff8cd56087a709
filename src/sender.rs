use std::sync::Arc;

use crate::error::SpawnError;
use crate::handle::JobHandle;
use crate::pool::Pool;
use crate::task::Task;

/// Submit jobs to the associated task pool.
///
/// A `Sender` instance is a handle to a single pool, allowing its owner to
/// submit jobs from any thread. It is *only* used for submitting; it does
/// not affect the pool's lifecycle, and it may be cloned freely. Job bodies
/// may themselves hold a `Sender` and submit re-entrantly; a re-entrant
/// submission is routed to a random queue exactly like an external one.
///
/// `Sender` instances are obtained by calling [`TaskPool::sender`].
///
/// [`TaskPool::sender`]: struct.TaskPool.html#method.sender
#[derive(Debug)]
pub struct Sender {
    pub(crate) pool: Arc<Pool>,
}

impl Sender {
    /// Submit a job, returning a handle for its result.
    ///
    /// The job is pushed onto a uniformly random queue and will be executed
    /// exactly once by some worker, unless the pool shuts down first, in
    /// which case the handle resolves with an abandoned error.
    ///
    /// # Examples
    ///
    /// ```
    /// use taskpool::TaskPool;
    ///
    /// let mut pool = TaskPool::new(2);
    /// pool.init().unwrap();
    ///
    /// let sender = pool.sender().clone();
    /// let handle = sender.submit(|| 40 + 2).unwrap();
    ///
    /// assert_eq!(handle.get().unwrap(), 42);
    /// ```
    pub fn submit<F, T>(&self, f: F) -> Result<JobHandle<T>, SpawnError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (task, handle) = Task::new(f);
        self.pool.submit(task)?;
        Ok(handle)
    }

    /// Submit a job, discarding its result.
    ///
    /// Equivalent to [`submit`] with the handle dropped; failures inside the
    /// body are swallowed after being captured.
    ///
    /// [`submit`]: #method.submit
    pub fn spawn<F>(&self, f: F) -> Result<(), SpawnError>
    where
        F: FnOnce() + Send + 'static,
    {
        let (task, _handle) = Task::new(f);
        self.pool.submit(task)
    }
}

impl Clone for Sender {
    #[inline]
    fn clone(&self) -> Sender {
        let pool = self.pool.clone();
        Sender { pool }
    }
}

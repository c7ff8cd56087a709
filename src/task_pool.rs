use std::fmt;
use std::thread;

use log::{debug, error};

use crate::builder::Builder;
use crate::error::{SpawnError, StartError};
use crate::handle::JobHandle;
use crate::pool::Lifecycle;
use crate::sender::Sender;
use crate::worker::{Worker, WorkerId};

/// A multi-queue work-stealing pool of worker threads.
///
/// Each worker owns one double-ended queue. Submissions are routed to a
/// uniformly random queue; a worker drains its own queue from the front and
/// steals from the back of a peer's queue when its own runs dry.
///
/// The lifecycle is explicit: construction allocates the queues, [`init`]
/// starts the workers, and [`shut`] stops them, failing the handles of any
/// job that never ran. If a `TaskPool` instance is dropped without
/// explicitly being shut down, `shut` is called implicitly.
///
/// Create `TaskPool` instances using [`Builder`] or [`TaskPool::new`].
///
/// [`init`]: #method.init
/// [`shut`]: #method.shut
/// [`Builder`]: struct.Builder.html
/// [`TaskPool::new`]: #method.new
///
/// # Examples
///
/// ```
/// use taskpool::TaskPool;
///
/// let mut pool = TaskPool::new(4);
/// pool.init().unwrap();
///
/// let handle = pool.submit(|| 2 + 2).unwrap();
/// assert_eq!(handle.get().unwrap(), 4);
///
/// pool.shut();
/// ```
pub struct TaskPool {
    sender: Sender,
    threads: Vec<thread::JoinHandle<()>>,
}

impl TaskPool {
    /// Create a new `TaskPool` with `pool_size` workers and default
    /// configuration values.
    ///
    /// Use [`Builder`] for creating a configured task pool.
    ///
    /// # Panics
    ///
    /// Panics if `pool_size` is zero.
    ///
    /// [`Builder`]: struct.Builder.html
    pub fn new(pool_size: usize) -> TaskPool {
        Builder::new().pool_size(pool_size).build()
    }

    pub(crate) fn new2(sender: Sender) -> TaskPool {
        TaskPool {
            sender,
            threads: Vec::new(),
        }
    }

    /// Start the worker threads.
    ///
    /// Workers are held at a gate until every thread is spawned, then
    /// released together; a submission arriving mid-init sits in its queue
    /// until the workers start scheduling.
    ///
    /// Errors if the pool was already initialized, or was shut down before
    /// ever being initialized.
    pub fn init(&mut self) -> Result<(), StartError> {
        let pool = &self.sender.pool;

        pool.transition_to_running().map_err(|actual| match actual {
            Lifecycle::Shutdown => StartError::shutdown(),
            _ => StartError::already_started(),
        })?;

        debug!("init; num_workers={}", pool.queues.len());

        for idx in 0..pool.queues.len() {
            let handle =
                Worker::spawn(WorkerId::new(idx), pool).expect("failed to spawn worker thread");
            self.threads.push(handle);
        }

        pool.release_workers();
        Ok(())
    }

    /// Submit a job, returning a handle for its result.
    ///
    /// Shorthand for [`Sender::submit`] on this pool's sender. Errors if the
    /// pool has not been initialized or has been shut down; an accepted job
    /// is never dropped without resolving its handle.
    ///
    /// [`Sender::submit`]: struct.Sender.html#method.submit
    pub fn submit<F, T>(&self, f: F) -> Result<JobHandle<T>, SpawnError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.sender.submit(f)
    }

    /// Submit a job, discarding its result.
    ///
    /// Shorthand for [`Sender::spawn`] on this pool's sender.
    ///
    /// [`Sender::spawn`]: struct.Sender.html#method.spawn
    pub fn spawn<F>(&self, f: F) -> Result<(), SpawnError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender.spawn(f)
    }

    /// Return a reference to the submission handle.
    ///
    /// Clone it to submit jobs from other threads, or from inside running
    /// jobs.
    pub fn sender(&self) -> &Sender {
        &self.sender
    }

    /// Shut the pool down.
    ///
    /// Sets the stop signal, wakes every sleeping worker, joins all worker
    /// threads, then closes the queues: a job still queued at this point
    /// completes its handle with an abandoned error instead of running.
    /// Jobs already executing run to completion before their worker exits.
    ///
    /// `shut` is idempotent; repeated calls are no-ops.
    pub fn shut(&mut self) {
        let pool = &self.sender.pool;

        if pool.transition_to_shutdown() {
            debug!("shut; joining workers; count={}", self.threads.len());
        }

        // If `init` never ran, workers may still be held at the gate; let
        // them through so they can observe the stop signal.
        pool.release_workers();
        pool.notify_all();

        for thread in self.threads.drain(..) {
            if thread.join().is_err() {
                // A worker died outside of a job body. Task panics are
                // caught before they reach the loop, so this is a bug in the
                // pool itself, not in user code.
                error!("worker thread panicked outside of a job");
            }
        }

        pool.close_queues();
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        self.shut();
    }
}

impl fmt::Debug for TaskPool {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("TaskPool")
            .field("sender", &self.sender)
            .field("threads", &self.threads.len())
            .finish()
    }
}

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::trace;

use crate::config::{Config, DEFAULT_PARK_TIMEOUT, MAX_WORKERS};
use crate::pool::Pool;
use crate::queue::Queue;
use crate::sender::Sender;
use crate::task_pool::TaskPool;

/// Builds a task pool with custom configuration values.
///
/// Methods can be chained in order to set the configuration values. The
/// pool is constructed by calling [`build`]; the returned pool has its
/// queues allocated but no running workers until [`TaskPool::init`] is
/// called.
///
/// New instances of `Builder` are obtained via [`Builder::new`].
///
/// See function level documentation for details on the various
/// configuration settings.
///
/// [`build`]: #method.build
/// [`Builder::new`]: #method.new
/// [`TaskPool::init`]: struct.TaskPool.html#method.init
///
/// # Examples
///
/// ```
/// use taskpool::Builder;
///
/// let mut pool = Builder::new()
///     .pool_size(4)
///     .name_prefix("my-pool-")
///     .build();
///
/// pool.init().unwrap();
///
/// let handle = pool.submit(|| 40 + 2).unwrap();
/// assert_eq!(handle.get().unwrap(), 42);
///
/// pool.shut();
/// ```
pub struct Builder {
    /// Task pool specific configuration values
    config: Config,

    /// Number of workers to spawn
    pool_size: usize,
}

impl Builder {
    /// Returns a new task pool builder initialized with default
    /// configuration values.
    ///
    /// Configuration methods can be chained on the return value.
    pub fn new() -> Builder {
        let num_cpus = num_cpus::get();

        Builder {
            pool_size: num_cpus,
            config: Config {
                name_prefix: None,
                stack_size: None,
                park_timeout: DEFAULT_PARK_TIMEOUT,
                after_start: None,
                before_stop: None,
            },
        }
    }

    /// Set the number of worker threads for the pool instance.
    ///
    /// This must be a number between 1 and 32,768 though it is advised to
    /// keep this value on the smaller side.
    ///
    /// The default value is the number of cores available to the system.
    ///
    /// # Examples
    ///
    /// ```
    /// use taskpool::Builder;
    ///
    /// let pool = Builder::new()
    ///     .pool_size(4)
    ///     .build();
    /// ```
    pub fn pool_size(&mut self, val: usize) -> &mut Self {
        assert!(val >= 1, "at least one thread required");
        assert!(val <= MAX_WORKERS, "max value is {}", MAX_WORKERS);

        self.pool_size = val;
        self
    }

    /// Set name prefix of threads spawned by the pool.
    ///
    /// Thread name prefix is used for generating thread names. For example,
    /// if prefix is `my-pool-`, then threads in the pool will get names like
    /// `my-pool-1` etc.
    ///
    /// If this configuration is not set, then the thread will use the system
    /// default naming scheme.
    pub fn name_prefix<S: Into<String>>(&mut self, val: S) -> &mut Self {
        self.config.name_prefix = Some(val.into());
        self
    }

    /// Set the stack size (in bytes) for worker threads.
    ///
    /// The actual stack size may be greater than this value if the platform
    /// specifies minimal stack size.
    pub fn stack_size(&mut self, val: usize) -> &mut Self {
        self.config.stack_size = Some(val);
        self
    }

    /// Set the upper bound on a worker's sleep between scheduling passes.
    ///
    /// An idle worker sleeps on its own queue's condition variable. The wait
    /// is bounded by this duration so the worker re-probes its peers for
    /// stealable work even if no submission ever routes to its own queue.
    /// Smaller values tighten the worst-case pickup latency for imbalanced
    /// load at the cost of more idle wakeups.
    ///
    /// The default value is 5 milliseconds.
    pub fn park_timeout(&mut self, val: Duration) -> &mut Self {
        self.config.park_timeout = val;
        self
    }

    /// Execute function `f` on each worker thread after it starts, before
    /// it begins to schedule jobs.
    pub fn after_start<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.config.after_start = Some(Arc::new(f));
        self
    }

    /// Execute function `f` on each worker thread right before it stops.
    pub fn before_stop<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.config.before_stop = Some(Arc::new(f));
        self
    }

    /// Create the configured `TaskPool`.
    ///
    /// The returned pool holds its queues but runs no threads yet; call
    /// [`TaskPool::init`] to start the workers.
    ///
    /// [`TaskPool::init`]: struct.TaskPool.html#method.init
    pub fn build(&self) -> TaskPool {
        trace!("build; num-workers={}", self.pool_size);

        let queues: Vec<_> = (0..self.pool_size).map(|_| Queue::new()).collect();

        let inner = Arc::new(Pool::new(queues.into_boxed_slice(), self.config.clone()));

        TaskPool::new2(Sender { pool: inner })
    }
}

impl Default for Builder {
    fn default() -> Builder {
        Builder::new()
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("Builder")
            .field("config", &self.config)
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

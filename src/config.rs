use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Thread pool specific configuration values.
#[derive(Clone)]
pub(crate) struct Config {
    // Used to configure a worker thread
    pub(crate) name_prefix: Option<String>,
    pub(crate) stack_size: Option<usize>,

    /// Upper bound on a worker's sleep between scheduling passes.
    ///
    /// A worker that found nothing to pop or steal sleeps on its own
    /// queue's condvar for at most this long. Work can land on a peer queue
    /// without any notify ever targeting this worker, so the sleep must be
    /// bounded for every pending task to eventually execute.
    pub(crate) park_timeout: Duration,

    pub(crate) after_start: Option<Arc<dyn Fn() + Send + Sync>>,
    pub(crate) before_stop: Option<Arc<dyn Fn() + Send + Sync>>,
}

/// Max number of workers that can be part of a pool.
pub(crate) const MAX_WORKERS: usize = 1 << 15;

pub(crate) const DEFAULT_PARK_TIMEOUT: Duration = Duration::from_millis(5);

impl fmt::Debug for Config {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("Config")
            .field("name_prefix", &self.name_prefix)
            .field("stack_size", &self.stack_size)
            .field("park_timeout", &self.park_timeout)
            .finish()
    }
}

use std::io;
use std::sync::atomic::Ordering::Relaxed;
use std::sync::Arc;
use std::thread;

use log::{debug, trace};

use crate::pool::Pool;
use crate::queue::Queue;
use crate::task::Task;

/// A pool worker.
///
/// Owns the queue at index `id` and runs the scheduling loop on its own
/// thread: drain the owned queue from the front, steal from peers from the
/// back when it runs dry, sleep (bounded) when neither yields work.
pub(crate) struct Worker {
    pool: Arc<Pool>,
    id: WorkerId,
}

/// Identifies a worker within its pool.
///
/// Identifiers are unique scoped by the pool; different pool instances may
/// share worker identifier values.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub(crate) struct WorkerId {
    pub(crate) idx: usize,
}

impl WorkerId {
    pub(crate) fn new(idx: usize) -> WorkerId {
        WorkerId { idx }
    }
}

impl Worker {
    /// Spawn the worker thread for queue `id`.
    ///
    /// The thread blocks at the startup gate until `init` releases it.
    pub(crate) fn spawn(id: WorkerId, pool: &Arc<Pool>) -> io::Result<thread::JoinHandle<()>> {
        trace!("spawning worker thread; idx={}", id.idx);

        let mut th = thread::Builder::new();

        if let Some(ref prefix) = pool.config.name_prefix {
            th = th.name(format!("{}{}", prefix, id.idx));
        }

        if let Some(stack) = pool.config.stack_size {
            th = th.stack_size(stack);
        }

        let pool = pool.clone();

        th.spawn(move || {
            let worker = Worker { pool, id };

            worker.pool.wait_until_released();

            if let Some(ref f) = worker.pool.config.after_start {
                f();
            }

            worker.run();

            if let Some(ref f) = worker.pool.config.before_stop {
                f();
            }
        })
    }

    /// The scheduling loop.
    ///
    /// Every pass re-checks the stop signal, so a sleeping worker woken by
    /// shutdown (or by its bounded wait elapsing) exits promptly. A task
    /// obtained from any source is run to completion before the next pass.
    fn run(&self) {
        debug!("worker running; idx={}", self.id.idx);

        while !self.pool.is_shut() {
            let task = self
                .queue()
                .pop_front()
                .or_else(|| self.steal_task())
                .or_else(|| self.sleep());

            if let Some(task) = task {
                task.run();
            }
        }

        debug!("worker terminated; idx={}", self.id.idx);
    }

    /// One pass around the ring from a random start, skipping this worker.
    ///
    /// Peers are peeked without their lock first; the lock is only taken
    /// when the peek saw work. Finding the queue empty once the lock is held
    /// just moves the scan along. First successful steal wins.
    fn steal_task(&self) -> Option<Task> {
        let len = self.pool.queues.len();
        let start = self.pool.rand_index();

        for i in 0..len {
            let idx = (start + i) % len;

            if idx == self.id.idx {
                continue;
            }

            let victim = &self.pool.queues[idx];

            if victim.is_empty() {
                continue;
            }

            if let Some(task) = victim.steal() {
                self.pool.steal_count.fetch_add(1, Relaxed);
                trace!("stole task; idx={}; from={}", self.id.idx, idx);
                return Some(task);
            }
        }

        None
    }

    /// Sleep on the owned queue's condvar, bounded by the configured park
    /// timeout, and take whatever arrived in the meantime.
    fn sleep(&self) -> Option<Task> {
        trace!("no work found; sleeping; idx={}", self.id.idx);
        self.queue().wait_for_work(self.pool.config.park_timeout)
    }

    fn queue(&self) -> &Queue {
        &self.pool.queues[self.id.idx]
    }
}

use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::Ordering::{AcqRel, Acquire, Relaxed};
use std::sync::atomic::AtomicUsize;
use std::sync::{Condvar, Mutex};

use log::{debug, trace};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::error::SpawnError;
use crate::queue::Queue;
use crate::task::Task;

/// Pool lifecycle.
///
/// Transitions are monotonic: `Idle` → `Running` → `Shutdown`. The
/// `Shutdown` state doubles as the stop flag observed by the workers.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Lifecycle {
    /// Queues are allocated but no worker threads run yet.
    Idle = 0,

    /// Workers are running and submissions are accepted.
    Running = 1,

    /// The stop signal is set; workers exit and submissions are rejected.
    Shutdown = 2,
}

impl From<usize> for Lifecycle {
    fn from(src: usize) -> Lifecycle {
        match src {
            0 => Lifecycle::Idle,
            1 => Lifecycle::Running,
            2 => Lifecycle::Shutdown,
            _ => unreachable!(),
        }
    }
}

impl From<Lifecycle> for usize {
    fn from(src: Lifecycle) -> usize {
        src as usize
    }
}

/// State shared between the pool handle, the senders, and the workers.
pub(crate) struct Pool {
    /// Current lifecycle state.
    state: AtomicUsize,

    /// One run queue per worker.
    pub(crate) queues: Box<[Queue]>,

    /// Holds spawned workers until `init` finishes, so no worker observes a
    /// half-started pool.
    gate: StartGate,

    /// Seed source for the per-thread RNGs.
    next_seed: AtomicUsize,

    /// Successful steals, for tests and diagnostics.
    pub(crate) steal_count: AtomicUsize,

    /// Configuration
    pub(crate) config: Config,
}

impl Pool {
    pub(crate) fn new(queues: Box<[Queue]>, config: Config) -> Pool {
        Pool {
            state: AtomicUsize::new(Lifecycle::Idle.into()),
            queues,
            gate: StartGate::new(),
            next_seed: AtomicUsize::new(0),
            steal_count: AtomicUsize::new(0),
            config,
        }
    }

    pub(crate) fn lifecycle(&self) -> Lifecycle {
        self.state.load(Acquire).into()
    }

    pub(crate) fn is_shut(&self) -> bool {
        self.lifecycle() == Lifecycle::Shutdown
    }

    /// Attempt the `Idle` → `Running` transition.
    ///
    /// Fails with the observed state if the workers were already started or
    /// the pool is already shut.
    pub(crate) fn transition_to_running(&self) -> Result<(), Lifecycle> {
        self.state
            .compare_exchange(
                Lifecycle::Idle.into(),
                Lifecycle::Running.into(),
                AcqRel,
                Acquire,
            )
            .map(|_| ())
            .map_err(|actual| actual.into())
    }

    /// Set the stop signal. Returns `true` on the first call only.
    pub(crate) fn transition_to_shutdown(&self) -> bool {
        let prev: Lifecycle = self.state.swap(Lifecycle::Shutdown.into(), AcqRel).into();

        trace!("transition_to_shutdown; prev={:?}", prev);
        prev != Lifecycle::Shutdown
    }

    /// Route a task to a uniformly random queue.
    pub(crate) fn submit(&self, task: Task) -> Result<(), SpawnError> {
        match self.lifecycle() {
            Lifecycle::Running => {}
            Lifecycle::Idle => return Err(SpawnError::not_started()),
            Lifecycle::Shutdown => return Err(SpawnError::shutdown()),
        }

        let idx = self.rand_index();
        self.submit_to(idx, task)
    }

    /// Push a task onto a specific queue.
    ///
    /// The push fails only when the target queue has been closed by
    /// shutdown, in which case the task is dropped and its handle resolves
    /// as abandoned before this returns the error.
    pub(crate) fn submit_to(&self, idx: usize, task: Task) -> Result<(), SpawnError> {
        trace!("submit; idx={}", idx);

        self.queues[idx]
            .push(task)
            .map_err(|_task| SpawnError::shutdown())
    }

    /// Release the workers held at the startup gate.
    pub(crate) fn release_workers(&self) {
        self.gate.open();
    }

    /// Block until `init` has finished (or shutdown released the gate).
    /// Called by every worker before its first scheduling pass.
    pub(crate) fn wait_until_released(&self) {
        self.gate.wait();
    }

    /// Wake every worker, sleeping or not. Used at shutdown so sleepers
    /// observe the stop signal immediately.
    pub(crate) fn notify_all(&self) {
        for queue in self.queues.iter() {
            queue.notify_all();
        }
    }

    /// Close all queues, failing the handles of tasks that never ran.
    pub(crate) fn close_queues(&self) {
        let mut drained = 0;

        for queue in self.queues.iter() {
            drained += queue.close();
        }

        if drained > 0 {
            debug!("shutdown abandoned queued tasks; count={}", drained);
        }
    }

    /// Uniform index into `[0, queues.len())`.
    ///
    /// Uses a thread-local generator seeded once per thread from a pool-wide
    /// counter; submitters and workers each pay the seeding cost a single
    /// time.
    pub(crate) fn rand_index(&self) -> usize {
        thread_local!(static THREAD_RNG_KEY: RefCell<Option<SmallRng>> = RefCell::new(None));

        let len = self.queues.len();

        THREAD_RNG_KEY.with(|cell| {
            let mut slot = cell.borrow_mut();

            let rng = slot.get_or_insert_with(|| {
                let thread_id = self.next_seed.fetch_add(1, Relaxed) as u64;
                SmallRng::seed_from_u64(thread_id ^ 0xa8a7_d469_9783_0e05)
            });

            rng.gen_range(0..len)
        })
    }
}

impl fmt::Debug for Pool {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("Pool")
            .field("state", &self.lifecycle())
            .field("queues", &self.queues.len())
            .field("steal_count", &self.steal_count.load(Relaxed))
            .field("config", &self.config)
            .finish()
    }
}

/// One-way gate separating "threads exist" from "threads may run".
///
/// Workers spawned by `init` wait here so a submission arriving mid-init
/// never races worker startup; `init` opens the gate once every thread is
/// spawned. Shutdown also opens it, letting gated workers observe the stop
/// signal instead of waiting forever.
struct StartGate {
    released: Mutex<bool>,
    cond: Condvar,
}

impl StartGate {
    fn new() -> StartGate {
        StartGate {
            released: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    fn open(&self) {
        let mut released = self.released.lock().expect("gate lock poisoned");
        *released = true;
        self.cond.notify_all();
    }

    fn wait(&self) {
        let mut released = self.released.lock().expect("gate lock poisoned");
        while !*released {
            released = self.cond.wait(released).expect("gate lock poisoned");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering::Relaxed;
    use std::thread;
    use std::time::Duration;

    use crate::task::Task;
    use crate::Builder;

    // Force every submission onto one queue; the other workers only make
    // progress by stealing.
    #[test]
    fn stealing_drains_a_hot_queue() {
        let mut pool = Builder::new().pool_size(4).build();
        pool.init().unwrap();

        let inner = pool.sender().pool.clone();

        let handles: Vec<_> = (0..100usize)
            .map(|i| {
                let (task, handle) = Task::new(move || {
                    thread::sleep(Duration::from_millis(2));
                    i
                });

                inner.submit_to(0, task).unwrap();
                handle
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.get().unwrap(), i);
        }

        assert!(inner.steal_count.load(Relaxed) > 0);

        pool.shut();
    }

    #[test]
    fn lifecycle_transitions_are_monotonic() {
        let pool = Builder::new().pool_size(1).build();
        let inner = pool.sender().pool.clone();

        assert!(inner.transition_to_running().is_ok());
        assert!(inner.transition_to_running().is_err());

        assert!(inner.transition_to_shutdown());
        assert!(!inner.transition_to_shutdown());
        assert!(inner.transition_to_running().is_err());
    }
}

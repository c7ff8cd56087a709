use std::collections::VecDeque;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::Relaxed;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

use log::trace;

use crate::task::Task;

/// A worker-owned run queue.
///
/// The deque is guarded by a dedicated mutex and paired with a condition
/// variable. The owning worker pops from the front; any thread may push to
/// the back; stealing peers pop from the back. All structural access happens
/// under the lock.
///
/// `len` mirrors the deque length so the steal scan can check for emptiness
/// without touching the lock. The reading may be stale; the lock is always
/// taken before a task is actually removed.
pub(crate) struct Queue {
    slots: Mutex<Slots>,
    not_empty: Condvar,
    len: AtomicUsize,
}

struct Slots {
    tasks: VecDeque<Task>,
    closed: bool,
}

impl Queue {
    pub(crate) fn new() -> Queue {
        Queue {
            slots: Mutex::new(Slots {
                tasks: VecDeque::new(),
                closed: false,
            }),
            not_empty: Condvar::new(),
            len: AtomicUsize::new(0),
        }
    }

    /// Push a task onto the back and notify the owning worker.
    ///
    /// Once the queue is closed the task is handed back to the caller
    /// instead; the `closed` flag lives under the same lock as the deque, so
    /// a push can never slip in behind the shutdown drain.
    pub(crate) fn push(&self, task: Task) -> Result<(), Task> {
        let mut slots = self.lock();

        if slots.closed {
            return Err(task);
        }

        slots.tasks.push_back(task);
        self.len.store(slots.tasks.len(), Relaxed);
        drop(slots);

        // Every push is paired with a notify on this queue's condvar, so a
        // single-producer/single-waiter handoff cannot miss a wakeup.
        self.not_empty.notify_one();
        Ok(())
    }

    /// Pop from the front. Only the owning worker calls this.
    pub(crate) fn pop_front(&self) -> Option<Task> {
        let mut slots = self.lock();
        let task = slots.tasks.pop_front();
        self.len.store(slots.tasks.len(), Relaxed);
        task
    }

    /// Pop from the back on behalf of a stealing peer.
    pub(crate) fn steal(&self) -> Option<Task> {
        let mut slots = self.lock();
        let task = slots.tasks.pop_back();
        self.len.store(slots.tasks.len(), Relaxed);
        task
    }

    /// Lock-free emptiness peek used by the steal scan. May be stale.
    pub(crate) fn is_empty(&self) -> bool {
        self.len.load(Relaxed) == 0
    }

    /// Sleep until work lands on this queue or `timeout` elapses, then take
    /// whatever is at the front.
    ///
    /// The emptiness check and the wait happen under the same lock a
    /// producer must take to push, so a submission racing the check-to-wait
    /// transition is serialized and its notify lands after the wait has
    /// begun. The wait is bounded so the owner periodically re-probes its
    /// peers even when no submission ever routes here.
    pub(crate) fn wait_for_work(&self, timeout: Duration) -> Option<Task> {
        let mut slots = self.lock();

        if slots.tasks.is_empty() && !slots.closed {
            let (guard, _timed_out) = self
                .not_empty
                .wait_timeout(slots, timeout)
                .expect("queue lock poisoned");
            slots = guard;
        }

        let task = slots.tasks.pop_front();
        self.len.store(slots.tasks.len(), Relaxed);
        task
    }

    /// Refuse further pushes and drop everything still queued.
    ///
    /// Dropping a queued task drops its result producer, which completes the
    /// matching handle with an abandoned error. Returns the number of tasks
    /// dropped.
    pub(crate) fn close(&self) -> usize {
        let mut slots = self.lock();
        slots.closed = true;

        let drained = slots.tasks.len();
        slots.tasks.clear();
        self.len.store(0, Relaxed);

        if drained > 0 {
            trace!("queue closed; dropped_tasks={}", drained);
        }

        drained
    }

    /// Wake the owning worker regardless of queue contents. Used at
    /// shutdown.
    pub(crate) fn notify_all(&self) {
        self.not_empty.notify_all();
    }

    fn lock(&self) -> MutexGuard<Slots> {
        self.slots.lock().expect("queue lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::task::Task;

    fn task(id: usize) -> (Task, crate::JobHandle<usize>) {
        Task::new(move || id)
    }

    #[test]
    fn owner_pops_in_fifo_order() {
        let queue = Queue::new();

        let (t1, h1) = task(1);
        let (t2, h2) = task(2);
        queue.push(t1).unwrap();
        queue.push(t2).unwrap();

        queue.pop_front().unwrap().run();
        queue.pop_front().unwrap().run();
        assert!(queue.pop_front().is_none());

        assert_eq!(h1.get().unwrap(), 1);
        assert_eq!(h2.get().unwrap(), 2);
    }

    #[test]
    fn thieves_take_from_the_back() {
        let queue = Queue::new();

        let (t1, _h1) = task(1);
        let (t2, h2) = task(2);
        queue.push(t1).unwrap();
        queue.push(t2).unwrap();

        queue.steal().unwrap().run();
        assert_eq!(h2.get().unwrap(), 2);
    }

    #[test]
    fn peek_tracks_len() {
        let queue = Queue::new();
        assert!(queue.is_empty());

        let (t, _h) = task(1);
        queue.push(t).unwrap();
        assert!(!queue.is_empty());

        queue.pop_front();
        assert!(queue.is_empty());
    }

    #[test]
    fn close_rejects_pushes_and_abandons_queued_tasks() {
        let queue = Queue::new();

        let (queued, queued_handle) = task(1);
        queue.push(queued).unwrap();

        assert_eq!(queue.close(), 1);
        assert!(queued_handle.get().unwrap_err().is_abandoned());

        let (late, late_handle) = task(2);
        assert!(queue.push(late).is_err());
        drop(late_handle);
    }

    #[test]
    fn wait_for_work_times_out_when_idle() {
        let queue = Queue::new();
        assert!(queue.wait_for_work(Duration::from_millis(1)).is_none());
    }

    #[test]
    fn wait_for_work_returns_pending_task_without_waiting() {
        let queue = Queue::new();

        let (t, h) = task(7);
        queue.push(t).unwrap();

        queue.wait_for_work(Duration::from_secs(1)).unwrap().run();
        assert_eq!(h.get().unwrap(), 7);
    }
}
